use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;

use blackanchor_common::WeatherChanged;
use blackanchor_data::{RegionId, WeatherExposure, WeatherTransitionTable, WeatherType};

#[derive(Clone, Debug)]
pub struct RegionWeather {
    pub region_id: RegionId,
    pub weather_type: WeatherType,
    pub intensity: u8,
    pub started_at: i64,
    pub next_change_at: i64,
    pub seed: u32,
}

impl RegionWeather {
    fn new_clear(region_id: RegionId, now: i64) -> Self {
        Self {
            region_id,
            weather_type: WeatherType::Clear,
            intensity: 0,
            started_at: now,
            next_change_at: now + 900,
            seed: rand::thread_rng().gen(),
        }
    }
}

/// Per-region weather state machine (component E).
pub struct WeatherService {
    regions: HashMap<RegionId, RegionWeather>,
    table: WeatherTransitionTable,
}

impl WeatherService {
    pub fn new(table: WeatherTransitionTable) -> Self {
        Self {
            regions: HashMap::new(),
            table,
        }
    }

    pub fn region(&self, region_id: &RegionId) -> Option<&RegionWeather> {
        self.regions.get(region_id)
    }

    /// If `now >= next_change_at`, samples a new type from the transition table weighted by
    /// the current type's row, sets a `uniform(600, 1800)` duration, and adjusts `intensity`
    /// (§4.E). Returns the change event when a transition actually happened.
    pub fn maybe_update(
        &mut self,
        region_id: &RegionId,
        now: i64,
        rng: &mut impl Rng,
    ) -> Option<WeatherChanged> {
        let weather = self
            .regions
            .entry(region_id.clone())
            .or_insert_with(|| RegionWeather::new_clear(region_id.clone(), now));

        if now < weather.next_change_at {
            return None;
        }

        let next_type = sample_weighted(&self.table, weather.weather_type, rng);
        weather.weather_type = next_type;
        weather.started_at = now;
        weather.next_change_at = now + rng.gen_range(600..=1800);
        weather.seed = rng.gen();

        if next_type == WeatherType::Clear {
            weather.intensity = weather.intensity.saturating_sub(1);
        } else {
            weather.intensity = (weather.intensity + 1).min(3);
        }

        Some(WeatherChanged {
            region_id: region_id.clone(),
            weather_type: weather.weather_type,
            intensity: weather.intensity,
        })
    }

    /// Descriptive line for outdoor/sheltered/coastal exposure; `None` for `indoor` (§4.E).
    pub fn overlay(&self, region_id: &RegionId, exposure: WeatherExposure) -> Option<String> {
        if exposure == WeatherExposure::Indoor {
            return None;
        }
        let weather = self.regions.get(region_id)?;
        let adjective = match exposure {
            WeatherExposure::Outdoor => outdoor_line(weather.weather_type),
            WeatherExposure::Coastal => coastal_line(weather.weather_type),
            WeatherExposure::Sheltered => sheltered_line(weather.weather_type),
            WeatherExposure::Indoor => unreachable!(),
        };
        Some(adjective)
    }

    /// Light mechanical modifiers by effect kind (§4.E). Indoor rooms always return 0. Returns
    /// a scalar: the accuracy/disengage/stamina effects are whole-number penalties or bonuses
    /// once rounded by the caller, `durability_loss` is a fractional wear multiplier.
    pub fn modifier(
        &self,
        region_id: &RegionId,
        exposure: WeatherExposure,
        effect_kind: &str,
    ) -> f64 {
        if exposure == WeatherExposure::Indoor {
            return 0.0;
        }
        let Some(weather) = self.regions.get(region_id) else {
            return 0.0;
        };
        let scale = (weather.intensity as f64 + 1.0) / 4.0;
        match (effect_kind, weather.weather_type) {
            ("ranged_accuracy_far", WeatherType::Fog) => -15.0 * scale,
            ("disengage_failure", WeatherType::Squall) => 20.0 * scale,
            ("durability_loss", WeatherType::SaltRain) => scale,
            ("stamina_drain", WeatherType::ColdSnap)
                if matches!(exposure, WeatherExposure::Outdoor | WeatherExposure::Coastal) =>
            {
                2.0 * scale
            }
            _ => 0.0,
        }
    }
}

fn sample_weighted(table: &WeatherTransitionTable, current: WeatherType, rng: &mut impl Rng) -> WeatherType {
    let Some(row) = table.row(current) else {
        return WeatherType::Clear;
    };
    let total: u32 = row.values().sum();
    if total == 0 {
        return WeatherType::Clear;
    }
    let mut roll = rng.gen_range(0..total);
    for (weather_type, weight) in row {
        if roll < *weight {
            return *weather_type;
        }
        roll -= weight;
    }
    WeatherType::Clear
}

fn outdoor_line(weather: WeatherType) -> String {
    match weather {
        WeatherType::Clear => "The sky is clear overhead.".to_string(),
        WeatherType::Fog => "A heavy fog rolls across the ground, swallowing the horizon.".to_string(),
        WeatherType::Squall => "A squall lashes the open ground with wind and rain.".to_string(),
        WeatherType::SaltRain => "A briny rain stings exposed skin and corrodes metal.".to_string(),
        WeatherType::ColdSnap => "A bitter cold snap bites at any exposed skin.".to_string(),
        WeatherType::Wind => "A stiff wind gusts across the open ground.".to_string(),
    }
}

fn coastal_line(weather: WeatherType) -> String {
    match weather {
        WeatherType::Clear => "The sea is calm beneath a clear sky.".to_string(),
        WeatherType::Fog => "A sea fog rolls in off the water.".to_string(),
        WeatherType::Squall => "A squall whips the waves into a froth.".to_string(),
        WeatherType::SaltRain => "Salt-laden rain drives in off the waves.".to_string(),
        WeatherType::ColdSnap => "A cold snap bites hardest near the water.".to_string(),
        WeatherType::Wind => "A salt-tinged wind blows in off the water.".to_string(),
    }
}

fn sheltered_line(weather: WeatherType) -> String {
    match weather {
        WeatherType::Clear => "A patch of clear sky is visible overhead.".to_string(),
        WeatherType::Fog => "Wisps of fog drift in from outside.".to_string(),
        WeatherType::Squall => "You can hear a squall battering the world outside.".to_string(),
        WeatherType::SaltRain => "A faint brine carries in on the air.".to_string(),
        WeatherType::ColdSnap => "A chill draft carries in from outside.".to_string(),
        WeatherType::Wind => "A faint breeze finds its way in from outside.".to_string(),
    }
}
