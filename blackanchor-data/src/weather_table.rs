use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherType {
    Clear,
    Fog,
    Squall,
    SaltRain,
    ColdSnap,
    /// carried over from the original roster (§11); flavor only, no mechanical modifier
    Wind,
}

/// `current_type -> (next_type -> weight)`, sampled by `WeatherService::maybe_update`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeatherTransitionTable(pub HashMap<WeatherType, HashMap<WeatherType, u32>>);

impl WeatherTransitionTable {
    /// The original's table: mild mean-reversion toward `Clear`, with `Wind` as a common
    /// stepping-stone state between calm and the more severe effects.
    pub fn default_table() -> Self {
        use WeatherType::*;
        let mut table = HashMap::new();
        table.insert(
            Clear,
            HashMap::from([(Clear, 40), (Wind, 30), (Fog, 15), (Squall, 10), (ColdSnap, 5)]),
        );
        table.insert(
            Wind,
            HashMap::from([(Clear, 35), (Wind, 25), (Squall, 25), (Fog, 10), (SaltRain, 5)]),
        );
        table.insert(
            Fog,
            HashMap::from([(Fog, 35), (Clear, 35), (Wind, 20), (ColdSnap, 10)]),
        );
        table.insert(
            Squall,
            HashMap::from([(Squall, 30), (SaltRain, 25), (Wind, 25), (Clear, 20)]),
        );
        table.insert(
            SaltRain,
            HashMap::from([(SaltRain, 30), (Squall, 30), (Wind, 25), (Clear, 15)]),
        );
        table.insert(
            ColdSnap,
            HashMap::from([(ColdSnap, 40), (Clear, 30), (Fog, 20), (Wind, 10)]),
        );
        Self(table)
    }

    pub fn row(&self, current: WeatherType) -> Option<&HashMap<WeatherType, u32>> {
        self.0.get(&current)
    }
}
