use std::time::{Instant, SystemTime, UNIX_EPOCH};

use blackanchor_common::CoreError;

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DayPart {
    Dawn,
    Morning,
    Afternoon,
    Dusk,
    Night,
}

impl DayPart {
    fn from_hour(hour: i64) -> Self {
        match hour {
            5..=6 => DayPart::Dawn,
            7..=11 => DayPart::Morning,
            12..=16 => DayPart::Afternoon,
            17..=19 => DayPart::Dusk,
            _ => DayPart::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayPart::Dawn => "Dawn",
            DayPart::Morning => "Morning",
            DayPart::Afternoon => "Afternoon",
            DayPart::Dusk => "Dusk",
            DayPart::Night => "Night",
        }
    }
}

/// Monotonic virtual clock (component A). `world_seconds` is derived from a fixed start epoch
/// plus elapsed real time scaled by the acceleration factor `R`; it never moves backwards
/// except via an explicit admin `set_world_seconds` (§4.A).
pub struct WorldClock {
    accel: i64,
    start_real_time: Instant,
    start_world_seconds: i64,
}

impl WorldClock {
    pub fn new(accel: i64) -> Self {
        Self {
            accel,
            start_real_time: Instant::now(),
            start_world_seconds: unix_now(),
        }
    }

    pub fn with_start(accel: i64, start_world_seconds: i64) -> Self {
        Self {
            accel,
            start_real_time: Instant::now(),
            start_world_seconds,
        }
    }

    pub fn world_seconds(&self) -> i64 {
        let elapsed = self.start_real_time.elapsed().as_secs_f64();
        self.start_world_seconds + (elapsed * self.accel as f64).floor() as i64
    }

    /// Admin reset: rebases `start_real_time` to now. Fails with `Invalid` if `v < 0`.
    pub fn set_world_seconds(&mut self, v: i64) -> Result<(), CoreError> {
        if v < 0 {
            return Err(CoreError::Invalid("world seconds cannot be negative".into()));
        }
        self.start_real_time = Instant::now();
        self.start_world_seconds = v;
        log::warn!(target: "blackanchor::audit", "admin set_time -> world_seconds={v}");
        Ok(())
    }

    pub fn day_number(&self) -> i64 {
        self.world_seconds().div_euclid(SECONDS_PER_DAY)
    }

    pub fn hour(&self) -> i64 {
        self.world_seconds().rem_euclid(SECONDS_PER_DAY).div_euclid(3600)
    }

    pub fn minute(&self) -> i64 {
        self.world_seconds().rem_euclid(3600).div_euclid(60)
    }

    pub fn second(&self) -> i64 {
        self.world_seconds().rem_euclid(60)
    }

    pub fn day_part(&self) -> DayPart {
        DayPart::from_hour(self.hour())
    }

    /// Friendly narration used by the `time` command (§11 Supplemented Features), e.g.
    /// "It is Morning, 2 bells past dawn. (Day 4)".
    pub fn describe(&self) -> String {
        let hour = self.hour();
        let bells = match self.day_part() {
            DayPart::Dawn => hour - 5,
            DayPart::Morning => hour - 7,
            DayPart::Afternoon => hour - 12,
            DayPart::Dusk => hour - 17,
            DayPart::Night => (hour + 4).rem_euclid(24),
        };
        format!(
            "It is {}, {} bell{} past {}. (Day {})",
            self.day_part().label(),
            bells,
            if bells == 1 { "" } else { "s" },
            self.day_part().label().to_lowercase(),
            self.day_number()
        )
    }

    /// Parses `"HH:MM"` and tests whether `hour*3600+minute*60` (the clock's current time of
    /// day) falls in `[start, end)`, treating `start > end` as a wrap-around range that spans
    /// midnight (§4.A, Testable Property 2).
    pub fn is_time_in_range(&self, start: &str, end: &str) -> Result<bool, CoreError> {
        let start_secs = parse_hhmm(start)?;
        let end_secs = parse_hhmm(end)?;
        let now_secs = self.hour() * 3600 + self.minute() * 60 + self.second();
        Ok(in_range(now_secs, start_secs, end_secs))
    }
}

pub fn in_range(t: i64, start: i64, end: i64) -> bool {
    if start <= end {
        t >= start && t < end
    } else {
        t >= start || t < end
    }
}

fn parse_hhmm(value: &str) -> Result<i64, CoreError> {
    let (h, m) = value
        .split_once(':')
        .ok_or_else(|| CoreError::Invalid(format!("malformed time {value:?}")))?;
    let h: i64 = h
        .parse()
        .map_err(|_| CoreError::Invalid(format!("malformed time {value:?}")))?;
    let m: i64 = m
        .parse()
        .map_err(|_| CoreError::Invalid(format!("malformed time {value:?}")))?;
    if !(0..24).contains(&h) || !(0..60).contains(&m) {
        return Err(CoreError::Invalid(format!("malformed time {value:?}")));
    }
    Ok(h * 3600 + m * 60)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn monotonic_with_fixed_acceleration() {
        let clock = WorldClock::with_start(3, 0);
        let t1 = clock.world_seconds();
        sleep(Duration::from_millis(50));
        let t2 = clock.world_seconds();
        assert!(t2 >= t1);
    }

    #[test]
    fn set_world_seconds_rejects_negative() {
        let mut clock = WorldClock::with_start(3, 0);
        assert!(clock.set_world_seconds(-1).is_err());
        assert!(clock.set_world_seconds(100).is_ok());
        assert_eq!(clock.world_seconds(), 100);
    }

    #[test]
    fn day_part_buckets_by_hour() {
        let clock = WorldClock::with_start(3, 9 * 3600);
        assert_eq!(clock.day_part(), DayPart::Morning);
        assert_eq!(clock.hour(), 9);
    }

    #[test]
    fn wraparound_range() {
        // shop closes at 02:00, opens at 22:00: open overnight
        assert!(in_range(23 * 3600, 22 * 3600, 2 * 3600));
        assert!(in_range(1 * 3600, 22 * 3600, 2 * 3600));
        assert!(!in_range(12 * 3600, 22 * 3600, 2 * 3600));
    }

    #[test]
    fn malformed_time_is_invalid() {
        let clock = WorldClock::with_start(3, 0);
        assert!(clock.is_time_in_range("25:00", "10:00").is_err());
        assert!(clock.is_time_in_range("bad", "10:00").is_err());
    }
}
