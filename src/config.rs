use std::env;
use std::time::Duration;

/// Environment-driven configuration (§6 Environment table), parsed once in `main` with sane
/// defaults when unset — generalizes the teacher's `GameConfig` resource
/// (`enable_npc_spawns`, `enable_monster_spawns`) to the full variable list this spec names.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub world_accel: i64,
    pub max_sessions: usize,
    pub command_rate: u32,
    pub idle_timeout: Duration,
    pub bat_seconds: f64,
    pub encounter_chance: f64,
    pub encounter_cooldown: Duration,
    pub room_reset: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_accel: 3,
            max_sessions: 50,
            command_rate: 10,
            idle_timeout: Duration::from_secs(300),
            bat_seconds: 1.0,
            encounter_chance: 0.35,
            encounter_cooldown: Duration::from_secs(120),
            room_reset: Duration::from_secs(3600),
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            world_accel: env_parse("WORLD_ACCEL", defaults.world_accel),
            max_sessions: env_parse("MAX_SESSIONS", defaults.max_sessions),
            command_rate: env_parse("COMMAND_RATE", defaults.command_rate),
            idle_timeout: Duration::from_secs(env_parse(
                "IDLE_TIMEOUT",
                defaults.idle_timeout.as_secs(),
            )),
            bat_seconds: env_parse("BAT_SECONDS", defaults.bat_seconds),
            encounter_chance: env_parse("ENCOUNTER_CHANCE", defaults.encounter_chance),
            encounter_cooldown: Duration::from_secs(env_parse(
                "ENCOUNTER_COOLDOWN_SECONDS",
                defaults.encounter_cooldown.as_secs(),
            )),
            room_reset: Duration::from_secs(env_parse(
                "ROOM_RESET_SECONDS",
                defaults.room_reset.as_secs(),
            )),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let config = GameConfig::default();
        assert_eq!(config.world_accel, 3);
        assert_eq!(config.max_sessions, 50);
        assert_eq!(config.command_rate, 10);
        assert_eq!(config.idle_timeout, Duration::from_secs(300));
        assert_eq!(config.bat_seconds, 1.0);
        assert_eq!(config.encounter_chance, 0.35);
        assert_eq!(config.encounter_cooldown, Duration::from_secs(120));
        assert_eq!(config.room_reset, Duration::from_secs(3600));
    }
}
