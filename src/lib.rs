pub mod clock;
pub mod combat;
pub mod config;
pub mod coordination;
pub mod encounter;
pub mod game;
pub mod runtime_state;
pub mod schedule;
pub mod shop_gate;
pub mod weather;

pub use blackanchor_common as common;
pub use blackanchor_data as data;

pub use clock::WorldClock;
pub use combat::CombatEngine;
pub use config::GameConfig;
pub use coordination::{DefeatOutcome, NoopQuestNotifier, QuestNotifier, RoomCoordinator, RoomEntryOutcome};
pub use encounter::EncounterService;
pub use runtime_state::RuntimeStateStore;
pub use schedule::ScheduleResolver;
pub use shop_gate::ShopGate;
pub use weather::WeatherService;

/// Everything the combat/world-simulation core needs to run one room's worth of logic, owned
/// together so a tick loop or session handler can pass a single value around instead of
/// threading eight collaborators through every call (§9: "explicit dependencies passed through
/// a context/struct; no process-wide mutable state").
pub struct WorldContext {
    pub catalog: blackanchor_data::Catalog,
    pub clock: WorldClock,
    pub config: GameConfig,
    pub store: RuntimeStateStore,
    pub combat: std::sync::Mutex<CombatEngine>,
    pub encounters: EncounterService,
    pub weather: std::sync::Mutex<WeatherService>,
    pub schedule: std::sync::Mutex<ScheduleResolver>,
}

impl WorldContext {
    pub fn new(catalog: blackanchor_data::Catalog, config: GameConfig) -> Self {
        let clock = WorldClock::new(config.world_accel);
        let store = RuntimeStateStore::new(config.room_reset);
        let encounters = EncounterService::new(config.encounter_chance, config.encounter_cooldown);
        let weather = WeatherService::new(catalog.weather_transitions.clone());
        Self {
            catalog,
            clock,
            config,
            store,
            combat: std::sync::Mutex::new(CombatEngine::new()),
            encounters,
            weather: std::sync::Mutex::new(weather),
            schedule: std::sync::Mutex::new(ScheduleResolver::new()),
        }
    }
}
