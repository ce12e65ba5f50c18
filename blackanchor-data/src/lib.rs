mod catalog;
mod ids;
mod item;
mod npc;
mod room;
mod schedule;
mod weather_table;
mod zone_encounter;

pub use catalog::{Catalog, CatalogLoader, JsonDirectoryCatalogLoader, StaticCatalogLoader};
pub use ids::{EncounterId, InstanceId, ItemId, NpcId, PlayerName, RegionId, RoomId, ZoneId};
pub use schedule::{NpcSchedule, ScheduleBlock};
pub use item::{
    ArmorData, ArmorSlot, DamageType, EquipmentSlot, ItemInstanceState, ItemTemplate, ItemType,
    WeaponCategory, WeaponData,
};
pub use npc::{
    generate_stats, role_bias, AttributeSpread, CombatRole, GeneratedNpcStats, LootEntry,
    MerchantData, NpcTemplate, RoleBias, Tier,
};
pub use room::{Direction, ExitData, RoomTemplate, ShopGateData, WeatherExposure};
pub use weather_table::{WeatherTransitionTable, WeatherType};
pub use zone_encounter::{
    CompositionEntry, CompositionTable, EncounterRow, EncounterType, ZoneEncounterTable,
};
