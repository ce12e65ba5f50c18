use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::ids::{NpcId, RegionId, RoomId, ZoneId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherExposure {
    Indoor,
    Sheltered,
    Outdoor,
    Coastal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExitData {
    pub target_room_id: RoomId,
    /// blocks line of sight (e.g. a closed door, a bend in a passage) when present
    pub obstacle: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoomTemplate {
    pub room_id: RoomId,
    pub name: String,
    pub exits: HashMap<Direction, ExitData>,
    pub flags: HashSet<String>,
    pub combat_tags: HashSet<String>,
    pub region_id: Option<RegionId>,
    pub zone_id: Option<ZoneId>,
    pub weather_exposure: WeatherExposure,
    /// Residents that are always present rather than following an `NpcSchedule` (§4.I).
    #[serde(default)]
    pub static_npcs: HashSet<NpcId>,
}

impl RoomTemplate {
    pub fn is_shop(&self) -> bool {
        self.flags.contains("shop")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShopGateData {
    pub store_id: String,
    pub room_id: RoomId,
    pub open_time: String,
    pub close_time: String,
    pub closed_days: HashSet<u64>,
}
