use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::ids::{ItemId, NpcId, RoomId, ZoneId};
use crate::item::ItemTemplate;
use crate::npc::NpcTemplate;
use crate::room::{RoomTemplate, ShopGateData};
use crate::schedule::NpcSchedule;
use crate::weather_table::WeatherTransitionTable;
use crate::zone_encounter::ZoneEncounterTable;

/// Immutable, load-once catalog. Loaded once at startup and treated as read-only thereafter;
/// concurrent readers never synchronize (§5 Shared-resource policy).
#[derive(Debug, Default)]
pub struct Catalog {
    pub rooms: HashMap<RoomId, RoomTemplate>,
    pub npcs: HashMap<NpcId, NpcTemplate>,
    pub items: HashMap<ItemId, ItemTemplate>,
    pub shops: HashMap<String, ShopGateData>,
    pub zone_encounters: HashMap<ZoneId, ZoneEncounterTable>,
    pub weather_transitions: WeatherTransitionTable,
    pub schedules: HashMap<NpcId, NpcSchedule>,
}

impl Catalog {
    pub fn room(&self, room_id: &RoomId) -> Option<&RoomTemplate> {
        self.rooms.get(room_id)
    }

    pub fn npc(&self, npc_id: &NpcId) -> Option<&NpcTemplate> {
        self.npcs.get(npc_id)
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&ItemTemplate> {
        self.items.get(item_id)
    }

    pub fn zone_table(&self, zone_id: &ZoneId) -> Option<&ZoneEncounterTable> {
        self.zone_encounters.get(zone_id)
    }

    pub fn schedule(&self, npc_id: &NpcId) -> Option<&NpcSchedule> {
        self.schedules.get(npc_id)
    }
}

/// Interface a runtime needs from a catalog source; persistent loaders for rooms/NPCs/items/
/// planets/races/starsigns/maneuvers are out of scope (spec §1) — only this minimal shape is
/// specified so the core is runnable and testable.
pub trait CatalogLoader {
    fn load(&self) -> Result<Catalog>;
}

/// A directory of flat JSON files, one array per catalog kind. Exists only so the core has a
/// runnable/testable catalog source; not a production data pipeline.
pub struct JsonDirectoryCatalogLoader {
    pub directory: std::path::PathBuf,
}

impl JsonDirectoryCatalogLoader {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn read_array<T: serde::de::DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.directory.join(file_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read catalog file {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse catalog file {}", path.display()))
    }
}

impl CatalogLoader for JsonDirectoryCatalogLoader {
    fn load(&self) -> Result<Catalog> {
        let rooms: Vec<RoomTemplate> = self.read_array("rooms.json")?;
        let npcs: Vec<NpcTemplate> = self.read_array("npcs.json")?;
        let items: Vec<ItemTemplate> = self.read_array("items.json")?;
        let shops: Vec<ShopGateData> = self.read_array("shops.json")?;
        let zone_encounters: Vec<(ZoneId, ZoneEncounterTable)> =
            self.read_array("zone_encounters.json")?;
        let schedules: Vec<NpcSchedule> = self.read_array("npc_schedules.json")?;

        Ok(Catalog {
            rooms: rooms
                .into_iter()
                .map(|room| (room.room_id.clone(), room))
                .collect(),
            npcs: npcs
                .into_iter()
                .map(|npc| (npc.npc_id.clone(), npc))
                .collect(),
            items: items
                .into_iter()
                .map(|item| (item.item_id.clone(), item))
                .collect(),
            shops: shops
                .into_iter()
                .map(|shop| (shop.store_id.clone(), shop))
                .collect(),
            zone_encounters: zone_encounters.into_iter().collect(),
            weather_transitions: WeatherTransitionTable::default_table(),
            schedules: schedules
                .into_iter()
                .map(|schedule| (schedule.npc_id.clone(), schedule))
                .collect(),
        })
    }
}

/// An in-memory catalog for unit tests, skipping the filesystem entirely.
pub struct StaticCatalogLoader(pub Catalog);

impl CatalogLoader for StaticCatalogLoader {
    fn load(&self) -> Result<Catalog> {
        Ok(self.0.clone())
    }
}

impl Clone for Catalog {
    fn clone(&self) -> Self {
        Self {
            rooms: self.rooms.clone(),
            npcs: self.npcs.clone(),
            items: self.items.clone(),
            shops: self.shops.clone(),
            zone_encounters: self.zone_encounters.clone(),
            weather_transitions: WeatherTransitionTable(self.weather_transitions.0.clone()),
            schedules: self.schedules.clone(),
        }
    }
}
