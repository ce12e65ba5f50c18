use serde::{Deserialize, Serialize};

use crate::ids::NpcId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterType {
    Combat,
    /// flavor-only roll result (ambient sighting, no spawn); any non-`Combat` row is a no-op
    /// for the encounter service per §4.F step 4.
    Flavor,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub template_id: NpcId,
    pub min_count: u32,
    pub max_count: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositionTable {
    pub key: String,
    pub entries: Vec<CompositionEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncounterRow {
    pub min_roll: u32,
    pub max_roll: u32,
    pub encounter_type: EncounterType,
    pub composition_key: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ZoneEncounterTable {
    pub rows: Vec<EncounterRow>,
    pub compositions: Vec<CompositionTable>,
}

impl ZoneEncounterTable {
    pub fn row_for_roll(&self, roll: u32) -> Option<&EncounterRow> {
        self.rows
            .iter()
            .find(|row| roll >= row.min_roll && roll <= row.max_roll)
    }

    pub fn composition(&self, key: &str) -> Option<&CompositionTable> {
        self.compositions.iter().find(|c| c.key == key)
    }
}
