use std::collections::HashMap;

use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use blackanchor_data::{EquipmentSlot, ItemId, ItemInstanceState, RoomId, Tier};

use crate::attributes::AttributeSet;
use crate::error::CoreError;
use crate::maneuver::ManeuverId;
use crate::resource_pool::ResourceTriple;

/// A player's equipped gear, one slot table per character. Legacy slot aliases
/// (`armor`/`offhand`) are coalesced onto their modern counterpart at equip/unequip time, per
/// §9 Open Question 2, so the table is always indexed by the canonical slot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Equipment {
    slots: EnumMap<EquipmentSlot, Option<(ItemId, ItemInstanceState)>>,
}

impl Equipment {
    pub fn equip(&mut self, slot: EquipmentSlot, item_id: ItemId, state: ItemInstanceState) {
        self.slots[slot.canonical()] = Some((item_id, state));
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<(ItemId, ItemInstanceState)> {
        self.slots[slot.canonical()].take()
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&(ItemId, ItemInstanceState)> {
        self.slots[slot.canonical()].as_ref()
    }

    pub fn get_mut(&mut self, slot: EquipmentSlot) -> Option<&mut (ItemId, ItemInstanceState)> {
        self.slots[slot.canonical()].as_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &(ItemId, ItemInstanceState))> {
        self.slots
            .iter()
            .filter_map(|(slot, worn)| worn.as_ref().map(|item| (slot, item)))
    }

    pub fn weapon(&self) -> Option<&(ItemId, ItemInstanceState)> {
        self.get(EquipmentSlot::Weapon)
    }
}

/// A player character. Creation-phase state (out of scope per §1) is carried as an opaque blob
/// so it persists through the core without the core interpreting it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerCharacter {
    pub name: String,
    pub room_id: RoomId,
    pub resources: ResourceTriple,
    pub gold: u64,
    pub level: u32,
    pub experience: u64,
    pub attributes: AttributeSet,
    pub skills: HashMap<String, i32>,
    pub equipped: Equipment,
    pub inventory: Vec<ItemId>,
    pub known_maneuvers: Vec<ManeuverId>,
    pub active_maneuvers: Vec<ManeuverId>,
    pub tier: Tier,
}

impl PlayerCharacter {
    pub fn skill(&self, name: &str) -> i32 {
        self.skills.get(name).copied().unwrap_or(0)
    }

    pub fn set_skill(&mut self, name: &str, value: i32) {
        self.skills.insert(name.to_string(), value);
    }

    /// Activates a known maneuver, bounded by `max_maneuvers(tier)` (§3).
    pub fn activate_maneuver(&mut self, maneuver: ManeuverId) -> Result<(), CoreError> {
        if !self.known_maneuvers.contains(&maneuver) {
            return Err(CoreError::Rejected(format!(
                "{maneuver} is not a maneuver you know"
            )));
        }
        if self.active_maneuvers.contains(&maneuver) {
            return Ok(());
        }
        if self.active_maneuvers.len() >= self.tier.max_maneuvers() {
            return Err(CoreError::Rejected(format!(
                "you cannot have more than {} active maneuvers at tier {:?}",
                self.tier.max_maneuvers(),
                self.tier
            )));
        }
        log::debug!("{} activates maneuver {maneuver}", self.name);
        self.active_maneuvers.push(maneuver);
        Ok(())
    }

    pub fn deactivate_maneuver(&mut self, maneuver: &ManeuverId) {
        self.active_maneuvers.retain(|m| m != maneuver);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_player() -> PlayerCharacter {
        PlayerCharacter {
            name: "Test".to_string(),
            room_id: RoomId::from("room-1"),
            resources: ResourceTriple::new(10, 10, 10),
            gold: 0,
            level: 1,
            experience: 0,
            attributes: AttributeSet::default(),
            skills: HashMap::new(),
            equipped: Equipment::default(),
            inventory: Vec::new(),
            known_maneuvers: vec![ManeuverId::from("riposte"), ManeuverId::from("feint")],
            active_maneuvers: Vec::new(),
            tier: Tier::Low,
        }
    }

    #[test]
    fn maneuver_cap_is_enforced() {
        let mut player = test_player();
        player
            .activate_maneuver(ManeuverId::from("riposte"))
            .unwrap();
        player
            .activate_maneuver(ManeuverId::from("feint"))
            .unwrap();
        assert_eq!(player.tier.max_maneuvers(), 2);
        let err = player
            .activate_maneuver(ManeuverId::from("unknown-third"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Rejected(_)));
    }

    #[test]
    fn equip_coalesces_legacy_aliases() {
        let mut equipment = Equipment::default();
        equipment.equip(
            EquipmentSlot::Armor,
            ItemId::from("leather-vest"),
            ItemInstanceState {
                item_id: ItemId::from("leather-vest"),
                durability_current: 0,
                armor_hp_current: 10,
            },
        );
        assert!(equipment.get(EquipmentSlot::Chest).is_some());
        assert!(equipment.get(EquipmentSlot::Armor).is_some());
    }
}
