use enum_map::Enum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::ItemId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Item,
    Tool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponCategory {
    Melee,
    Ranged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
}

/// Armor slots. `Armor` and `Offhand` are legacy aliases coalesced with `Chest`/`Shield`
/// at equip/unequip time (spec §9 Open Question 2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum ArmorSlot {
    Head,
    Chest,
    Arms,
    Legs,
    Shield,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Head,
    Chest,
    Arms,
    Legs,
    Shield,
    /// legacy alias for `Chest`
    Armor,
    /// legacy alias for `Shield`
    Offhand,
}

impl EquipmentSlot {
    /// Coalesces legacy slot aliases onto their modern counterpart.
    pub fn canonical(self) -> EquipmentSlot {
        match self {
            EquipmentSlot::Armor => EquipmentSlot::Chest,
            EquipmentSlot::Offhand => EquipmentSlot::Shield,
            other => other,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeaponData {
    pub category: WeaponCategory,
    pub hands: u8,
    pub damage_min: u32,
    pub damage_max: u32,
    pub damage_type: DamageType,
    pub crit_chance: f32,
    pub speed_cost: f32,
    pub durability_max: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArmorData {
    pub armor_slot: ArmorSlot,
    pub damage_reduction: HashMap<DamageType, i32>,
    pub armor_hp_max: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub item_id: ItemId,
    pub item_type: ItemType,
    pub base_value: u32,
    pub weapon: Option<WeaponData>,
    pub armor: Option<ArmorData>,
}

impl WeaponData {
    /// Bare fists: worse than any stick.
    pub fn unarmed() -> Self {
        Self {
            category: WeaponCategory::Melee,
            hands: 1,
            damage_min: 1,
            damage_max: 1,
            damage_type: DamageType::Bludgeoning,
            crit_chance: 0.01,
            speed_cost: 1.0,
            durability_max: 0,
        }
    }
}

impl ItemTemplate {
    pub fn is_weapon(&self) -> bool {
        matches!(self.item_type, ItemType::Weapon) && self.weapon.is_some()
    }

    pub fn is_armor(&self) -> bool {
        matches!(self.item_type, ItemType::Armor) && self.armor.is_some()
    }
}

/// A runtime copy of an item template carrying mutable wear state.
/// Distinct from `ItemTemplate`: durability and armor_hp live here, never on the catalog record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemInstanceState {
    pub item_id: ItemId,
    pub durability_current: u32,
    pub armor_hp_current: u32,
}

impl ItemInstanceState {
    pub fn new_from_template(template: &ItemTemplate) -> Self {
        Self {
            item_id: template.item_id.clone(),
            durability_current: template
                .weapon
                .as_ref()
                .map(|w| w.durability_max)
                .unwrap_or(0),
            armor_hp_current: template
                .armor
                .as_ref()
                .map(|a| a.armor_hp_max)
                .unwrap_or(0),
        }
    }

    pub fn is_broken(&self, template: &ItemTemplate) -> bool {
        if template.is_weapon() {
            return self.durability_current == 0;
        }
        if template.is_armor() {
            return self.armor_hp_current == 0;
        }
        false
    }
}
