use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{ItemId, NpcId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatRole {
    Brute,
    Minion,
    Boss,
    Artillery,
    Healer,
    Controller,
    None,
}

impl Default for CombatRole {
    fn default() -> Self {
        CombatRole::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Mid,
    High,
    Epic,
}

impl Tier {
    /// Experience multiplier used by the fallback `exp_value` formula (§4.G.5).
    pub fn exp_multiplier(self) -> u32 {
        match self {
            Tier::Low => 1,
            Tier::Mid => 2,
            Tier::High => 3,
            Tier::Epic => 5,
        }
    }

    /// Bound on `active_maneuvers` length, by power bracket.
    pub fn max_maneuvers(self) -> usize {
        match self {
            Tier::Low => 2,
            Tier::Mid => 3,
            Tier::High => 4,
            Tier::Epic => 6,
        }
    }

    /// Attribute range for procedurally-voiced NPC generation, ported verbatim from the
    /// original's `TIER_ATTRIBUTE_RANGES["min"/"max"]` (the catalog loader itself is out of
    /// scope; this only feeds `generate_stats`' authoring-tool roll).
    pub fn attribute_range(self) -> (i32, i32) {
        match self {
            Tier::Low => (8, 14),
            Tier::Mid => (12, 18),
            Tier::High => (16, 22),
            Tier::Epic => (20, 26),
        }
    }

    /// Midpoint attribute value a role's bias is applied around, ported from the original's
    /// `TIER_ATTRIBUTE_RANGES["base"]`.
    pub fn attribute_base(self) -> i32 {
        match self {
            Tier::Low => 10,
            Tier::Mid => 14,
            Tier::High => 18,
            Tier::Epic => 22,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSpread {
    pub physical: i32,
    pub mental: i32,
    pub spiritual: i32,
    pub social: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: ItemId,
    /// `None` means guaranteed drop; `Some(n)` is a chance-in-100.
    pub chance_in_100: Option<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcTemplate {
    pub npc_id: NpcId,
    pub display_name: String,
    pub attributes: AttributeSpread,
    pub skills: HashMap<String, i32>,
    pub combat_role: CombatRole,
    pub tier: Tier,
    pub level: u32,
    pub exp_value: Option<u32>,
    pub hostile: bool,
    pub loot_table: Vec<LootEntry>,
    pub max_health: u32,
    pub merchant: Option<MerchantData>,
    pub keywords: HashMap<String, String>,
    /// per-player outlook, -100..100
    pub outlook: HashMap<String, i32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MerchantData {
    pub store_id: String,
    pub inventory: Vec<ItemId>,
}

impl NpcTemplate {
    /// Experience awarded on defeat when `exp_value` is unset (§4.G.5):
    /// `25 + (max_health / 2) * tier_multiplier`.
    pub fn experience_reward(&self) -> u32 {
        self.exp_value
            .unwrap_or(25 + (self.max_health / 2) * self.tier.exp_multiplier())
    }

    pub fn skill(&self, name: &str) -> i32 {
        self.skills.get(name).copied().unwrap_or(0)
    }
}

/// A role's stat bias, ported verbatim from the original's `ROLE_STAT_BIASES` table: an
/// attribute spread applied around the tier's base attribute, a multiplier on the tier's base
/// HP, and a flat bonus folded into the role's damage rolls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoleBias {
    pub attributes: AttributeSpread,
    pub hp_multiplier: f32,
    pub damage_bonus: i32,
}

/// Stat-bias table by combat role, applied on top of the tier's attribute range when
/// generating catalog content procedurally (§11 Supplemented Features).
pub fn role_bias(role: CombatRole) -> RoleBias {
    match role {
        CombatRole::Brute => RoleBias {
            attributes: AttributeSpread {
                physical: 3,
                mental: -1,
                spiritual: 0,
                social: -1,
            },
            hp_multiplier: 1.5,
            damage_bonus: 2,
        },
        CombatRole::Minion => RoleBias {
            attributes: AttributeSpread {
                physical: 0,
                mental: -2,
                spiritual: -2,
                social: -2,
            },
            hp_multiplier: 0.5,
            damage_bonus: -1,
        },
        CombatRole::Boss => RoleBias {
            attributes: AttributeSpread {
                physical: 2,
                mental: 2,
                spiritual: 2,
                social: 1,
            },
            hp_multiplier: 2.5,
            damage_bonus: 3,
        },
        CombatRole::Artillery => RoleBias {
            attributes: AttributeSpread {
                physical: 0,
                mental: 3,
                spiritual: 1,
                social: 0,
            },
            hp_multiplier: 0.8,
            damage_bonus: 1,
        },
        CombatRole::Healer => RoleBias {
            attributes: AttributeSpread {
                physical: -1,
                mental: 1,
                spiritual: 3,
                social: 1,
            },
            hp_multiplier: 1.0,
            damage_bonus: -2,
        },
        CombatRole::Controller => RoleBias {
            attributes: AttributeSpread {
                physical: -1,
                mental: 3,
                spiritual: 2,
                social: 0,
            },
            hp_multiplier: 1.0,
            damage_bonus: -1,
        },
        CombatRole::None => RoleBias {
            attributes: AttributeSpread::default(),
            hp_multiplier: 1.0,
            damage_bonus: 0,
        },
    }
}

/// An authoring-tool roll: attributes, derived max health, and the role's damage bonus to carry
/// onto the resulting template's combat stats.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratedNpcStats {
    pub attributes: AttributeSpread,
    pub max_health: u32,
    pub damage_bonus: i32,
}

/// Rolls a tier/role combination's stats, used by catalog authoring tools. Ported from the
/// original's `generate_npc_stats`: each attribute is rolled within `[base + bias - 2, base +
/// bias + 2]`, clamped to the tier's overall range; max health is the tier's base HP
/// (`base * 10`) scaled by the role's `hp_multiplier`.
pub fn generate_stats(tier: Tier, role: CombatRole, rng: &mut impl Rng) -> GeneratedNpcStats {
    let (tier_min, tier_max) = tier.attribute_range();
    let base = tier.attribute_base();
    let bias = role_bias(role);

    let roll = |bias_value: i32, rng: &mut impl Rng| -> i32 {
        let min_val = (base + bias_value - 2).max(tier_min);
        let max_val = (base + bias_value + 2).min(tier_max).max(min_val);
        rng.gen_range(min_val..=max_val)
    };

    let attributes = AttributeSpread {
        physical: roll(bias.attributes.physical, rng),
        mental: roll(bias.attributes.mental, rng),
        spiritual: roll(bias.attributes.spiritual, rng),
        social: roll(bias.attributes.social, rng),
    };

    let base_hp = (base * 10) as f32;
    let max_health = (base_hp * bias.hp_multiplier).round().max(1.0) as u32;

    GeneratedNpcStats {
        attributes,
        max_health,
        damage_bonus: bias.damage_bonus,
    }
}
