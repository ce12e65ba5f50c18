use blackanchor_data::{ArmorData, ArmorSlot, DamageType, ItemInstanceState};

/// One armor piece's contribution to a mitigation pass.
#[derive(Clone, Copy, Debug)]
pub struct ArmorPieceShare {
    pub slot: ArmorSlot,
    pub dr: i32,
    pub absorbed: i32,
}

#[derive(Clone, Debug)]
pub struct ArmorMitigationResult {
    pub final_damage: i32,
    pub absorbed: i32,
    pub shares: Vec<ArmorPieceShare>,
}

/// Stateless mitigation function (component H, §4.H). Gathers every equipped armor piece that
/// carries a positive DR for `damage_type`, sums it, subtracts from `damage` floored at 1, then
/// distributes the absorbed amount proportionally across contributing pieces. The last piece
/// absorbs the rounding remainder so the per-piece shares always sum exactly to `absorbed`
/// (Testable Property 10), rather than leaving that to whichever rounding rule the `round()`
/// calls happen to produce.
pub fn apply(
    damage: i32,
    damage_type: DamageType,
    pieces: &[(ArmorSlot, &ArmorData, &ItemInstanceState)],
) -> ArmorMitigationResult {
    let contributing: Vec<(ArmorSlot, i32)> = pieces
        .iter()
        .filter(|(_, _, state)| state.armor_hp_current > 0)
        .filter_map(|(slot, data, _)| {
            data.damage_reduction
                .get(&damage_type)
                .filter(|dr| **dr > 0)
                .map(|dr| (*slot, *dr))
        })
        .collect();

    if contributing.is_empty() {
        return ArmorMitigationResult {
            final_damage: damage,
            absorbed: 0,
            shares: Vec::new(),
        };
    }

    let total_dr: i32 = contributing.iter().map(|(_, dr)| dr).sum();
    let final_damage = (damage - total_dr).max(1);
    let absorbed = damage - final_damage;

    let mut shares = Vec::with_capacity(contributing.len());
    let mut assigned = 0;
    for (index, (slot, dr)) in contributing.iter().enumerate() {
        let piece_absorbed = if index + 1 == contributing.len() {
            absorbed - assigned
        } else {
            let share = (absorbed as f64 * (*dr as f64) / (total_dr as f64)).round() as i32;
            assigned += share;
            share
        };
        shares.push(ArmorPieceShare {
            slot: *slot,
            dr: *dr,
            absorbed: piece_absorbed,
        });
    }

    ArmorMitigationResult {
        final_damage,
        absorbed,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn armor(slot: ArmorSlot, dr: i32) -> ArmorData {
        ArmorData {
            armor_slot: slot,
            damage_reduction: HashMap::from([(DamageType::Slashing, dr)]),
            armor_hp_max: 20,
        }
    }

    fn state(hp: u32) -> ItemInstanceState {
        ItemInstanceState {
            item_id: blackanchor_data::ItemId::from("test-armor"),
            durability_current: 0,
            armor_hp_current: hp,
        }
    }

    #[test]
    fn no_contributing_pieces_passes_damage_through() {
        let result = apply(10, DamageType::Slashing, &[]);
        assert_eq!(result.final_damage, 10);
        assert_eq!(result.absorbed, 0);
    }

    #[test]
    fn scenario_s2_chest_and_shield() {
        let chest = armor(ArmorSlot::Chest, 2);
        let shield = armor(ArmorSlot::Shield, 1);
        let chest_state = state(20);
        let shield_state = state(20);
        let pieces = [
            (ArmorSlot::Chest, &chest, &chest_state),
            (ArmorSlot::Shield, &shield, &shield_state),
        ];
        let result = apply(7, DamageType::Slashing, &pieces);
        assert_eq!(result.final_damage, 4);
        assert_eq!(result.absorbed, 3);
        let chest_share = result
            .shares
            .iter()
            .find(|s| s.slot == ArmorSlot::Chest)
            .unwrap();
        let shield_share = result
            .shares
            .iter()
            .find(|s| s.slot == ArmorSlot::Shield)
            .unwrap();
        assert_eq!(chest_share.absorbed, 2);
        assert_eq!(shield_share.absorbed, 1);
    }

    #[test]
    fn damage_never_drops_below_one_when_hit_lands() {
        let chest = armor(ArmorSlot::Chest, 50);
        let chest_state = state(20);
        let pieces = [(ArmorSlot::Chest, &chest, &chest_state)];
        let result = apply(3, DamageType::Slashing, &pieces);
        assert_eq!(result.final_damage, 1);
    }

    #[test]
    fn broken_armor_does_not_contribute() {
        let chest = armor(ArmorSlot::Chest, 5);
        let chest_state = state(0);
        let pieces = [(ArmorSlot::Chest, &chest, &chest_state)];
        let result = apply(10, DamageType::Slashing, &pieces);
        assert_eq!(result.final_damage, 10);
    }

    #[test]
    fn shares_always_sum_to_absorbed() {
        let a = armor(ArmorSlot::Head, 1);
        let b = armor(ArmorSlot::Chest, 1);
        let c = armor(ArmorSlot::Legs, 1);
        let sa = state(20);
        let sb = state(20);
        let sc = state(20);
        let pieces = [
            (ArmorSlot::Head, &a, &sa),
            (ArmorSlot::Chest, &b, &sb),
            (ArmorSlot::Legs, &c, &sc),
        ];
        let result = apply(10, DamageType::Slashing, &pieces);
        let sum: i32 = result.shares.iter().map(|s| s.absorbed).sum();
        assert_eq!(sum, result.absorbed);
    }
}
