mod armor;
mod resolution;
mod state;

pub use armor::{apply as apply_armor_mitigation, ArmorMitigationResult, ArmorPieceShare};
pub use resolution::{
    physical_bonus, resolve_attack, AttackOutcome, AttackResolution, AttackerProfile,
    DefenderProfile,
};
pub use state::{
    AutoAttackIntent, Combatant, CombatEngine, CombatState, CombatantStateKind, EntityRef,
    MinorAction, PrimaryAction, TurnActions,
};
