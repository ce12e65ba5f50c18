mod attributes;
mod error;
mod interfaces;
mod maneuver;
mod messages;
mod player;
mod resource_pool;
mod skills;

pub use attributes::{attribute_bonus, AttributeFamily, AttributeSet};
pub use error::{CoreError, CoreResult};
pub use interfaces::{AuthProvider, StorageBackend, StorageOp, VerifiedIdentity, MAX_BATCH_WRITE_OPS};
pub use maneuver::ManeuverId;
pub use messages::{
    ArmorBroke, AttackOutcome, AttackResolved, CombatantSummary, DefeatAnnounced,
    EncounterSpawned, HealthBand, RoundSummary, ServerMessage, WeaponBroke, WeatherChanged,
};
pub use player::{Equipment, PlayerCharacter};
pub use resource_pool::{ResourcePool, ResourceTriple};
pub use skills::{
    check_skill_advancement, effective_skill, roll_skill_check, skill_attributes,
    SkillCheckOutcome, SkillCheckResult, SKILLS,
};
