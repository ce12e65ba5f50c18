use serde::{Deserialize, Serialize};

use blackanchor_data::{DamageType, RegionId, RoomId, WeatherType};

/// Health band used by the round-summary broadcast (§11 Supplemented Features: a direct port
/// of the original's `get_combat_summary`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthBand {
    Healthy,
    Injured,
    Wounded,
    Critical,
}

impl HealthBand {
    pub fn from_ratio(current: i32, max: i32) -> Self {
        if max <= 0 {
            return HealthBand::Critical;
        }
        let ratio = current as f64 / max as f64;
        if ratio > 0.75 {
            HealthBand::Healthy
        } else if ratio > 0.5 {
            HealthBand::Injured
        } else if ratio > 0.25 {
            HealthBand::Wounded
        } else {
            HealthBand::Critical
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Hit,
    CriticalHit,
    Glancing,
    Miss,
    CriticalFailure,
}

/// A single attack's result, broadcast to every observer in the room in a stable sentence
/// form (§7 "Combat outcomes ... are broadcast to every observer in the room").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttackResolved {
    pub attacker: String,
    pub target: String,
    pub outcome: AttackOutcome,
    pub damage: Option<i32>,
    pub damage_type: Option<DamageType>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArmorBroke {
    pub owner: String,
    pub slot: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeaponBroke {
    pub owner: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DefeatAnnounced {
    pub target: String,
    pub killer: String,
    pub experience_awarded: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CombatantSummary {
    pub name: String,
    pub health_band: HealthBand,
    pub states: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSummary {
    pub room_id: RoomId,
    pub round_number: u32,
    pub combatants: Vec<CombatantSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeatherChanged {
    pub region_id: RegionId,
    pub weather_type: WeatherType,
    pub intensity: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncounterSpawned {
    pub room_id: RoomId,
    pub encounter_id: u64,
    pub spawned: Vec<String>,
}

/// Broadcast/response messages emitted by the core. The transport layer (out of scope per §1)
/// is responsible for turning each of these into the text line actually sent to a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ServerMessage {
    AttackResolved(AttackResolved),
    ArmorBroke(ArmorBroke),
    WeaponBroke(WeaponBroke),
    DefeatAnnounced(DefeatAnnounced),
    RoundSummary(RoundSummary),
    WeatherChanged(WeatherChanged),
    EncounterSpawned(EncounterSpawned),
    CombatStarted { room_id: RoomId },
    CombatEnded { room_id: RoomId },
    Info(String),
    Error(String),
}

impl ServerMessage {
    /// The stable sentence form §7 asks every combat/weather/encounter broadcast to take; a
    /// real transport layer would render its own client-facing text, but this is what the
    /// core itself hands off.
    pub fn describe(&self) -> String {
        match self {
            ServerMessage::AttackResolved(a) => match a.outcome {
                AttackOutcome::Hit | AttackOutcome::CriticalHit | AttackOutcome::Glancing => {
                    format!("{} hits {} for {} damage.", a.attacker, a.target, a.damage.unwrap_or(0))
                }
                AttackOutcome::Miss => format!("{} misses {}.", a.attacker, a.target),
                AttackOutcome::CriticalFailure => format!("{} badly misses {}.", a.attacker, a.target),
            },
            ServerMessage::ArmorBroke(a) => format!("{}'s {} armor breaks.", a.owner, a.slot),
            ServerMessage::WeaponBroke(w) => format!("{}'s weapon breaks.", w.owner),
            ServerMessage::DefeatAnnounced(d) => format!("{} has defeated {}.", d.killer, d.target),
            ServerMessage::RoundSummary(s) => format!(
                "round {} -- {} combatant(s) remaining.",
                s.round_number,
                s.combatants.len()
            ),
            ServerMessage::WeatherChanged(w) => format!(
                "the weather in {} turns to {:?} (intensity {}).",
                w.region_id, w.weather_type, w.intensity
            ),
            ServerMessage::EncounterSpawned(e) => {
                format!("an encounter stirs in {}: {}.", e.room_id, e.spawned.join(", "))
            }
            ServerMessage::CombatStarted { room_id } => format!("combat begins in {room_id}."),
            ServerMessage::CombatEnded { room_id } => format!("combat ends in {room_id}."),
            ServerMessage::Info(s) => s.clone(),
            ServerMessage::Error(s) => s.clone(),
        }
    }
}
