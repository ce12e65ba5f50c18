use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;

use blackanchor_common::{attribute_bonus, CombatantSummary, CoreError, HealthBand, RoundSummary};
use blackanchor_data::{InstanceId, NpcId, RoomId};

/// Identifies whatever a combatant's underlying game object is, without pulling the session
/// table, NPC catalog, and runtime instance store into one object graph (§9: arena-and-index).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Player(String),
    TemplateNpc { npc_id: NpcId, room_id: RoomId },
    Instance(InstanceId),
}

impl EntityRef {
    pub fn is_player(&self) -> bool {
        matches!(self, EntityRef::Player(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatantStateKind {
    Observing,
    Engaged,
    Supporting,
    Disengaging,
    Exposed,
    Pinned,
    Staggered,
}

impl CombatantStateKind {
    pub fn label(self) -> &'static str {
        match self {
            CombatantStateKind::Observing => "observing",
            CombatantStateKind::Engaged => "engaged",
            CombatantStateKind::Supporting => "supporting",
            CombatantStateKind::Disengaging => "disengaging",
            CombatantStateKind::Exposed => "exposed",
            CombatantStateKind::Pinned => "pinned",
            CombatantStateKind::Staggered => "staggered",
        }
    }
}

/// Priority used to pick the one state shown to a player when a combatant holds several
/// (§4.G.6: "one is promoted for display").
const DISPLAY_PRIORITY: &[CombatantStateKind] = &[
    CombatantStateKind::Disengaging,
    CombatantStateKind::Pinned,
    CombatantStateKind::Staggered,
    CombatantStateKind::Exposed,
    CombatantStateKind::Supporting,
    CombatantStateKind::Engaged,
    CombatantStateKind::Observing,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimaryAction {
    Attack,
    Maneuver,
    Support,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinorAction {
    Move,
    Ready,
    Interact,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TurnActions {
    pub primary: Option<PrimaryAction>,
    pub minor: Option<MinorAction>,
}

#[derive(Clone, Debug)]
pub struct Combatant {
    pub entity: EntityRef,
    pub is_player: bool,
    pub target: Option<String>,
    pub initiative: i32,
    pub states: Vec<CombatantStateKind>,
    pub turn_actions: TurnActions,
    pub turn_started_at: Instant,
}

impl Combatant {
    pub fn display_state(&self) -> CombatantStateKind {
        for candidate in DISPLAY_PRIORITY {
            if self.states.contains(candidate) {
                return *candidate;
            }
        }
        CombatantStateKind::Observing
    }

    fn add_state(&mut self, state: CombatantStateKind) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }
}

/// One room's combat, keyed by combatant display name (`combatants[name].target` per §4.G.4).
#[derive(Clone, Debug)]
pub struct CombatState {
    pub room_id: RoomId,
    pub is_active: bool,
    pub combatants: HashMap<String, Combatant>,
    pub initiative_order: Vec<String>,
    pub current_turn_index: usize,
    pub round_number: u32,
}

impl CombatState {
    fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            is_active: false,
            combatants: HashMap::new(),
            initiative_order: Vec::new(),
            current_turn_index: 0,
            round_number: 1,
        }
    }

    pub fn current_combatant_name(&self) -> Option<&str> {
        self.initiative_order
            .get(self.current_turn_index)
            .map(|s| s.as_str())
    }

    /// Re-sorts `initiative_order` descending by rolled initiative, preserving which combatant
    /// `current_turn_index` points at across the reorder.
    fn resort_initiative(&mut self) {
        let current_name = self.current_combatant_name().map(|s| s.to_string());
        self.initiative_order
            .sort_by(|a, b| {
                let ia = self.combatants.get(a).map(|c| c.initiative).unwrap_or(0);
                let ib = self.combatants.get(b).map(|c| c.initiative).unwrap_or(0);
                ib.cmp(&ia)
            });
        if let Some(name) = current_name {
            self.current_turn_index = self
                .initiative_order
                .iter()
                .position(|n| *n == name)
                .unwrap_or(0);
        }
    }

    pub fn summary(&self) -> Vec<(String, CombatantStateKind)> {
        self.initiative_order
            .iter()
            .filter_map(|name| self.combatants.get(name).map(|c| (name.clone(), c.display_state())))
            .collect()
    }

    /// Builds the round-summary broadcast (§11 Supplemented Features, a direct port of the
    /// original's `get_combat_summary`). `health_of` resolves a combatant's current/max health;
    /// a combatant whose health can't be resolved here (a player, whose HP lives in the
    /// out-of-scope session table) is reported `Healthy`.
    pub fn round_summary(&self, health_of: impl Fn(&EntityRef) -> Option<(i32, i32)>) -> RoundSummary {
        let combatants = self
            .initiative_order
            .iter()
            .filter_map(|name| {
                self.combatants.get(name).map(|c| {
                    let health_band = health_of(&c.entity)
                        .map(|(current, max)| HealthBand::from_ratio(current, max))
                        .unwrap_or(HealthBand::Healthy);
                    CombatantSummary {
                        name: name.clone(),
                        health_band,
                        states: c.states.iter().map(|s| s.label().to_string()).collect(),
                    }
                })
            })
            .collect();
        RoundSummary {
            room_id: self.room_id.clone(),
            round_number: self.round_number,
            combatants,
        }
    }
}

pub struct AutoAttackIntent {
    pub attacker_name: String,
    pub attacker_entity: EntityRef,
    pub target_name: Option<String>,
}

/// Owns every active room's `CombatState` (component G). Carries no weapon/catalog/runtime
/// data of its own; callers supply per-combatant attack intervals and apply resolved damage.
pub struct CombatEngine {
    states: HashMap<RoomId, CombatState>,
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatEngine {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    pub fn state(&self, room_id: &RoomId) -> Option<&CombatState> {
        self.states.get(room_id)
    }

    /// Round-summary broadcast for whichever room has an active `CombatState` (§11). Returns
    /// `None` for a room with no combat record at all.
    pub fn round_summary(
        &self,
        room_id: &RoomId,
        health_of: impl Fn(&EntityRef) -> Option<(i32, i32)>,
    ) -> Option<RoundSummary> {
        self.states.get(room_id).map(|s| s.round_summary(health_of))
    }

    fn roll_initiative(physical: i32, rng: &mut impl Rng) -> i32 {
        rng.gen_range(1..=20) + attribute_bonus(physical)
    }

    /// §4.G.1: creates the room's `CombatState` if absent, activates it, and seeds both
    /// combatants as `Engaged` targeting each other.
    pub fn start_combat(
        &mut self,
        room_id: &RoomId,
        attacker_name: &str,
        attacker_entity: EntityRef,
        attacker_physical: i32,
        target_name: &str,
        target_entity: EntityRef,
        target_physical: i32,
        now: Instant,
        rng: &mut impl Rng,
    ) {
        let state = self
            .states
            .entry(room_id.clone())
            .or_insert_with(|| CombatState::new(room_id.clone()));
        state.is_active = true;

        for (name, entity, physical, target) in [
            (attacker_name, attacker_entity, attacker_physical, target_name),
            (target_name, target_entity, target_physical, attacker_name),
        ] {
            let is_player = entity.is_player();
            let combatant = state
                .combatants
                .entry(name.to_string())
                .or_insert_with(|| Combatant {
                    entity,
                    is_player,
                    target: None,
                    initiative: Self::roll_initiative(physical, rng),
                    states: Vec::new(),
                    turn_actions: TurnActions::default(),
                    turn_started_at: now,
                });
            combatant.target = Some(target.to_string());
            combatant.add_state(CombatantStateKind::Engaged);
            if !state.initiative_order.iter().any(|n| n == name) {
                state.initiative_order.push(name.to_string());
            }
        }
        state.resort_initiative();
    }

    /// §4.G.1: adds a combatant without disturbing the round in progress.
    pub fn join_combat(
        &mut self,
        room_id: &RoomId,
        name: &str,
        entity: EntityRef,
        physical: i32,
        target: Option<&str>,
        now: Instant,
        rng: &mut impl Rng,
    ) {
        let state = self
            .states
            .entry(room_id.clone())
            .or_insert_with(|| CombatState::new(room_id.clone()));
        let is_player = entity.is_player();
        let initial_state = if target.is_some() {
            CombatantStateKind::Engaged
        } else {
            CombatantStateKind::Observing
        };
        state
            .combatants
            .entry(name.to_string())
            .or_insert_with(|| Combatant {
                entity,
                is_player,
                target: target.map(|t| t.to_string()),
                initiative: Self::roll_initiative(physical, rng),
                states: vec![initial_state],
                turn_actions: TurnActions::default(),
                turn_started_at: now,
            });
        if !state.initiative_order.iter().any(|n| n == name) {
            state.initiative_order.push(name.to_string());
        }
        state.resort_initiative();
    }

    /// §4.G.1: marks `Disengaging`, removes the combatant, and ends combat once fewer than
    /// two combatants remain.
    pub fn leave_combat(&mut self, room_id: &RoomId, name: &str) {
        let should_end = {
            let Some(state) = self.states.get_mut(room_id) else {
                return;
            };
            if let Some(combatant) = state.combatants.get_mut(name) {
                combatant.add_state(CombatantStateKind::Disengaging);
            }
            state.combatants.remove(name);
            state.initiative_order.retain(|n| n != name);
            if state.current_turn_index >= state.initiative_order.len()
                && !state.initiative_order.is_empty()
            {
                state.current_turn_index = 0;
            }
            state.combatants.len() < 2
        };
        if should_end {
            self.end_combat(room_id);
        }
    }

    /// §4.G.1: flips `is_active` off but keeps the record for re-engagement.
    pub fn end_combat(&mut self, room_id: &RoomId) {
        if let Some(state) = self.states.get_mut(room_id) {
            state.is_active = false;
        }
    }

    /// Advances to the next combatant in `initiative_order`; wrapping past the last index
    /// bumps `round_number` and resets every combatant's turn (§4.G.2).
    fn advance_turn(&mut self, room_id: &RoomId, now: Instant) {
        let Some(state) = self.states.get_mut(room_id) else {
            return;
        };
        if state.initiative_order.is_empty() {
            return;
        }
        state.current_turn_index += 1;
        if state.current_turn_index >= state.initiative_order.len() {
            state.current_turn_index = 0;
            state.round_number += 1;
            for combatant in state.combatants.values_mut() {
                combatant.turn_actions = TurnActions::default();
                combatant.turn_started_at = now;
            }
        }
    }

    /// §4.G.3: fills the minor-action slot. Does not advance the turn.
    pub fn use_minor_action(
        &mut self,
        room_id: &RoomId,
        name: &str,
        action: MinorAction,
    ) -> Result<(), CoreError> {
        let state = self
            .states
            .get_mut(room_id)
            .ok_or_else(|| CoreError::NotFound(format!("no combat in room {room_id}")))?;
        let combatant = state
            .combatants
            .get_mut(name)
            .ok_or_else(|| CoreError::NotFound(format!("{name} is not in combat")))?;
        if combatant.turn_actions.minor.is_some() {
            return Err(CoreError::Rejected(format!(
                "{name} has already used a minor action this round"
            )));
        }
        combatant.turn_actions.minor = Some(action);
        Ok(())
    }

    /// §4.G.3: fills the primary-action slot; rejects a second use within the same round.
    /// Advances the turn when the acting combatant is the one whose turn it currently is.
    pub fn use_primary_action(
        &mut self,
        room_id: &RoomId,
        name: &str,
        action: PrimaryAction,
        now: Instant,
    ) -> Result<(), CoreError> {
        let is_current_turn = {
            let state = self
                .states
                .get_mut(room_id)
                .ok_or_else(|| CoreError::NotFound(format!("no combat in room {room_id}")))?;
            let combatant = state
                .combatants
                .get_mut(name)
                .ok_or_else(|| CoreError::NotFound(format!("{name} is not in combat")))?;
            if combatant.turn_actions.primary.is_some() {
                return Err(CoreError::Rejected(format!(
                    "{name} has already used a primary action this round"
                )));
            }
            combatant.turn_actions.primary = Some(action);
            state.current_combatant_name() == Some(name)
        };
        if is_current_turn {
            self.advance_turn(room_id, now);
        }
        Ok(())
    }

    /// Explicit yield (§4.G.3): advances the turn without filling the primary slot. Only the
    /// combatant whose turn it is may yield.
    pub fn yield_turn(&mut self, room_id: &RoomId, name: &str, now: Instant) -> Result<(), CoreError> {
        let state = self
            .states
            .get(room_id)
            .ok_or_else(|| CoreError::NotFound(format!("no combat in room {room_id}")))?;
        if state.current_combatant_name() != Some(name) {
            return Err(CoreError::Rejected(format!("it is not {name}'s turn")));
        }
        self.advance_turn(room_id, now);
        Ok(())
    }

    /// Switching target is free and takes effect on the next auto-attack; it never re-arms
    /// the pacing timer (§4.G.4).
    pub fn set_target(&mut self, room_id: &RoomId, name: &str, target: Option<&str>) -> Result<(), CoreError> {
        let state = self
            .states
            .get_mut(room_id)
            .ok_or_else(|| CoreError::NotFound(format!("no combat in room {room_id}")))?;
        let combatant = state
            .combatants
            .get_mut(name)
            .ok_or_else(|| CoreError::NotFound(format!("{name} is not in combat")))?;
        combatant.target = target.map(|t| t.to_string());
        Ok(())
    }

    fn pick_npc_target(state: &CombatState, acting_name: &str) -> Option<String> {
        state.combatants.get(acting_name).and_then(|c| c.target.clone()).or_else(|| {
            state
                .initiative_order
                .iter()
                .find(|name| {
                    *name != acting_name
                        && state
                            .combatants
                            .get(*name)
                            .map(|c| c.is_player)
                            .unwrap_or(false)
                })
                .cloned()
        })
    }

    /// §4.G.4: the BAT auto-attack check for whoever's turn it currently is. `tau` is
    /// `BAT · weapon.speed_cost` for that combatant, computed by the caller since the engine
    /// does not own weapon data. A player with no target does not consume the slot — the
    /// pacing timer simply pauses. An NPC always attempts, even with no player enemy present,
    /// so the failure (`NoTarget`) still consumes the slot and advances the turn (§4.G.7).
    pub fn try_trigger_auto_attack(
        &mut self,
        room_id: &RoomId,
        now: Instant,
        tau: Duration,
    ) -> Option<AutoAttackIntent> {
        let (name, entity, target) = {
            let state = self.states.get(room_id)?;
            if !state.is_active {
                return None;
            }
            let name = state.current_combatant_name()?.to_string();
            let combatant = state.combatants.get(&name)?;
            if combatant.turn_actions.primary.is_some() {
                return None;
            }
            if now.duration_since(combatant.turn_started_at) < tau {
                return None;
            }
            let target = if combatant.is_player {
                match &combatant.target {
                    Some(t) => Some(t.clone()),
                    None => return None,
                }
            } else {
                Self::pick_npc_target(state, &name)
            };
            (name, combatant.entity.clone(), target)
        };

        // Consumes the slot and advances the turn regardless of whether a target was found.
        if let Some(state) = self.states.get_mut(room_id) {
            if let Some(combatant) = state.combatants.get_mut(&name) {
                combatant.turn_actions.primary = Some(PrimaryAction::Attack);
            }
        }
        self.advance_turn(room_id, now);

        Some(AutoAttackIntent {
            attacker_name: name,
            attacker_entity: entity,
            target_name: target,
        })
    }
}
