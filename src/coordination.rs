use std::collections::HashSet;
use std::time::Instant;

use rand::Rng;

use blackanchor_common::{EncounterSpawned, WeatherChanged};
use blackanchor_data::{Catalog, ItemId, NpcId, RoomId, RoomTemplate, Tier};

use crate::clock::WorldClock;
use crate::combat::{CombatEngine, EntityRef};
use crate::encounter::EncounterService;
use crate::runtime_state::{EntityInstance, EntityPosition, EntityType, RuntimeStateStore};
use crate::schedule::ScheduleResolver;
use crate::weather::WeatherService;

/// Notified on a creature/NPC defeat so objective bookkeeping (out of scope per §1) can react;
/// the core only needs to call a single method, never inspect quest state itself.
pub trait QuestNotifier {
    fn defeat_creature(&self, killer_name: &str, template_id: &NpcId);
}

/// Used wherever a caller has no quest system wired up (tests, tools).
pub struct NoopQuestNotifier;

impl QuestNotifier for NoopQuestNotifier {
    fn defeat_creature(&self, _killer_name: &str, _template_id: &NpcId) {}
}

/// Everything that happens when a session steps into a room (§4.I): mark it active, roll the
/// reset window, try an encounter, refresh the region's weather, and report who else is here.
pub struct RoomEntryOutcome {
    pub did_reset: bool,
    pub encounter: Option<EncounterSpawned>,
    pub weather_changed: Option<WeatherChanged>,
    pub present_npcs: HashSet<NpcId>,
    pub weather_overlay: Option<String>,
}

/// Result of handing a defeat off to the runtime store, loot table, and quest interface
/// (§4.G.5 step 8, §4.I).
#[derive(Debug)]
pub struct DefeatOutcome {
    pub target_name: String,
    pub killer_name: String,
    pub experience_awarded: u32,
    pub looted_item_ids: Vec<ItemId>,
    pub combat_ended: bool,
}

/// Glue between the Combat Engine (G), Runtime State Store (D), and Encounter Service (F)
/// (component I). Holds no state of its own: every method takes the collaborators it needs,
/// matching the "explicit dependencies passed through a context" re-architecture in §9.
pub struct RoomCoordinator;

impl RoomCoordinator {
    /// §4.I "On room entry": mark active, reset if due, roll an encounter, refresh weather,
    /// and resolve who is present.
    #[allow(clippy::too_many_arguments)]
    pub fn enter_room(
        room: &RoomTemplate,
        catalog: &Catalog,
        clock: &WorldClock,
        store: &RuntimeStateStore,
        encounters: &EncounterService,
        weather: &mut WeatherService,
        schedule: &mut ScheduleResolver,
        combat: &CombatEngine,
        rng: &mut impl Rng,
    ) -> RoomEntryOutcome {
        let now_secs = clock.world_seconds();
        store.update_last_active(&room.room_id, now_secs);
        let did_reset = store.maybe_reset_room(&room.room_id, now_secs);

        let encounter = encounters.roll(room, catalog, store, now_secs, rng);

        let weather_changed = room
            .region_id
            .as_ref()
            .and_then(|region_id| weather.maybe_update(region_id, now_secs, rng));

        let weather_overlay = room
            .region_id
            .as_ref()
            .and_then(|region_id| weather.overlay(region_id, room.weather_exposure));

        let present_npcs = Self::present_npcs(room, catalog, clock, store, schedule, combat);

        RoomEntryOutcome {
            did_reset,
            encounter,
            weather_changed,
            present_npcs,
            weather_overlay,
        }
    }

    /// §4.I "On `get_present_npcs`": scheduled NPCs union the static set, minus any static NPC
    /// defeated since the last reset. A static or scheduled NPC currently a combatant in this
    /// room's combat state is treated as busy, deferring its schedule transition until the
    /// caller clears the deferral (§4.B).
    pub fn present_npcs(
        room: &RoomTemplate,
        catalog: &Catalog,
        clock: &WorldClock,
        store: &RuntimeStateStore,
        schedule: &mut ScheduleResolver,
        combat: &CombatEngine,
    ) -> HashSet<NpcId> {
        let in_combat = |npc_id: &NpcId| -> bool {
            combat
                .state(&room.room_id)
                .map(|state| state.is_active && state.combatants.contains_key(npc_id.as_ref()))
                .unwrap_or(false)
        };

        let mut present =
            schedule.get_present_npcs(&room.room_id, clock, catalog, |npc_id| !in_combat(npc_id));

        for npc_id in &room.static_npcs {
            if store.is_static_npc_defeated(&room.room_id, npc_id) {
                continue;
            }
            present.insert(npc_id.clone());
        }

        present
    }

    /// §4.G.5 step 8 / §4.I: routes a defeat to the right collaborator depending on whether
    /// the target was a runtime instance or a template NPC, rolls loot into the room, notifies
    /// the quest interface, and reports whether the room's combat should now end.
    #[allow(clippy::too_many_arguments)]
    pub fn on_defeated(
        room_id: &RoomId,
        target_name: &str,
        target_entity: &EntityRef,
        killer_name: &str,
        catalog: &Catalog,
        store: &RuntimeStateStore,
        combat: &mut CombatEngine,
        quest: &dyn QuestNotifier,
        now: Instant,
        now_secs: i64,
        rng: &mut impl Rng,
    ) -> DefeatOutcome {
        let template_id = match target_entity {
            EntityRef::Instance(instance_id) => {
                let template_id = store
                    .get_instance(instance_id)
                    .map(|inst| inst.template_id);
                store.remove_entity_from_world(instance_id, true);
                template_id
            }
            EntityRef::TemplateNpc { npc_id, .. } => {
                store.mark_static_npc_defeated(room_id, npc_id, now_secs);
                Some(npc_id.clone())
            }
            EntityRef::Player(_) => None,
        };

        let mut looted_item_ids = Vec::new();
        let mut experience_awarded = 25 + 5 * Tier::Low.exp_multiplier();

        if let Some(template_id) = &template_id {
            if let Some(template) = catalog.npc(template_id) {
                experience_awarded = template.experience_reward();
                for entry in &template.loot_table {
                    let drops = match entry.chance_in_100 {
                        None => true,
                        Some(chance) => rng.gen_range(1..=100u8) <= chance,
                    };
                    if drops {
                        looted_item_ids.push(entry.item_id.clone());
                    }
                }
            }
            quest.defeat_creature(killer_name, template_id);
        }

        for item_id in &looted_item_ids {
            let instance_id = store.next_instance_id();
            store.create_entity_instance(EntityInstance {
                instance_id,
                template_id: NpcId::from(item_id.as_ref()),
                entity_type: EntityType::Item,
                created_at: now_secs,
                expires_at: None,
                encounter_id: None,
                role: blackanchor_data::CombatRole::None,
                tier: Tier::Low,
                hp_current: 0,
                hp_max: 0,
                speed_cost: 0.0,
                quantity: 1,
            });
            store.place_entity(
                instance_id,
                EntityPosition {
                    room_id: room_id.clone(),
                    range_band: None,
                    engaged_target_id: None,
                    leash_room_id: None,
                },
            );
        }

        combat.leave_combat(room_id, target_name);
        let combat_ended = combat
            .state(room_id)
            .map(|state| !state.is_active)
            .unwrap_or(true);
        let _ = now;

        DefeatOutcome {
            target_name: target_name.to_string(),
            killer_name: killer_name.to_string(),
            experience_awarded,
            looted_item_ids,
            combat_ended,
        }
    }
}
