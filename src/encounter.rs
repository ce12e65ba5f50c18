use std::time::Duration;

use rand::Rng;

use blackanchor_common::EncounterSpawned;
use blackanchor_data::{Catalog, CombatRole, EncounterId, EncounterType, RoomId, RoomTemplate};

use crate::runtime_state::{EntityInstance, EntityPosition, EntityType, RuntimeStateStore};

/// Zone d100 table + composition table, gated by a per-room cooldown (component F).
pub struct EncounterService {
    base_chance: f64,
    cooldown: Duration,
    next_encounter_id: std::sync::atomic::AtomicU64,
    debug: bool,
}

impl EncounterService {
    pub fn new(base_chance: f64, cooldown: Duration) -> Self {
        Self {
            base_chance,
            cooldown,
            next_encounter_id: std::sync::atomic::AtomicU64::new(1),
            debug: std::env::var("BLACKANCHOR_DEBUG_ENCOUNTERS").is_ok(),
        }
    }

    /// No-op unless the room's zone has a table. Cooldown gate sits before the d100 roll so
    /// deterministic dry runs can be debugged (§4.F rationale). With `BLACKANCHOR_DEBUG_ENCOUNTERS`
    /// set, traces the roll/cooldown/composition decision chain at `debug!` level (§11).
    pub fn roll(
        &self,
        room: &RoomTemplate,
        catalog: &Catalog,
        store: &RuntimeStateStore,
        now: i64,
        rng: &mut impl Rng,
    ) -> Option<EncounterSpawned> {
        let zone_id = room.zone_id.as_ref()?;
        let Some(table) = catalog.zone_table(zone_id) else {
            if self.debug {
                log::debug!("encounter: room {} has zone {zone_id} but no table", room.room_id);
            }
            return None;
        };

        let base_roll = rng.gen_range(0.0..1.0);
        if base_roll > self.base_chance {
            if self.debug {
                log::debug!(
                    "encounter: room {} base chance roll {base_roll:.3} > {}, skipping",
                    room.room_id,
                    self.base_chance
                );
            }
            return None;
        }

        let room_state = store.get_or_create_room_state(&room.room_id, now);
        if let Some(last) = room_state.last_encounter_roll_at {
            if now - last < self.cooldown.as_secs() as i64 {
                if self.debug {
                    log::debug!(
                        "encounter: room {} still on cooldown ({} < {})",
                        room.room_id,
                        now - last,
                        self.cooldown.as_secs()
                    );
                }
                return None;
            }
        }
        store.update_last_encounter_roll(&room.room_id, now);

        let roll = rng.gen_range(1..=100);
        let Some(row) = table.row_for_roll(roll) else {
            if self.debug {
                log::debug!("encounter: room {} d100 roll {roll} matched no row", room.room_id);
            }
            return None;
        };
        if row.encounter_type != EncounterType::Combat {
            if self.debug {
                log::debug!(
                    "encounter: room {} d100 roll {roll} matched a non-combat row",
                    room.room_id
                );
            }
            return None;
        }
        let composition_key = row.composition_key.as_ref()?;
        let composition = table.composition(composition_key)?;
        if self.debug {
            log::debug!(
                "encounter: room {} d100 roll {roll} matched composition {composition_key:?}",
                room.room_id
            );
        }

        let encounter_id = EncounterId(
            self.next_encounter_id
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        );
        let mut spawned = Vec::new();

        for entry in &composition.entries {
            let Some(template) = catalog.npc(&entry.template_id) else {
                continue;
            };
            let count = if entry.min_count == entry.max_count {
                entry.min_count
            } else {
                rng.gen_range(entry.min_count..=entry.max_count)
            };
            for _ in 0..count {
                let instance_id = store.next_instance_id();
                store.create_entity_instance(EntityInstance {
                    instance_id,
                    template_id: template.npc_id.clone(),
                    entity_type: EntityType::Creature,
                    created_at: now,
                    expires_at: None,
                    encounter_id: Some(encounter_id),
                    role: if template.combat_role == CombatRole::None {
                        CombatRole::Minion
                    } else {
                        template.combat_role
                    },
                    tier: template.tier,
                    hp_current: template.max_health as i32,
                    hp_max: template.max_health as i32,
                    speed_cost: 1.0,
                    quantity: 1,
                });
                store.place_entity(
                    instance_id,
                    EntityPosition {
                        room_id: room.room_id.clone(),
                        range_band: None,
                        engaged_target_id: None,
                        leash_room_id: Some(room.room_id.clone()),
                    },
                );
                spawned.push(template.display_name.clone());
            }
        }

        if spawned.is_empty() {
            return None;
        }

        Some(EncounterSpawned {
            room_id: room.room_id.clone(),
            encounter_id: encounter_id.0,
            spawned,
        })
    }
}
