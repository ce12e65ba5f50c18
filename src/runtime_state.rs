use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;

use blackanchor_data::{CombatRole, EncounterId, InstanceId, NpcId, RoomId, Tier};

/// A spawn point's cooldown/population bookkeeping, keyed by an arbitrary `spawn_id` inside a
/// room (§3 Room State).
#[derive(Clone, Copy, Debug)]
pub struct SpawnTimer {
    pub last_spawn_at: i64,
    pub next_spawn_at: i64,
    pub alive_count: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct LootTimer {
    pub last_loot_roll_at: i64,
    pub next_loot_roll_at: i64,
}

/// Lazily created per-room record (§3 Room State).
#[derive(Clone, Debug)]
pub struct RoomState {
    pub room_id: RoomId,
    pub seed: u32,
    pub created_at: i64,
    pub last_active_at: i64,
    pub last_reset_at: i64,
    pub next_reset_at: i64,
    pub state_version: u64,
    pub spawn_timers: HashMap<String, SpawnTimer>,
    pub loot_timers: HashMap<String, LootTimer>,
    pub last_encounter_roll_at: Option<i64>,
    /// Template NPCs defeated in this room since the last reset (component I: "remove from
    /// room NPC set" for a non-instance NPC, §4.G.5 step 8). Cleared on `maybe_reset_room`.
    pub defeated_static_npcs: HashSet<NpcId>,
}

impl RoomState {
    fn new(room_id: RoomId, now: i64, reset_window: i64, seed: u32) -> Self {
        Self {
            room_id,
            seed,
            created_at: now,
            last_active_at: now,
            last_reset_at: now,
            next_reset_at: now + reset_window,
            state_version: 0,
            spawn_timers: HashMap::new(),
            loot_timers: HashMap::new(),
            last_encounter_roll_at: None,
            defeated_static_npcs: HashSet::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityType {
    Creature,
    Npc,
    Item,
}

/// A runtime entity, distinct from its template (§3 Entity Instance): a slain creature
/// destroys its instance, never the catalog template.
#[derive(Clone, Debug)]
pub struct EntityInstance {
    pub instance_id: InstanceId,
    pub template_id: NpcId,
    pub entity_type: EntityType,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub encounter_id: Option<EncounterId>,
    pub role: CombatRole,
    pub tier: Tier,
    pub hp_current: i32,
    pub hp_max: i32,
    pub speed_cost: f32,
    pub quantity: u32,
}

/// `instance_id -> {room_id, ...}`; at most one position per instance (§3 Entity Position).
#[derive(Clone, Debug)]
pub struct EntityPosition {
    pub room_id: RoomId,
    pub range_band: Option<u8>,
    pub engaged_target_id: Option<InstanceId>,
    pub leash_room_id: Option<RoomId>,
}

/// Lazy per-room runtime state, entity instances, and positions (component D). Storage
/// failures are modeled as `None`/`false` returns — fatal to the calling operation, never to
/// the server (§4.D Failure semantics); callers decide what "not eligible" means for them.
pub struct RuntimeStateStore {
    rooms: Mutex<HashMap<RoomId, RoomState>>,
    instances: Mutex<HashMap<InstanceId, EntityInstance>>,
    positions: Mutex<HashMap<InstanceId, EntityPosition>>,
    next_instance_id: AtomicU64,
    reset_window: Duration,
}

impl RuntimeStateStore {
    pub fn new(reset_window: Duration) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            instances: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            next_instance_id: AtomicU64::new(1),
            reset_window,
        }
    }

    pub fn next_instance_id(&self) -> InstanceId {
        InstanceId(self.next_instance_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Idempotent: returns the existing record or creates one seeded from `now`.
    pub fn get_or_create_room_state(&self, room_id: &RoomId, now: i64) -> RoomState {
        let mut rooms = self.rooms.lock().unwrap();
        let seed = rand::thread_rng().gen::<u32>();
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomState::new(room_id.clone(), now, self.reset_window.as_secs() as i64, seed))
            .clone()
    }

    pub fn update_last_active(&self, room_id: &RoomId, now: i64) {
        let mut rooms = self.rooms.lock().unwrap();
        if let Some(room) = rooms.get_mut(room_id) {
            room.last_active_at = now;
        }
    }

    pub fn update_last_encounter_roll(&self, room_id: &RoomId, now: i64) {
        let mut rooms = self.rooms.lock().unwrap();
        if let Some(room) = rooms.get_mut(room_id) {
            room.last_encounter_roll_at = Some(now);
        }
    }

    /// A template NPC (not a runtime instance) was defeated in this room; it drops out of the
    /// room's present set until the next reset (§4.G.5 step 8, §4.I).
    pub fn mark_static_npc_defeated(&self, room_id: &RoomId, npc_id: &NpcId, now: i64) {
        let mut rooms = self.rooms.lock().unwrap();
        let seed = rand::thread_rng().gen::<u32>();
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomState::new(room_id.clone(), now, self.reset_window.as_secs() as i64, seed));
        room.defeated_static_npcs.insert(npc_id.clone());
    }

    pub fn is_static_npc_defeated(&self, room_id: &RoomId, npc_id: &NpcId) -> bool {
        self.rooms
            .lock()
            .unwrap()
            .get(room_id)
            .map(|room| room.defeated_static_npcs.contains(npc_id))
            .unwrap_or(false)
    }

    /// The only correctness-critical primitive (§4.D). Atomic against concurrent callers via
    /// the rooms mutex: succeeds only if `alive_count < max_alive && now >= next_spawn_at`,
    /// and in the same critical section increments `alive_count`, stamps `last_spawn_at`, and
    /// sets `next_spawn_at = now + cooldown`.
    pub fn try_consume_spawn_eligibility(
        &self,
        room_id: &RoomId,
        spawn_id: &str,
        max_alive: u32,
        cooldown: Duration,
        now: i64,
    ) -> bool {
        let mut rooms = self.rooms.lock().unwrap();
        let seed = rand::thread_rng().gen::<u32>();
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomState::new(room_id.clone(), now, self.reset_window.as_secs() as i64, seed));

        let timer = room.spawn_timers.entry(spawn_id.to_string()).or_insert(SpawnTimer {
            last_spawn_at: 0,
            next_spawn_at: 0,
            alive_count: 0,
        });

        if timer.alive_count < max_alive && now >= timer.next_spawn_at {
            timer.alive_count += 1;
            timer.last_spawn_at = now;
            timer.next_spawn_at = now + cooldown.as_secs() as i64;
            true
        } else {
            false
        }
    }

    /// Lets the caller give back a spawn slot (e.g. when its creature dies), so the spawn
    /// point can refill before the cooldown fully elapses if capacity allows.
    pub fn release_spawn_slot(&self, room_id: &RoomId, spawn_id: &str) {
        let mut rooms = self.rooms.lock().unwrap();
        if let Some(room) = rooms.get_mut(room_id) {
            if let Some(timer) = room.spawn_timers.get_mut(spawn_id) {
                timer.alive_count = timer.alive_count.saturating_sub(1);
            }
        }
    }

    pub fn create_entity_instance(&self, instance: EntityInstance) {
        self.instances
            .lock()
            .unwrap()
            .insert(instance.instance_id, instance);
    }

    pub fn place_entity(&self, instance_id: InstanceId, position: EntityPosition) {
        self.positions.lock().unwrap().insert(instance_id, position);
    }

    pub fn get_instance(&self, instance_id: &InstanceId) -> Option<EntityInstance> {
        self.instances.lock().unwrap().get(instance_id).cloned()
    }

    pub fn update_instance(&self, instance_id: &InstanceId, f: impl FnOnce(&mut EntityInstance)) {
        if let Some(instance) = self.instances.lock().unwrap().get_mut(instance_id) {
            f(instance);
        }
    }

    pub fn remove_entity_from_world(&self, instance_id: &InstanceId, delete_instance: bool) {
        self.positions.lock().unwrap().remove(instance_id);
        if delete_instance {
            self.instances.lock().unwrap().remove(instance_id);
        }
    }

    /// Joins positions to instances, culling anything whose `expires_at <= now` in the same
    /// call (§4.D Expiration policy: "pay-as-you-query", no background sweeper).
    pub fn get_entities_in_room(&self, room_id: &RoomId, now: i64) -> Vec<(InstanceId, EntityInstance)> {
        let mut positions = self.positions.lock().unwrap();
        let mut instances = self.instances.lock().unwrap();

        let in_room: Vec<InstanceId> = positions
            .iter()
            .filter(|(_, pos)| &pos.room_id == room_id)
            .map(|(id, _)| *id)
            .collect();

        let mut live = Vec::new();
        for instance_id in in_room {
            let expired = instances
                .get(&instance_id)
                .and_then(|inst| inst.expires_at)
                .map(|expires_at| expires_at <= now)
                .unwrap_or(false);

            if expired {
                positions.remove(&instance_id);
                instances.remove(&instance_id);
                continue;
            }

            if let Some(instance) = instances.get(&instance_id) {
                live.push((instance_id, instance.clone()));
            }
        }
        live
    }

    /// Rolls `seed`/timers forward in one atomic update when `next_reset_at <= now`,
    /// bumping `state_version` (§3 invariant, Testable Property 5).
    pub fn maybe_reset_room(&self, room_id: &RoomId, now: i64) -> bool {
        let mut rooms = self.rooms.lock().unwrap();
        let seed = rand::thread_rng().gen::<u32>();
        let room = rooms
            .entry(room_id.clone())
            .or_insert_with(|| RoomState::new(room_id.clone(), now, self.reset_window.as_secs() as i64, seed));

        if now >= room.next_reset_at {
            room.seed = rand::thread_rng().gen::<u32>();
            room.last_reset_at = now;
            room.next_reset_at = now + self.reset_window.as_secs() as i64;
            room.state_version += 1;
            room.defeated_static_npcs.clear();
            true
        } else {
            false
        }
    }
}
