use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::prelude::{DateTime, Local};
use crossbeam_channel::Receiver;

use blackanchor_common::ServerMessage;
use blackanchor_data::RoomId;

use crate::WorldContext;

use super::messages::ControlMessage;

/// Per-tick timing, inserted fresh every pass (mirrors the teacher's `ServerTime` resource).
/// `local_time` is wall-clock, used only for log narration; `now`/`delta` drive the sim.
pub struct ServerTime {
    pub delta: Duration,
    pub now: Instant,
    pub local_time: DateTime<Local>,
}

/// The control channel the (out-of-scope) session layer's async tasks feed into, read from the
/// single dedicated game thread (§5 Scheduling model: "a single dedicated ticker drives combat
/// pacing for all active rooms").
pub struct ControlChannel {
    pub control_rx: Receiver<ControlMessage>,
}

/// The whole combat/world-simulation core, shared with whatever thread accepts sessions.
pub struct SharedWorld(pub Arc<WorldContext>);

/// Last `round_number` the tick loop has already logged a round-summary broadcast for, per
/// room, so the summary is emitted once per round boundary rather than once per tick.
#[derive(Default)]
pub struct RoundSummaryTracker(pub Mutex<HashMap<RoomId, u32>>);

/// Room-scoped broadcasts computed this tick, drained once per pass by `broadcast_system`.
/// Mirrors the teacher's `ServerMessages` resource (`pending_zone_messages` etc., drained by
/// `systems/server_messages.rs`), scoped to rooms since this core has no zone-wide audience.
#[derive(Default)]
pub struct ServerMessages {
    pending: Mutex<Vec<(RoomId, ServerMessage)>>,
}

impl ServerMessages {
    pub fn send_room_message(&self, room_id: RoomId, message: ServerMessage) {
        self.pending.lock().unwrap().push((room_id, message));
    }

    pub fn drain(&self) -> Vec<(RoomId, ServerMessage)> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}
