use serde::{Deserialize, Serialize};

use crate::ids::{NpcId, RoomId};

/// One block of an NPC's day, consulted by the Schedule Resolver (§4.B). `start`/`end` are
/// `"HH:MM"` strings, parsed the same way `WorldClock::is_time_in_range` parses shop hours;
/// `start > end` is a wrap-around block spanning midnight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub room_id: RoomId,
    pub start: String,
    pub end: String,
}

/// An NPC's full day, evaluated in order; an NPC is in exactly one block at a time by
/// construction (§4.B), so the resolver returns on first match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NpcSchedule {
    pub npc_id: NpcId,
    pub blocks: Vec<ScheduleBlock>,
}
