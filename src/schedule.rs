use std::collections::{HashMap, HashSet};

use blackanchor_data::{Catalog, NpcId, RoomId};

use crate::clock::{in_range, WorldClock};

fn parse_hhmm(value: &str) -> i64 {
    let (h, m) = value.split_once(':').unwrap_or(("0", "0"));
    let h: i64 = h.parse().unwrap_or(0);
    let m: i64 = m.parse().unwrap_or(0);
    h * 3600 + m * 60
}

/// Per-NPC deferral state machine (§4.B): `{Free} -> Deferred -> {Free}`. Deferral survives
/// calls and must be cleared by the caller once the reason lifts (combat ends, etc.).
#[derive(Default)]
pub struct ScheduleResolver {
    deferred: HashMap<NpcId, String>,
}

impl ScheduleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_deferred(&self, npc_id: &NpcId) -> bool {
        self.deferred.contains_key(npc_id)
    }

    pub fn clear_deferral(&mut self, npc_id: &NpcId) {
        self.deferred.remove(npc_id);
    }

    /// Returns the NPC ids scheduled to be in `room_id` right now. `busy_predicate` returns
    /// `false` when an NPC cannot change location (in combat, mid-transaction, mid-dialogue);
    /// it is only consulted for NPCs not already deferred.
    pub fn get_present_npcs(
        &mut self,
        room_id: &RoomId,
        clock: &WorldClock,
        catalog: &Catalog,
        mut busy_predicate: impl FnMut(&NpcId) -> bool,
    ) -> HashSet<NpcId> {
        let now_secs = clock.hour() * 3600 + clock.minute() * 60 + clock.second();
        let mut present = HashSet::new();

        for schedule in catalog.schedules.values() {
            if !schedule.blocks.iter().any(|b| &b.room_id == room_id) {
                continue;
            }
            if self.is_deferred(&schedule.npc_id) {
                continue;
            }
            if busy_predicate(&schedule.npc_id) {
                if let Some(block) = schedule.blocks.iter().find(|b| {
                    in_range(now_secs, parse_hhmm(&b.start), parse_hhmm(&b.end))
                }) {
                    if &block.room_id == room_id {
                        present.insert(schedule.npc_id.clone());
                    }
                }
            } else {
                self.deferred.insert(
                    schedule.npc_id.clone(),
                    "busy: cannot change location right now".to_string(),
                );
            }
        }

        present
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackanchor_data::{Catalog, NpcSchedule, ScheduleBlock};

    fn catalog_with_schedule() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.schedules.insert(
            NpcId::from("bartender"),
            NpcSchedule {
                npc_id: NpcId::from("bartender"),
                blocks: vec![
                    ScheduleBlock {
                        room_id: RoomId::from("tavern"),
                        start: "08:00".into(),
                        end: "22:00".into(),
                    },
                    ScheduleBlock {
                        room_id: RoomId::from("cellar"),
                        start: "22:00".into(),
                        end: "08:00".into(),
                    },
                ],
            },
        );
        catalog
    }

    #[test]
    fn present_during_scheduled_block() {
        let catalog = catalog_with_schedule();
        let clock = WorldClock::with_start(3, 12 * 3600);
        let mut resolver = ScheduleResolver::new();
        let present = resolver.get_present_npcs(&RoomId::from("tavern"), &clock, &catalog, |_| true);
        assert!(present.contains(&NpcId::from("bartender")));
    }

    #[test]
    fn absent_outside_scheduled_block() {
        let catalog = catalog_with_schedule();
        let clock = WorldClock::with_start(3, 12 * 3600);
        let mut resolver = ScheduleResolver::new();
        let present = resolver.get_present_npcs(&RoomId::from("cellar"), &clock, &catalog, |_| true);
        assert!(present.is_empty());
    }

    #[test]
    fn busy_npc_is_deferred_and_stays_deferred() {
        let catalog = catalog_with_schedule();
        let clock = WorldClock::with_start(3, 12 * 3600);
        let mut resolver = ScheduleResolver::new();
        let present = resolver.get_present_npcs(&RoomId::from("tavern"), &clock, &catalog, |_| false);
        assert!(present.is_empty());
        assert!(resolver.is_deferred(&NpcId::from("bartender")));

        // still deferred on a later call even though the predicate would now allow it
        let present = resolver.get_present_npcs(&RoomId::from("tavern"), &clock, &catalog, |_| true);
        assert!(present.is_empty());

        resolver.clear_deferral(&NpcId::from("bartender"));
        let present = resolver.get_present_npcs(&RoomId::from("tavern"), &clock, &catalog, |_| true);
        assert!(present.contains(&NpcId::from("bartender")));
    }
}
