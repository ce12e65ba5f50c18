mod messages;
mod resources;
mod systems;

pub use messages::ControlMessage;

use std::sync::Arc;
use std::time::{Duration, Instant};

use bevy_ecs::prelude::{Schedule, StageLabel, SystemStage};
use crossbeam_channel::Receiver;

use crate::WorldContext;

use resources::{ControlChannel, RoundSummaryTracker, ServerMessages, ServerTime, SharedWorld};
use systems::{broadcast_system, combat_tick_system, control_channel_system};

#[derive(Debug, Clone, PartialEq, Eq, Hash, StageLabel)]
enum GameStages {
    Input,
    Update,
    Broadcast,
}

/// Owns the single dedicated ticker (§5 Scheduling model) that drives every active room's
/// combat pacing, built on a `bevy_ecs` `World`/`Schedule` the way the teacher's `GameWorld`
/// drives its much larger system set — scaled down to this core's three stages (input, combat
/// update, broadcast).
pub struct GameWorld {
    tick_rate_hz: u64,
    control_rx: Receiver<ControlMessage>,
}

impl GameWorld {
    pub fn new(tick_rate_hz: u64, control_rx: Receiver<ControlMessage>) -> Self {
        Self {
            tick_rate_hz,
            control_rx,
        }
    }

    pub fn run(&mut self, ctx: Arc<WorldContext>) {
        let mut world = bevy_ecs::prelude::World::new();
        world.insert_resource(ControlChannel {
            control_rx: self.control_rx.clone(),
        });
        world.insert_resource(SharedWorld(ctx));
        world.insert_resource(RoundSummaryTracker::default());
        world.insert_resource(ServerMessages::default());

        let mut schedule = Schedule::default();
        schedule.add_stage(
            GameStages::Input,
            SystemStage::single_threaded().with_system(control_channel_system),
        );
        schedule.add_stage_after(
            GameStages::Input,
            GameStages::Update,
            SystemStage::single_threaded().with_system(combat_tick_system),
        );
        schedule.add_stage_after(
            GameStages::Update,
            GameStages::Broadcast,
            SystemStage::single_threaded().with_system(broadcast_system),
        );

        let min_tick_duration = Duration::from_millis(1000 / self.tick_rate_hz.max(1));
        let mut last_tick = Instant::now();

        loop {
            let current_tick = Instant::now();
            world.insert_resource(ServerTime {
                delta: current_tick - last_tick,
                now: current_tick,
                local_time: chrono::Local::now(),
            });
            schedule.run_once(&mut world);

            let elapsed = Instant::now() - current_tick;
            if elapsed < min_tick_duration {
                std::thread::sleep(min_tick_duration - elapsed);
            }
            last_tick = current_tick;
        }
    }
}
