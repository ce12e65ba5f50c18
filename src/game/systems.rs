use std::time::Instant;

use bevy_ecs::prelude::{Res, ResMut};
use rand::{thread_rng, Rng};

use blackanchor_common::{
    AttackOutcome as MsgAttackOutcome, AttackResolved, AttributeSet, DefeatAnnounced,
    ServerMessage,
};
use blackanchor_data::{AttributeSpread, Catalog, RoomId};

use crate::combat::{
    resolve_attack, AttackOutcome, AttackerProfile, AutoAttackIntent, CombatEngine,
    DefenderProfile, EntityRef,
};
use crate::coordination::{NoopQuestNotifier, RoomCoordinator};
use crate::runtime_state::RuntimeStateStore;
use crate::WorldContext;

use super::messages::ControlMessage;
use super::resources::{
    ControlChannel, RoundSummaryTracker, ServerMessages, ServerTime, SharedWorld,
};

/// Drains the control channel and runs §4.I's on-room-entry sequence for every `RoomTouched`
/// notification, and starts/continues combat for `AttackCommand` (mirrors the teacher's
/// `control_server_system`, which drains the same kind of crossbeam channel once per tick).
pub fn control_channel_system(
    channel: Res<ControlChannel>,
    world: Res<SharedWorld>,
    messages: Res<ServerMessages>,
) {
    let ctx = &world.0;
    while let Ok(message) = channel.control_rx.try_recv() {
        match message {
            ControlMessage::RoomTouched { room_id } => {
                let Some(room) = ctx.catalog.room(&room_id) else {
                    log::warn!("room touched but not in catalog: {room_id}");
                    continue;
                };
                let mut rng = thread_rng();
                let mut combat = ctx.combat.lock().unwrap();
                let mut weather = ctx.weather.lock().unwrap();
                let mut schedule = ctx.schedule.lock().unwrap();
                let outcome = RoomCoordinator::enter_room(
                    room,
                    &ctx.catalog,
                    &ctx.clock,
                    &ctx.store,
                    &ctx.encounters,
                    &mut weather,
                    &mut schedule,
                    &combat,
                    &mut rng,
                );
                if let Some(encounter) = outcome.encounter {
                    log::info!(
                        "room {room_id}: encounter {} spawned {:?}",
                        encounter.encounter_id,
                        encounter.spawned
                    );
                    messages.send_room_message(room_id.clone(), ServerMessage::EncounterSpawned(encounter));
                }
                if let Some(event) = outcome.weather_changed {
                    messages.send_room_message(room_id.clone(), ServerMessage::WeatherChanged(event));
                }
                if let Some(line) = &outcome.weather_overlay {
                    log::debug!("room {room_id}: {line}");
                }
            }
            ControlMessage::AttackCommand {
                room_id,
                attacker_name,
                target_name,
            } => {
                let mut rng = thread_rng();
                let mut combat = ctx.combat.lock().unwrap();
                let attacker_entity = EntityRef::Player(attacker_name.clone());
                let target_entity = ctx
                    .catalog
                    .npc(&blackanchor_data::NpcId::from(target_name.as_str()))
                    .map(|npc| EntityRef::TemplateNpc {
                        npc_id: npc.npc_id.clone(),
                        room_id: room_id.clone(),
                    })
                    .unwrap_or_else(|| EntityRef::Player(target_name.clone()));
                // A production transport layer would thread the real player/NPC attribute
                // sets through here; this demo binary uses a neutral default since player
                // state lives in the (out-of-scope, §1) session table.
                combat.start_combat(
                    &room_id,
                    &attacker_name,
                    attacker_entity,
                    10,
                    &target_name,
                    target_entity,
                    10,
                    Instant::now(),
                    &mut rng,
                );
                log::info!("combat started in {room_id}: {attacker_name} vs {target_name}");
                messages.send_room_message(room_id.clone(), ServerMessage::CombatStarted { room_id });
            }
        }
    }
}

/// A neutral attribute set (every bonus zero) used wherever a combatant's real attributes live
/// outside this core (a player's, in the out-of-scope session table).
fn neutral_attributes() -> AttributeSet {
    AttributeSet {
        physical: 5,
        mental: 5,
        spiritual: 5,
        social: 5,
    }
}

fn npc_attributes(spread: &AttributeSpread) -> AttributeSet {
    AttributeSet {
        physical: spread.physical,
        mental: spread.mental,
        spiritual: spread.spiritual,
        social: spread.social,
    }
}

/// Looks up an `EntityRef`'s fighting/dodging skill and attributes from the catalog/runtime
/// store. Players have neither here (session table, out of scope per §1); NPCs and creature
/// instances read them off the template that spawned them.
fn combat_stats(
    entity: &EntityRef,
    catalog: &Catalog,
    store: &RuntimeStateStore,
) -> (i32, i32, AttributeSet) {
    let template = match entity {
        EntityRef::Player(_) => None,
        EntityRef::TemplateNpc { npc_id, .. } => catalog.npc(npc_id),
        EntityRef::Instance(instance_id) => store
            .get_instance(instance_id)
            .and_then(|inst| catalog.npc(&inst.template_id)),
    };
    match template {
        Some(template) => (
            template.skill("fighting"),
            template.skill("dodging"),
            npc_attributes(&template.attributes),
        ),
        None => (10, 10, neutral_attributes()),
    }
}

fn to_message_outcome(outcome: AttackOutcome) -> MsgAttackOutcome {
    match outcome {
        AttackOutcome::Hit => MsgAttackOutcome::Hit,
        AttackOutcome::CriticalHit => MsgAttackOutcome::CriticalHit,
        AttackOutcome::Glancing => MsgAttackOutcome::Glancing,
        AttackOutcome::Miss => MsgAttackOutcome::Miss,
        AttackOutcome::CriticalFailure => MsgAttackOutcome::CriticalFailure,
    }
}

/// Resolves one `AutoAttackIntent` (§4.G.5): builds attacker/defender profiles, calls
/// `resolve_attack` (which itself applies armor mitigation), writes the damage back to the
/// target's runtime instance when it has one, and routes the target to `RoomCoordinator` once
/// its HP reaches zero. Every step that produces a player-facing fact is pushed to
/// `ServerMessages`.
#[allow(clippy::too_many_arguments)]
fn resolve_auto_attack(
    intent: AutoAttackIntent,
    room_id: &RoomId,
    now: Instant,
    ctx: &WorldContext,
    combat: &mut CombatEngine,
    messages: &ServerMessages,
    rng: &mut impl Rng,
) {
    let Some(target_name) = intent.target_name else {
        log::debug!(
            "room {room_id}: {}'s auto-attack finds no target",
            intent.attacker_name
        );
        return;
    };
    let Some(target_entity) = combat
        .state(room_id)
        .and_then(|state| state.combatants.get(&target_name))
        .map(|c| c.entity.clone())
    else {
        log::warn!("room {room_id}: {target_name} is not a combatant here");
        return;
    };

    let (attacker_fighting, _, attacker_attributes) =
        combat_stats(&intent.attacker_entity, &ctx.catalog, &ctx.store);
    let (_, defender_dodging, defender_attributes) =
        combat_stats(&target_entity, &ctx.catalog, &ctx.store);

    let attacker_profile = AttackerProfile {
        fighting_skill: attacker_fighting,
        attributes: attacker_attributes,
        // Inventory/equipment lookup belongs to the out-of-scope session table for players;
        // creature templates in this catalog carry no weapon of their own.
        weapon: None,
    };
    let defender_profile = DefenderProfile {
        dodging_skill: defender_dodging,
        attributes: defender_attributes,
        armor: Vec::new(),
    };

    let resolution = resolve_attack(&attacker_profile, &defender_profile, rng);
    log::debug!(
        "room {room_id}: {} attacks {target_name} -- {:?}",
        intent.attacker_name,
        resolution.outcome
    );

    let damage = (resolution.damage_dealt > 0).then_some(resolution.damage_dealt);
    messages.send_room_message(
        room_id.clone(),
        ServerMessage::AttackResolved(AttackResolved {
            attacker: intent.attacker_name.clone(),
            target: target_name.clone(),
            outcome: to_message_outcome(resolution.outcome),
            damage,
            damage_type: damage.map(|_| resolution.damage_type),
        }),
    );

    if resolution.weapon_broke {
        messages.send_room_message(
            room_id.clone(),
            ServerMessage::WeaponBroke(blackanchor_common::WeaponBroke {
                owner: intent.attacker_name.clone(),
            }),
        );
    }

    let (Some(damage), EntityRef::Instance(instance_id)) = (damage, &target_entity) else {
        return;
    };
    ctx.store.update_instance(instance_id, |inst| {
        inst.hp_current = (inst.hp_current - damage).max(0);
    });
    let defeated = ctx
        .store
        .get_instance(instance_id)
        .map(|inst| inst.hp_current <= 0)
        .unwrap_or(false);
    if !defeated {
        return;
    }

    let now_secs = ctx.clock.world_seconds();
    let outcome = RoomCoordinator::on_defeated(
        room_id,
        &target_name,
        &target_entity,
        &intent.attacker_name,
        &ctx.catalog,
        &ctx.store,
        combat,
        &NoopQuestNotifier,
        now,
        now_secs,
        rng,
    );
    messages.send_room_message(
        room_id.clone(),
        ServerMessage::DefeatAnnounced(DefeatAnnounced {
            target: outcome.target_name.clone(),
            killer: outcome.killer_name.clone(),
            experience_awarded: Some(outcome.experience_awarded),
        }),
    );
    if outcome.combat_ended {
        messages.send_room_message(
            room_id.clone(),
            ServerMessage::CombatEnded {
                room_id: room_id.clone(),
            },
        );
    }
}

/// The BAT auto-attack pulse (§4.G.4), run at the ticker's configured rate for every active
/// combat room. Resolves the attack (§4.G.5), applies the result to whichever target carries
/// real runtime HP, and hands a defeat off to `RoomCoordinator` (§4.G.5 step 8). Every outcome
/// is pushed to `ServerMessages` for `broadcast_system` to relay (§7).
pub fn combat_tick_system(
    server_time: Res<ServerTime>,
    world: Res<SharedWorld>,
    round_tracker: Res<RoundSummaryTracker>,
    messages: Res<ServerMessages>,
) {
    let ctx = &world.0;
    if server_time.local_time.timestamp() % 60 == 0 {
        log::info!(
            "heartbeat {} -- {}",
            server_time.local_time.format("%Y-%m-%d %H:%M:%S"),
            ctx.clock.describe()
        );
    }
    let tau = std::time::Duration::from_secs_f64(ctx.config.bat_seconds);
    let mut rng = thread_rng();
    let mut combat = ctx.combat.lock().unwrap();
    let room_ids: Vec<_> = ctx.catalog.rooms.keys().cloned().collect();
    for room_id in room_ids {
        let health_of = |entity: &EntityRef| -> Option<(i32, i32)> {
            match entity {
                EntityRef::Instance(instance_id) => ctx
                    .store
                    .get_instance(instance_id)
                    .map(|inst| (inst.hp_current, inst.hp_max)),
                EntityRef::Player(_) | EntityRef::TemplateNpc { .. } => None,
            }
        };
        if let Some(intent) = combat.try_trigger_auto_attack(&room_id, server_time.now, tau) {
            resolve_auto_attack(
                intent,
                &room_id,
                server_time.now,
                ctx,
                &mut combat,
                &messages,
                &mut rng,
            );
        }

        if let Some(summary) = combat.round_summary(&room_id, health_of) {
            let mut last_logged = round_tracker.0.lock().unwrap();
            let already_logged = last_logged.get(&room_id) == Some(&summary.round_number);
            if !already_logged {
                let round_number = summary.round_number;
                log::info!(
                    "room {room_id}: round {} summary -- {:?}",
                    round_number,
                    summary
                        .combatants
                        .iter()
                        .map(|c| (c.name.as_str(), c.health_band, c.states.as_slice()))
                        .collect::<Vec<_>>()
                );
                messages.send_room_message(room_id.clone(), ServerMessage::RoundSummary(summary));
                last_logged.insert(room_id.clone(), round_number);
            }
        }
    }
}

/// Drains `ServerMessages` once per tick and hands each broadcast off (mirrors the teacher's
/// `systems/server_messages.rs`, which drains `ServerMessages.pending_*` and forwards to each
/// `GameClient.server_message_tx`). This core has no session/transport layer of its own (out
/// of scope per §1), so the stand-in for "send to every observer in the room" is a log line
/// under a dedicated target a transport layer would subscribe to instead.
pub fn broadcast_system(messages: Res<ServerMessages>) {
    for (room_id, message) in messages.drain() {
        log::info!(target: "blackanchor::broadcast", "room {room_id}: {}", message.describe());
    }
}
