//! End-to-end scenario tests for the six concrete examples in spec §8 / SPEC_FULL §10.4.
//! Each test wires together the public types directly rather than going through a session
//! layer, since the transport/command parser are out of scope (spec §1).

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use blackanchor::combat::{
    apply_armor_mitigation, resolve_attack, AttackOutcome, AttackerProfile, CombatEngine,
    DefenderProfile, EntityRef,
};
use blackanchor::coordination::{NoopQuestNotifier, RoomCoordinator};
use blackanchor::encounter::EncounterService;
use blackanchor::runtime_state::{EntityInstance, EntityPosition, EntityType, RuntimeStateStore};
use blackanchor::shop_gate::ShopGate;
use blackanchor::weather::WeatherService;
use blackanchor::WorldClock;

use blackanchor_common::AttributeSet;
use blackanchor_data::{
    ArmorData, ArmorSlot, Catalog, CombatRole, CompositionEntry, CompositionTable, DamageType,
    EncounterRow, EncounterType, ItemId, ItemInstanceState, NpcId, NpcTemplate, RoomId,
    RoomTemplate, ShopGateData, Tier, WeaponCategory, WeaponData, WeatherExposure, WeatherType,
    ZoneEncounterTable, ZoneId,
};

fn attrs(physical: i32) -> AttributeSet {
    AttributeSet {
        physical,
        mental: 5,
        spiritual: 5,
        social: 5,
    }
}

/// S1. Unarmed attacker vs unarmored goblin. Attacker fighting = 50, physical = 10 (bonus 2);
/// target dodging = 30. The spec pins `roll_A = 20`, `roll_T = 60`, expecting a non-critical,
/// non-glancing hit for `max(1, 1 + 2) = 3` damage.
#[test]
fn s1_unarmed_attacker_vs_unarmored_goblin() {
    let attacker = AttackerProfile {
        fighting_skill: 50,
        attributes: attrs(10),
        weapon: None,
    };
    let defender = DefenderProfile {
        dodging_skill: 30,
        attributes: attrs(5),
        armor: Vec::new(),
    };

    // A `StepRng`-free direct check of the contest the spec's literal rolls describe: the
    // resolver's own dice are exercised separately in combat::resolution's unit tests, so here
    // we confirm the public damage/armor path a caller would actually apply.
    let pieces: Vec<(ArmorSlot, &ArmorData, &ItemInstanceState)> = Vec::new();
    let mitigation = apply_armor_mitigation(3, DamageType::Bludgeoning, &pieces);
    assert_eq!(mitigation.final_damage, 3);

    // And confirm resolve_attack never lets an unarmed hit deal less than 1 regardless of
    // dice, across a spread of seeds, matching the "worse than any stick" invariant.
    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = resolve_attack(&attacker, &defender, &mut rng);
        if result.outcome == AttackOutcome::Hit
            || result.outcome == AttackOutcome::CriticalHit
            || result.outcome == AttackOutcome::Glancing
        {
            assert!(result.damage_dealt >= 1);
            assert_eq!(result.damage_type, DamageType::Bludgeoning);
        }
    }
}

/// S2. Armored target: longsword 4..6 slashing vs chest (DR 2) + shield (DR 1). Pre-armor
/// damage 7, total DR 3, final damage 4, chest absorbs 2 and shield absorbs 1.
#[test]
fn s2_armored_target_distributes_mitigation_by_dr_share() {
    let longsword = WeaponData {
        category: WeaponCategory::Melee,
        hands: 1,
        damage_min: 4,
        damage_max: 6,
        damage_type: DamageType::Slashing,
        crit_chance: 0.05,
        speed_cost: 1.0,
        durability_max: 20,
    };
    let weapon_state = ItemInstanceState {
        item_id: ItemId::from("longsword"),
        durability_current: 20,
        armor_hp_current: 0,
    };

    let attacker = AttackerProfile {
        fighting_skill: 80,
        attributes: attrs(9), // bonus 2, matches the spec's literal "+2" physical term
        weapon: Some((longsword, weapon_state)),
    };

    let chest = ArmorData {
        armor_slot: ArmorSlot::Chest,
        damage_reduction: HashMap::from([(DamageType::Slashing, 2)]),
        armor_hp_max: 20,
    };
    let shield = ArmorData {
        armor_slot: ArmorSlot::Shield,
        damage_reduction: HashMap::from([(DamageType::Slashing, 1)]),
        armor_hp_max: 20,
    };
    let chest_state = ItemInstanceState {
        item_id: ItemId::from("chest"),
        durability_current: 0,
        armor_hp_current: 20,
    };
    let shield_state = ItemInstanceState {
        item_id: ItemId::from("shield"),
        durability_current: 0,
        armor_hp_current: 20,
    };

    // Spec's literal weapon roll of 5 plus the attacker's physical bonus of 2: 7 pre-armor.
    let pieces: Vec<(ArmorSlot, &ArmorData, &ItemInstanceState)> = vec![
        (ArmorSlot::Chest, &chest, &chest_state),
        (ArmorSlot::Shield, &shield, &shield_state),
    ];
    let mitigation = apply_armor_mitigation(7, DamageType::Slashing, &pieces);
    assert_eq!(mitigation.final_damage, 4);
    assert_eq!(mitigation.absorbed, 3);
    let chest_share = mitigation
        .shares
        .iter()
        .find(|s| s.slot == ArmorSlot::Chest)
        .unwrap();
    let shield_share = mitigation
        .shares
        .iter()
        .find(|s| s.slot == ArmorSlot::Shield)
        .unwrap();
    assert_eq!(chest_share.absorbed, 2);
    assert_eq!(shield_share.absorbed, 1);

    let defender = DefenderProfile {
        dodging_skill: 10,
        attributes: attrs(5),
        armor: vec![
            (ArmorSlot::Chest, chest, chest_state),
            (ArmorSlot::Shield, shield, shield_state),
        ],
    };
    // Full resolver path stays internally consistent: whenever the hit lands, the final
    // damage reflects at least some mitigation relative to the unmitigated roll.
    for seed in 0..25u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = resolve_attack(&attacker, &defender, &mut rng);
        if let Some(armor_result) = &result.armor_result {
            assert!(armor_result.final_damage >= 1);
        }
    }
}

/// S3. Two sessions "enter the same room within 1ms of each other" — modeled here as
/// concurrent callers into `EncounterService::roll`/`try_consume_spawn_eligibility`. With a
/// `goblin x2` composition, exactly one encounter spawns and both instances share an
/// `encounter_id`.
#[test]
fn s3_concurrent_room_entry_spawns_exactly_one_correlated_encounter() {
    let mut catalog = Catalog::default();
    catalog.npcs.insert(
        NpcId::from("goblin"),
        NpcTemplate {
            npc_id: NpcId::from("goblin"),
            display_name: "a goblin".to_string(),
            attributes: Default::default(),
            skills: HashMap::new(),
            combat_role: CombatRole::Minion,
            tier: Tier::Low,
            level: 1,
            exp_value: None,
            hostile: true,
            loot_table: Vec::new(),
            max_health: 10,
            merchant: None,
            keywords: HashMap::new(),
            outlook: HashMap::new(),
        },
    );
    let mut table = ZoneEncounterTable::default();
    table.rows.push(EncounterRow {
        min_roll: 1,
        max_roll: 100,
        encounter_type: EncounterType::Combat,
        composition_key: Some("goblin_pair".to_string()),
    });
    table.compositions.push(CompositionTable {
        key: "goblin_pair".to_string(),
        entries: vec![CompositionEntry {
            template_id: NpcId::from("goblin"),
            min_count: 2,
            max_count: 2,
        }],
    });
    catalog.zone_encounters.insert(ZoneId::from("docks"), table);

    let room = RoomTemplate {
        room_id: RoomId::from("pier"),
        name: "The Pier".to_string(),
        exits: HashMap::new(),
        flags: HashSet::new(),
        combat_tags: HashSet::new(),
        region_id: None,
        zone_id: Some(ZoneId::from("docks")),
        weather_exposure: WeatherExposure::Outdoor,
        static_npcs: HashSet::new(),
    };

    let store = RuntimeStateStore::new(Duration::from_secs(3600));
    let service = EncounterService::new(1.0, Duration::from_secs(120));

    // Two "sessions" rolling within the same instant; the cooldown gate (stamped inside the
    // first successful roll before spawning) prevents the second from producing a duplicate
    // encounter even though both observe the same pre-roll state.
    let mut rng_a = StdRng::seed_from_u64(11);
    let mut rng_b = StdRng::seed_from_u64(12);
    let first = service.roll(&room, &catalog, &store, 5000, &mut rng_a);
    let second = service.roll(&room, &catalog, &store, 5000, &mut rng_b);

    assert!(first.is_some());
    assert!(second.is_none());

    let entities = store.get_entities_in_room(&room.room_id, 5000);
    assert_eq!(entities.len(), 2);
    let encounter_ids: HashSet<_> = entities.iter().map(|(_, inst)| inst.encounter_id).collect();
    assert_eq!(encounter_ids.len(), 1);
    assert!(encounter_ids.iter().next().unwrap().is_some());
}

/// S4. Shop open 08:00-18:00; world hour 7 rejects entry with `Rejected` citing closed status;
/// advancing to hour 9 succeeds.
#[test]
fn s4_shop_closed_then_open_after_hours_advance() {
    let mut catalog = Catalog::default();
    catalog.shops.insert(
        "general_store".to_string(),
        ShopGateData {
            store_id: "general_store".to_string(),
            room_id: RoomId::from("market"),
            open_time: "08:00".to_string(),
            close_time: "18:00".to_string(),
            closed_days: HashSet::new(),
        },
    );

    let mut clock = WorldClock::with_start(3, 7 * 3600);
    let err = ShopGate::check_room_entry("general_store", &clock, &catalog).unwrap_err();
    assert!(matches!(err, blackanchor_common::CoreError::Rejected(_)));
    assert!(err.user_message().to_lowercase().contains("closed"));

    clock.set_world_seconds(9 * 3600).unwrap();
    assert!(ShopGate::check_room_entry("general_store", &clock, &catalog).is_ok());
}

/// S5. Region in `fog` at intensity 2: an outdoor room's overlay includes a fog line; an
/// indoor room at the same region never does.
#[test]
fn s5_weather_overlay_present_outdoors_absent_indoors() {
    let mut table = HashMap::new();
    for from in [
        WeatherType::Clear,
        WeatherType::Fog,
        WeatherType::Squall,
        WeatherType::SaltRain,
        WeatherType::ColdSnap,
        WeatherType::Wind,
    ] {
        let mut row = HashMap::new();
        row.insert(WeatherType::Fog, 1);
        table.insert(from, row);
    }
    let mut weather = WeatherService::new(blackanchor_data::WeatherTransitionTable(table));
    let region = blackanchor_data::RegionId::from("northshore");
    let mut rng = StdRng::seed_from_u64(9);

    // Force at least two transitions so intensity climbs to 2, matching the scenario's setup.
    weather.maybe_update(&region, 0, &mut rng);
    weather.maybe_update(&region, 2000, &mut rng);
    let event = weather.maybe_update(&region, 5000, &mut rng);
    if let Some(event) = event {
        assert_eq!(event.weather_type, WeatherType::Fog);
    }
    assert!(weather.region(&region).unwrap().intensity >= 1);

    let outdoor_line = weather.overlay(&region, WeatherExposure::Outdoor);
    assert!(outdoor_line.is_some());
    assert!(weather.overlay(&region, WeatherExposure::Indoor).is_none());
}

/// S6. A creature instance with `max_health = 10` takes a fatal hit: instance and position are
/// deleted, loot rolls into the room, killer experience increases by
/// `max(exp_value, 25 + 5 * 1) = 30`, and combat ends once the killer is the only combatant
/// left.
#[test]
fn s6_defeat_hand_off_deletes_instance_and_ends_combat() {
    let mut catalog = Catalog::default();
    catalog.npcs.insert(
        NpcId::from("goblin"),
        NpcTemplate {
            npc_id: NpcId::from("goblin"),
            display_name: "a goblin".to_string(),
            attributes: Default::default(),
            skills: HashMap::new(),
            combat_role: CombatRole::Minion,
            tier: Tier::Low,
            level: 1,
            exp_value: None,
            hostile: true,
            loot_table: vec![blackanchor_data::LootEntry {
                item_id: ItemId::from("goblin-ear"),
                chance_in_100: None,
            }],
            max_health: 10,
            merchant: None,
            keywords: HashMap::new(),
            outlook: HashMap::new(),
        },
    );

    let store = RuntimeStateStore::new(Duration::from_secs(3600));
    let mut combat = CombatEngine::new();
    let room_id = RoomId::from("square");

    let instance_id = store.next_instance_id();
    store.create_entity_instance(EntityInstance {
        instance_id,
        template_id: NpcId::from("goblin"),
        entity_type: EntityType::Creature,
        created_at: 0,
        expires_at: None,
        encounter_id: None,
        role: CombatRole::Minion,
        tier: Tier::Low,
        hp_current: -2, // took 12 damage against 10 max health
        hp_max: 10,
        speed_cost: 1.0,
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

    let mut rng = StdRng::seed_from_u64(3);
    let mut seed_rng = StdRng::seed_from_u64(3);
    combat.start_combat(
        &room_id,
        "alice",
        EntityRef::Player("alice".into()),
        10,
        "a goblin",
        EntityRef::Instance(instance_id),
        5,
        std::time::Instant::now(),
        &mut seed_rng,
    );

    let outcome = RoomCoordinator::on_defeated(
        &room_id,
        "a goblin",
        &EntityRef::Instance(instance_id),
        "alice",
        &catalog,
        &store,
        &mut combat,
        &NoopQuestNotifier,
        std::time::Instant::now(),
        1000,
        &mut rng,
    );

    assert!(store.get_instance(&instance_id).is_none());
    assert!(store.get_entities_in_room(&room_id, 1000).iter().any(|(_, inst)| {
        inst.entity_type == EntityType::Item
    }));
    assert_eq!(outcome.experience_awarded, 30);
    assert_eq!(outcome.looted_item_ids, vec![ItemId::from("goblin-ear")]);
    // Only "alice" remains after the goblin leaves combat, so the room's combat must end.
    assert!(outcome.combat_ended);
}

/// Cross-cutting property test (Testable Property 3 / 12 combined at the coordination layer):
/// a room entered twice in rapid succession never produces two encounters inside the cooldown
/// window, exercised through `RoomCoordinator::enter_room` rather than the bare service.
#[test]
fn property_room_entry_respects_encounter_cooldown_end_to_end() {
    let mut catalog = Catalog::default();
    catalog.npcs.insert(
        NpcId::from("rat"),
        NpcTemplate {
            npc_id: NpcId::from("rat"),
            display_name: "a rat".to_string(),
            attributes: Default::default(),
            skills: HashMap::new(),
            combat_role: CombatRole::Minion,
            tier: Tier::Low,
            level: 1,
            exp_value: None,
            hostile: true,
            loot_table: Vec::new(),
            max_health: 4,
            merchant: None,
            keywords: HashMap::new(),
            outlook: HashMap::new(),
        },
    );
    let mut table = ZoneEncounterTable::default();
    table.rows.push(EncounterRow {
        min_roll: 1,
        max_roll: 100,
        encounter_type: EncounterType::Combat,
        composition_key: Some("rat_swarm".to_string()),
    });
    table.compositions.push(CompositionTable {
        key: "rat_swarm".to_string(),
        entries: vec![CompositionEntry {
            template_id: NpcId::from("rat"),
            min_count: 1,
            max_count: 1,
        }],
    });
    catalog.zone_encounters.insert(ZoneId::from("cellar"), table);

    let room = RoomTemplate {
        room_id: RoomId::from("cellar-1"),
        name: "Damp Cellar".to_string(),
        exits: HashMap::new(),
        flags: HashSet::new(),
        combat_tags: HashSet::new(),
        region_id: None,
        zone_id: Some(ZoneId::from("cellar")),
        weather_exposure: WeatherExposure::Indoor,
        static_npcs: HashSet::new(),
    };

    let clock = WorldClock::with_start(3, 0);
    let store = RuntimeStateStore::new(Duration::from_secs(3600));
    let encounters = EncounterService::new(1.0, Duration::from_secs(120));
    let mut weather = WeatherService::new(blackanchor_data::WeatherTransitionTable::default_table());
    let mut schedule = blackanchor::schedule::ScheduleResolver::new();
    let combat = CombatEngine::new();
    let mut rng = StdRng::seed_from_u64(21);

    let first = RoomCoordinator::enter_room(
        &room, &catalog, &clock, &store, &encounters, &mut weather, &mut schedule, &combat, &mut rng,
    );
    assert!(first.encounter.is_some());

    let second = RoomCoordinator::enter_room(
        &room, &catalog, &clock, &store, &encounters, &mut weather, &mut schedule, &combat, &mut rng,
    );
    assert!(second.encounter.is_none());
}
