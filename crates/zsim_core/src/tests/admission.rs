use super::*;

#[test]
fn test_first_action_enters_battle() {
    let mut world = test_world();
    let mut data = test_data(&world);

    let n = node(&world, "7_basic", 10, true);
    assert_eq!(n.end_tick(), 40);
    data.push_node(n, 10, &mut world).unwrap();

    assert_eq!(
        signal_log(&world).count_for(ListenerSignal::EnterBattle, CharacterId(7)),
        1
    );
    assert_eq!(data.personal_stack(CharacterId(7)).map(NodeStack::len), Some(1));
    assert_eq!(data.global_stack().len(), 1);
    assert_eq!(data.operating_now(), Some(CharacterId(7)));
    assert_eq!(data.pending().len(), 1);
}

#[test]
fn test_enter_battle_only_once_per_actor() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_basic", 0);
    admit(&mut data, &mut world, "7_basic", 30);
    admit(&mut data, &mut world, "11_basic", 60);
    admit(&mut data, &mut world, "7_basic", 90);

    let log = signal_log(&world);
    assert_eq!(log.count_for(ListenerSignal::EnterBattle, CharacterId(7)), 1);
    assert_eq!(log.count_for(ListenerSignal::EnterBattle, CharacterId(11)), 1);
    assert_eq!(log.count(ListenerSignal::EnterBattle), 2);
}

#[test]
fn test_unfinished_action_is_displaced_and_mission_removed() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_basic", 10);
    admit(&mut data, &mut world, "11_basic", 12);
    assert!(world.missions.contains_tag(&SkillTag::from("7_basic")));

    data.push_node(node(&world, "7_dodge", 35, true), 35, &mut world)
        .unwrap();

    assert!(!world.missions.contains_tag(&SkillTag::from("7_basic")));
    assert!(world.missions.contains_tag(&SkillTag::from("11_basic")));
    assert_eq!(world.missions.len(), 1);
    assert_eq!(data.counters().displacements, 1);
    let top = data.personal_stack(CharacterId(7)).and_then(NodeStack::peek);
    assert_eq!(top.map(|n| n.skill_tag().as_str()), Some("7_dodge"));
}

#[test]
fn test_naturally_finished_action_is_not_displaced() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_basic", 10);

    data.push_node(node(&world, "7_basic", 45, true), 45, &mut world)
        .unwrap();

    assert_eq!(data.counters().displacements, 0);
    assert!(world.missions.get("7_basic@10").is_some());
}

#[test]
fn test_second_active_node_same_tick_is_fatal_before_mutation() {
    let mut world = test_world();
    let mut data = test_data(&world);
    let first = node(&world, "7_basic", 10, true);
    let second = node(&world, "11_basic", 10, true);
    data.push_node(first, 10, &mut world).unwrap();

    let err = data.push_node(second, 10, &mut world).unwrap_err();
    assert_eq!(
        err,
        PreloadError::MultipleActiveActions {
            tick: 10,
            pending: SkillTag::from("7_basic"),
            incoming: SkillTag::from("11_basic"),
        }
    );
    assert_eq!(data.pending().len(), 1);
    assert_eq!(data.global_stack().len(), 1);
    assert!(data.personal_stack(CharacterId(11)).is_none());
    assert_eq!(data.operating_now(), Some(CharacterId(7)));
    assert_eq!(
        signal_log(&world).count_for(ListenerSignal::EnterBattle, CharacterId(11)),
        0
    );
}

#[test]
fn test_passive_node_alongside_active_same_tick() {
    let mut world = test_world();
    let mut data = test_data(&world);
    data.push_node(node(&world, "7_basic", 10, true), 10, &mut world)
        .unwrap();
    data.push_node(node(&world, "11_coordinated", 10, false), 10, &mut world)
        .unwrap();
    assert_eq!(data.pending().len(), 2);
    assert_eq!(data.operating_now(), Some(CharacterId(7)));
}

#[test]
fn test_additional_damage_rides_alongside() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_basic", 10);

    data.push_node(node(&world, "7_additional", 15, false), 15, &mut world)
        .unwrap();

    assert_eq!(data.counters().displacements, 0);
    assert!(world.missions.contains_tag(&SkillTag::from("7_basic")));
    assert_eq!(data.personal_stack(CharacterId(7)).map(NodeStack::len), Some(2));
    // Passive nodes never move "who is acting".
    assert_eq!(
        data.latest_active().map(|n| n.skill_tag().as_str()),
        Some("7_basic")
    );
}

#[test]
fn test_uninterruptible_only_yields_to_dodge() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_ultimate", 0);

    let err = data
        .push_node(node(&world, "7_basic", 10, true), 10, &mut world)
        .unwrap_err();
    assert!(matches!(err, PreloadError::UninterruptibleDisplaced { .. }));
    assert_eq!(data.global_stack().len(), 1);
    assert!(world.missions.contains_tag(&SkillTag::from("7_ultimate")));

    data.push_node(node(&world, "7_dodge", 10, true), 10, &mut world)
        .unwrap();
    assert_eq!(data.counters().displacements, 1);
    assert!(!world.missions.contains_tag(&SkillTag::from("7_ultimate")));
}

#[test]
fn test_force_change_requires_running_top_node() {
    let mut world = test_world();
    let mut data = test_data(&world);
    let incoming = node(&world, "7_dodge", 40, true);

    let err = data
        .force_change_action(&incoming, &mut world.missions)
        .unwrap_err();
    assert!(matches!(err, PreloadError::NothingToDisplace { .. }));

    admit(&mut data, &mut world, "7_basic", 10);
    let err = data
        .force_change_action(&incoming, &mut world.missions)
        .unwrap_err();
    assert_eq!(
        err,
        PreloadError::DisplacedAlreadyFinished {
            displaced: SkillTag::from("7_basic"),
            incoming: SkillTag::from("7_dodge"),
            end_tick: 40,
            start_tick: 40,
        }
    );
    assert!(world.missions.contains_tag(&SkillTag::from("7_basic")));
}

#[test]
fn test_occupancy_and_on_field_queries() {
    let mut world = test_world();
    let mut data = test_data(&world);
    assert!(!data.is_occupied(CharacterId(7), 0));
    assert!(data.on_field_node(0).is_none());

    admit(&mut data, &mut world, "7_basic", 0);
    data.push_node(node(&world, "11_coordinated", 5, false), 5, &mut world)
        .unwrap();

    assert!(data.is_occupied(CharacterId(7), 29));
    assert!(!data.is_occupied(CharacterId(7), 30));
    assert!(data.is_occupied(CharacterId(11), 5));
    // The passive node is newer but the on-field node is the active one.
    assert_eq!(
        data.on_field_node(6).map(|n| n.skill_tag().as_str()),
        Some("7_basic")
    );
    assert!(data.on_field_node(30).is_none());
}

#[test]
fn test_global_stack_capacity_bounded() {
    let mut world = test_world();
    let mut data = test_data(&world);
    for i in 0..8 {
        admit(&mut data, &mut world, "7_basic", i * 30);
    }
    assert_eq!(data.global_stack().len(), GLOBAL_STACK_CAPACITY);
    assert_eq!(
        data.personal_stack(CharacterId(7)).map(NodeStack::len),
        Some(PERSONAL_STACK_CAPACITY)
    );
    assert_eq!(data.global_stack().peek().map(|n| n.preload_tick()), Some(210));
}

#[test]
fn test_trigger_arms_quick_assist_for_next_actor() {
    let mut world = test_world();
    let mut data = test_data(&world);
    assert!(data.quick_assist().is_none());
    admit(&mut data, &mut world, "7_chain", 0);

    let qa = data.quick_assist().unwrap();
    assert!(qa.is_ready(CharacterId(11), 10));
    assert!(!qa.is_ready(CharacterId(13), 10));
}

#[test]
fn test_actions_during_attack_are_answers() {
    let mut world = test_world();
    let mut data = test_data(&world);
    admit(&mut data, &mut world, "7_basic", 0);
    assert!(data.begin_enemy_attack(EnemyAttack {
        attack_id: 0,
        declared_tick: 2,
        hit_tick: 20,
    }));
    admit(&mut data, &mut world, "11_basic", 5);
    data.push_node(node(&world, "7_parry", 6, true), 6, &mut world)
        .unwrap();

    assert_eq!(data.attack_tracker().unwrap().answered_action().len(), 2);
    let resolved = data.resolve_enemy_attack(20).unwrap();
    assert_eq!(resolved.outcome, tracker::AttackOutcome::Parried);
    assert_eq!(data.counters().attacks_resolved, 1);
}
