//! End-to-end preload scenarios through the public API.

use zsim_core::apl::{AplDecision, AplEvaluator, AplView};
use zsim_core::listener::{AnomalyRefundListener, ListenerSignal, SignalLog};
use zsim_core::test_fixtures::{base_content, ScriptedApl};
use zsim_core::{
    spawn_node, AplUnitId, Battle, BattleWorld, CharacterId, LoadingMission, PreloadData,
    PreloadError, ResourceKind, SkillTag,
};

/// Cycles through a fixed rotation, moving on once the current pick shows up
/// as the newest self-initiated action.
struct Rotation {
    tags: Vec<SkillTag>,
    next: usize,
}

impl Rotation {
    fn new(tags: &[&str]) -> Self {
        Self {
            tags: tags.iter().map(|&t| SkillTag::from(t)).collect(),
            next: 0,
        }
    }
}

impl AplEvaluator for Rotation {
    fn evaluate(&mut self, view: &AplView<'_>) -> AplDecision {
        let current = &self.tags[self.next];
        if view
            .data
            .latest_active()
            .is_some_and(|n| n.skill_tag() == current && n.preload_tick() + 1 == view.tick)
        {
            self.next = (self.next + 1) % self.tags.len();
        }
        AplDecision::Act {
            skill_tag: self.tags[self.next].clone(),
            priority: i32::try_from(self.next).unwrap_or(i32::MAX),
            unit: AplUnitId(format!("rotation_{}", self.next)),
        }
    }
}

fn logged_world() -> BattleWorld {
    let mut world = BattleWorld::new(&base_content());
    world.listeners.register(SignalLog::new("log"));
    world
}

#[test]
fn test_rotation_never_admits_two_active_nodes_in_one_tick() {
    let mut battle = Battle::new(
        logged_world(),
        Box::new(Rotation::new(&["7_basic", "11_basic", "13_basic", "11_special"])),
    );
    battle.register_listener(AnomalyRefundListener::new(
        "refund",
        CharacterId(13),
        ResourceKind::Adrenaline,
        5.0,
        120,
    ));

    let mut active_total = 0;
    for _ in 0..600 {
        let admitted = battle.tick().unwrap();
        let active = admitted.iter().filter(|n| n.active_generation()).count();
        assert!(active <= 1);
        active_total += active;
    }
    assert!(active_total > 10);

    let data = battle.preload().data();
    assert!(data.global_stack().len() <= zsim_core::GLOBAL_STACK_CAPACITY);
    for id in [7, 11, 13] {
        let stack = data.personal_stack(CharacterId(id)).unwrap();
        assert!(stack.len() <= zsim_core::PERSONAL_STACK_CAPACITY);
    }
    let log = battle.world().listeners.signal_log().unwrap();
    assert_eq!(log.count(ListenerSignal::EnterBattle), 3);
    assert!(log.count(ListenerSignal::Anomaly) >= 1);
}

#[test]
fn test_segments_are_independent() {
    let mut battle = Battle::new(
        logged_world(),
        Box::new(Rotation::new(&["7_basic", "13_basic"])),
    );
    for segment in 1..=3 {
        for _ in 0..120 {
            battle.tick().unwrap();
        }
        let log = battle.world().listeners.signal_log().unwrap();
        assert_eq!(log.count_for(ListenerSignal::EnterBattle, CharacterId(7)), segment);
        battle.reset_segment();
        assert!(battle.preload().data().global_stack().is_empty());
        assert_eq!(battle.preload().data().operating_now(), None);
    }
}

#[test]
fn test_displacement_scenario_public_api() {
    let content = base_content();
    let mut world = BattleWorld::new(&content);
    let mut data = PreloadData::new(&world.roster, &world.constants);

    let basic = spawn_node(&SkillTag::from("7_basic"), 10, &world.roster, true, None, None).unwrap();
    data.push_node(basic.clone(), 10, &mut world).unwrap();
    world.missions.insert(LoadingMission::from_node(&basic));

    let dodge = spawn_node(&SkillTag::from("7_dodge"), 35, &world.roster, true, None, None).unwrap();
    data.push_node(dodge, 35, &mut world).unwrap();
    assert!(world.missions.is_empty());

    let again = spawn_node(&SkillTag::from("7_ultimate"), 35, &world.roster, true, None, None).unwrap();
    let err = data.push_node(again, 35, &mut world).unwrap_err();
    assert!(matches!(err, PreloadError::MultipleActiveActions { tick: 35, .. }));
}

#[test]
fn test_scripted_battle_reports_fatal_errors() {
    let mut battle = Battle::new(logged_world(), Box::new(ScriptedApl::new(&[(0, "99_basic")])));
    let err = battle.tick().unwrap_err();
    assert_eq!(err, PreloadError::UnknownCharacter(CharacterId(99)));
    assert!(err.to_string().contains("99"));
}
