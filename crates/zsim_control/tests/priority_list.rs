//! Priority-list evaluator driving a full battle.

use zsim_control::{AplCondition, AplUnit, PriorityList};
use zsim_core::test_fixtures::base_content;
use zsim_core::{AplUnitId, Battle, BattleWorld, CharacterId, ResourceKind, SkillTag};

fn unit(id: &str, tag: &str, priority: i32, conditions: Vec<AplCondition>) -> AplUnit {
    let skill_tag = SkillTag::from(tag);
    AplUnit {
        id: AplUnitId(id.to_string()),
        char_id: skill_tag.actor_id().unwrap(),
        skill_tag,
        priority,
        conditions,
    }
}

fn team_list() -> PriorityList {
    PriorityList::new(vec![
        unit("assist", "11_quick_assist", 3, vec![AplCondition::QuickAssistReady]),
        unit(
            "opener",
            "11_special",
            2,
            vec![
                AplCondition::ResourceAtLeast {
                    char_id: None,
                    resource: ResourceKind::Energy,
                    value: 40.0,
                },
                AplCondition::Free { char_id: None },
            ],
        ),
        unit(
            "chain",
            "7_chain",
            1,
            vec![AplCondition::LastSkillIs {
                char_id: None,
                skill_tag: SkillTag::from("7_basic"),
            }],
        ),
        unit("filler", "7_basic", 0, vec![]),
    ])
}

fn run(battle: &mut Battle, ticks: u64) -> Vec<(u64, String)> {
    let mut admitted = Vec::new();
    for _ in 0..ticks {
        for node in battle.tick().unwrap() {
            admitted.push((node.preload_tick(), node.skill_tag().to_string()));
        }
    }
    admitted
}

#[test]
fn test_priority_list_drives_rotation() {
    let mut battle = Battle::new(BattleWorld::new(&base_content()), Box::new(team_list()));
    let admitted = run(&mut battle, 63);

    assert_eq!(
        admitted,
        vec![
            (0, "11_special".to_string()),
            // Waits for the special's swap window.
            (12, "7_basic".to_string()),
            // Chain cannot cut its own basic short.
            (42, "7_chain".to_string()),
            // Chain arms the quick assist; it swaps in once the chain allows.
            (62, "11_quick_assist".to_string()),
        ]
    );

    let data = battle.preload().data();
    assert_eq!(data.counters().waits, 0);
    assert_eq!(data.operating_now(), Some(CharacterId(11)));
    let latest = data.latest_active().unwrap();
    assert_eq!(latest.apl_unit().map(|u| u.0.as_str()), Some("assist"));
    assert_eq!(latest.apl_priority(), Some(3));
    let conductor = battle.world().roster.get(CharacterId(11)).unwrap();
    assert!((conductor.resource(ResourceKind::Energy) - 20.0).abs() < 1e-9);
}

#[test]
fn test_unmatched_list_waits_every_tick() {
    let list = PriorityList::new(vec![unit(
        "never",
        "7_ultimate",
        0,
        vec![AplCondition::EnemyStunned { stunned: true }],
    )]);
    let mut battle = Battle::new(BattleWorld::new(&base_content()), Box::new(list));
    assert!(run(&mut battle, 20).is_empty());
    assert_eq!(battle.preload().data().counters().waits, 20);
}
