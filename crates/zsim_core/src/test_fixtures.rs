//! Shared test fixtures for zsim_core and downstream crates.
//!
//! `base_content()` seats a three-character team (ids 7, 11, 13) whose skills
//! cover every label the scheduler reacts to. `ScriptedApl` plays a fixed
//! list of picks so scenario tests can drive the real strategy.

use std::collections::{BTreeMap, VecDeque};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::apl::{AplDecision, AplEvaluator, AplView};
use crate::{
    labels, AplUnitId, BattleContent, CharacterDef, CharacterId, Constants, ElementType, EnemyDef,
    Labels, ResourceDelta, ResourceKind, SkillDef, SkillTag,
};

/// Bare skill with no labels.
pub fn skill(tag: &str, ticks: u64, swap_cancel_ticks: u64) -> SkillDef {
    SkillDef {
        tag: SkillTag::from(tag),
        name: tag.to_string(),
        ticks,
        swap_cancel_ticks,
        labels: Labels::new(),
        do_immediately: false,
        resource_deltas: Vec::new(),
        anomaly: None,
    }
}

fn labelled(tag: &str, ticks: u64, swap_cancel_ticks: u64, label: &str) -> SkillDef {
    let mut def = skill(tag, ticks, swap_cancel_ticks);
    def.labels.push(label.to_string());
    def
}

/// Team of three:
/// - 7: basic 30/10, dodge, uninterruptible ultimate, additional damage,
///   parry with assist follow-up, quick-assist trigger.
/// - 11: basic 24/8, quick assist, coordinated follow-up (additional damage),
///   electric anomaly special that costs 20 energy.
/// - 13: basic and dodge only.
pub fn base_content() -> BattleContent {
    let mut ultimate = skill("7_ultimate", 60, 60);
    ultimate.do_immediately = true;

    let mut special = skill("11_special", 36, 12);
    special.anomaly = Some(ElementType::Electric);
    special.resource_deltas.push(ResourceDelta {
        resource: ResourceKind::Energy,
        amount: -20.0,
    });

    BattleContent {
        content_version: "test".to_string(),
        characters: vec![
            CharacterDef {
                id: CharacterId(7),
                name: "Striker".to_string(),
                skills: vec![
                    skill("7_basic", 30, 10),
                    labelled("7_dodge", 15, 5, labels::DODGE),
                    ultimate,
                    labelled("7_additional", 20, 0, labels::ADDITIONAL_DAMAGE),
                    labelled("7_parry", 10, 10, labels::PARRY),
                    labelled("7_assist_follow_up", 25, 10, labels::ASSIST_FOLLOW_UP),
                    labelled("7_chain", 40, 20, labels::TRIGGER_QUICK_ASSIST),
                ],
                resources: BTreeMap::new(),
            },
            CharacterDef {
                id: CharacterId(11),
                name: "Conductor".to_string(),
                skills: vec![
                    skill("11_basic", 24, 8),
                    labelled("11_quick_assist", 20, 10, labels::QUICK_ASSIST),
                    labelled("11_coordinated", 10, 0, labels::ADDITIONAL_DAMAGE),
                    special,
                ],
                resources: BTreeMap::from([(ResourceKind::Energy, 40.0)]),
            },
            CharacterDef {
                id: CharacterId(13),
                name: "Support".to_string(),
                skills: vec![
                    skill("13_basic", 18, 6),
                    labelled("13_dodge", 12, 4, labels::DODGE),
                ],
                resources: BTreeMap::new(),
            },
        ],
        enemy: EnemyDef::default(),
        constants: Constants::default(),
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

/// Plays `(from_tick, skill_tag)` picks in order. Each pick is offered from
/// its tick onwards until the team history shows it was admitted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedApl {
    steps: VecDeque<(u64, SkillTag)>,
    evaluations: u64,
}

impl ScriptedApl {
    pub fn new(steps: &[(u64, &str)]) -> Self {
        Self {
            steps: steps
                .iter()
                .map(|&(tick, tag)| (tick, SkillTag::from(tag)))
                .collect(),
            evaluations: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl AplEvaluator for ScriptedApl {
    fn evaluate(&mut self, view: &AplView<'_>) -> AplDecision {
        self.evaluations += 1;
        if let Some((at, tag)) = self.steps.front() {
            let admitted = view
                .data
                .latest_active()
                .is_some_and(|n| n.skill_tag() == tag && n.preload_tick() >= *at);
            if admitted {
                self.steps.pop_front();
            }
        }
        match self.steps.front() {
            Some((at, tag)) if view.tick >= *at => AplDecision::Act {
                skill_tag: tag.clone(),
                priority: 1,
                unit: AplUnitId("scripted".to_string()),
            },
            _ => AplDecision::Wait,
        }
    }
}
