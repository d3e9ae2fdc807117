//! Priority-list contract consumed by the APL engine.
//!
//! The authoring format is not the core's business: anything that can look
//! at the current tick and answer "this skill" or "wait" can drive the team.

use crate::{AplUnitId, Enemy, PreloadData, Roster, SkillTag};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AplDecision {
    Wait,
    Act {
        skill_tag: SkillTag,
        priority: i32,
        unit: AplUnitId,
    },
}

/// Read-only snapshot handed to the evaluator.
pub struct AplView<'a> {
    pub tick: u64,
    pub data: &'a PreloadData,
    pub roster: &'a Roster,
    pub enemy: &'a dyn Enemy,
}

pub trait AplEvaluator {
    fn evaluate(&mut self, view: &AplView<'_>) -> AplDecision;
}
