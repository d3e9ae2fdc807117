//! Action records.
//!
//! A `SkillNode` describes one chosen action instance: who acts, which skill,
//! when it started, when it ends and how it was chosen. Nodes are shared
//! between the pending list and the stacks through [`SharedNode`] and are
//! never mutated once built; revising an action means building a replacement.

use std::sync::Arc;

use serde::Serialize;

use crate::{labels, AplUnitId, CharacterId, Labels, PreloadError, Roster, SkillDef, SkillTag};

pub type SharedNode = Arc<SkillNode>;

/// Anything with an end tick can live on a [`crate::NodeStack`].
pub trait Timed {
    fn end_tick(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillNode {
    char_id: CharacterId,
    skill_tag: SkillTag,
    labels: Labels,
    preload_tick: u64,
    end_tick: u64,
    swap_cancel_tick: u64,
    active_generation: bool,
    do_immediately: bool,
    apl_priority: Option<i32>,
    apl_unit: Option<AplUnitId>,
}

impl SkillNode {
    /// Builds a node for `def` starting at `preload_tick`.
    pub fn from_def(
        def: &SkillDef,
        char_id: CharacterId,
        preload_tick: u64,
        active_generation: bool,
    ) -> Self {
        Self {
            char_id,
            skill_tag: def.tag.clone(),
            labels: def.labels.clone(),
            preload_tick,
            end_tick: preload_tick + def.ticks,
            swap_cancel_tick: preload_tick + def.swap_cancel_ticks.min(def.ticks),
            active_generation,
            do_immediately: def.do_immediately,
            apl_priority: None,
            apl_unit: None,
        }
    }

    /// Attaches the selection metadata. Only used while the node is being built.
    #[must_use]
    pub fn with_origin(mut self, priority: Option<i32>, unit: Option<AplUnitId>) -> Self {
        self.apl_priority = priority;
        self.apl_unit = unit;
        self
    }

    pub fn char_id(&self) -> CharacterId {
        self.char_id
    }

    pub fn skill_tag(&self) -> &SkillTag {
        &self.skill_tag
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn preload_tick(&self) -> u64 {
        self.preload_tick
    }

    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// First tick at which a different character may be swapped in.
    pub fn swap_cancel_tick(&self) -> u64 {
        self.swap_cancel_tick
    }

    pub fn active_generation(&self) -> bool {
        self.active_generation
    }

    pub fn do_immediately(&self) -> bool {
        self.do_immediately
    }

    pub fn apl_priority(&self) -> Option<i32> {
        self.apl_priority
    }

    pub fn apl_unit(&self) -> Option<&AplUnitId> {
        self.apl_unit.as_ref()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_additional_damage(&self) -> bool {
        self.has_label(labels::ADDITIONAL_DAMAGE)
    }

    pub fn is_dodge(&self) -> bool {
        self.skill_tag.is_dodge() || self.has_label(labels::DODGE)
    }

    /// True when admitting this node never displaces the actor's current
    /// action. An uninterruptible flag overrides the `additional_damage` label.
    pub fn rides_alongside(&self) -> bool {
        self.is_additional_damage() && !self.do_immediately
    }

    pub fn is_finished(&self, tick: u64) -> bool {
        self.end_tick <= tick
    }
}

impl Timed for SkillNode {
    fn end_tick(&self) -> u64 {
        self.end_tick
    }
}

impl<T: Timed> Timed for Arc<T> {
    fn end_tick(&self) -> u64 {
        self.as_ref().end_tick()
    }
}

/// Shared node-construction facility used by every engine.
///
/// Resolves the acting character from the tag prefix and the skill from the
/// roster; both failures are integration errors.
pub fn spawn_node(
    skill_tag: &SkillTag,
    tick: u64,
    roster: &Roster,
    active_generation: bool,
    priority: Option<i32>,
    unit: Option<AplUnitId>,
) -> Result<SharedNode, PreloadError> {
    let char_id = skill_tag
        .actor_id()
        .ok_or_else(|| PreloadError::MalformedSkillTag(skill_tag.clone()))?;
    let character = roster
        .get(char_id)
        .ok_or(PreloadError::UnknownCharacter(char_id))?;
    let def = character
        .skill(skill_tag)
        .ok_or_else(|| PreloadError::UnknownSkill(skill_tag.clone()))?;
    Ok(Arc::new(
        SkillNode::from_def(def, char_id, tick, active_generation).with_origin(priority, unit),
    ))
}
