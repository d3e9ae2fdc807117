use serde::Serialize;

use crate::{labels, EnemyAttack, SharedNode, SkillTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttackOutcome {
    Parried,
    Dodged,
    Hit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedAttack {
    pub attack: EnemyAttack,
    pub outcome: AttackOutcome,
    pub answered: Vec<SkillTag>,
    pub resolved_tick: u64,
}

/// Tracks the enemy attack currently in flight and the actions the team
/// committed while it was pending.
#[derive(Debug, Clone, Default)]
pub struct AttackTracker {
    current: Option<EnemyAttack>,
    answered_action: Vec<SharedNode>,
    history: Vec<ResolvedAttack>,
}

impl AttackTracker {
    /// Whether an attack is mid-resolution.
    pub fn attacking(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&EnemyAttack> {
        self.current.as_ref()
    }

    /// Starts tracking `attack`. Returns false, keeping the pending attack,
    /// when another attack is still unresolved.
    pub fn begin(&mut self, attack: EnemyAttack) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.answered_action.clear();
        self.current = Some(attack);
        true
    }

    pub fn record_answer(&mut self, node: SharedNode) {
        self.answered_action.push(node);
    }

    pub fn answered_action(&self) -> &[SharedNode] {
        &self.answered_action
    }

    /// Resolves the pending attack once its hit tick has arrived.
    pub fn resolve_due(&mut self, tick: u64) -> Option<ResolvedAttack> {
        if self.current.as_ref()?.hit_tick > tick {
            return None;
        }
        let attack = self.current.take()?;
        let answered = std::mem::take(&mut self.answered_action);
        let outcome = if answered.iter().any(|n| n.has_label(labels::PARRY)) {
            AttackOutcome::Parried
        } else if answered.iter().any(|n| n.is_dodge()) {
            AttackOutcome::Dodged
        } else {
            AttackOutcome::Hit
        };
        let resolved = ResolvedAttack {
            attack,
            outcome,
            answered: answered.iter().map(|n| n.skill_tag().clone()).collect(),
            resolved_tick: tick,
        };
        self.history.push(resolved.clone());
        Some(resolved)
    }

    pub fn history(&self) -> &[ResolvedAttack] {
        &self.history
    }
}
