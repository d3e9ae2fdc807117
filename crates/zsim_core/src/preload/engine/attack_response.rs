use tracing::info;

use super::PreloadEngine;
use crate::tracker::ResolvedAttack;
use crate::{Enemy, PreloadData};

/// Resolves enemy attacks whose hit tick has arrived, then asks the enemy
/// whether it declares a new one.
#[derive(Debug, Clone, Default)]
pub struct AttackResponseEngine {
    active_signal: bool,
    last_resolved: Option<ResolvedAttack>,
}

impl AttackResponseEngine {
    pub fn run_myself(&mut self, tick: u64, data: &mut PreloadData, enemy: &mut dyn Enemy) {
        self.active_signal = false;
        if let Some(resolved) = data.resolve_enemy_attack(tick) {
            info!(
                target: "zsim::enemy",
                tick,
                attack_id = resolved.attack.attack_id,
                outcome = ?resolved.outcome,
                answered = resolved.answered.len(),
                "attack resolved"
            );
            self.last_resolved = Some(resolved);
            self.active_signal = true;
        }
        if let Some(attack) = enemy.attack_event(tick) {
            self.active_signal |= data.begin_enemy_attack(attack);
        }
    }

    pub fn last_resolved(&self) -> Option<&ResolvedAttack> {
        self.last_resolved.as_ref()
    }
}

impl PreloadEngine for AttackResponseEngine {
    fn name(&self) -> &'static str {
        "attack_response"
    }

    fn active_signal(&self) -> bool {
        self.active_signal
    }

    fn reset_myself(&mut self) {
        self.active_signal = false;
        self.last_resolved = None;
    }
}
