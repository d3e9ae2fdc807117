//! Enemy interface consumed by the preload pipeline, plus a training dummy.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{EnemyDef, SkillNode};

/// Signals delivered to the enemy's special-state manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialStateSignal {
    BeforePreload,
}

/// An attack the enemy has declared and that lands at `hit_tick`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyAttack {
    pub attack_id: u64,
    pub declared_tick: u64,
    pub hit_tick: u64,
}

pub trait Enemy {
    /// Per-tick stun check. Returns whether the enemy is stunned afterwards.
    fn stun_judge(&mut self, tick: u64) -> bool;

    fn is_stunned(&self) -> bool;

    fn broadcast_and_update(&mut self, signal: SpecialStateSignal);

    /// The single synchronous AI callback: an attack declared this tick, if any.
    fn attack_event(&mut self, _tick: u64) -> Option<EnemyAttack> {
        None
    }

    /// Called by the Load stage for every committed action.
    fn absorb_hit(&mut self, _node: &SkillNode) {}
}

#[derive(Debug, Clone)]
pub struct TrainingDummy {
    def: EnemyDef,
    hits: u32,
    stunned_until: Option<u64>,
    special_state_updates: u64,
    next_attack_id: u64,
}

impl TrainingDummy {
    pub fn new(def: EnemyDef) -> Self {
        Self {
            def,
            hits: 0,
            stunned_until: None,
            special_state_updates: 0,
            next_attack_id: 0,
        }
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn special_state_updates(&self) -> u64 {
        self.special_state_updates
    }
}

impl Enemy for TrainingDummy {
    fn stun_judge(&mut self, tick: u64) -> bool {
        if let Some(until) = self.stunned_until {
            if tick >= until {
                self.stunned_until = None;
                info!(target: "zsim::enemy", tick, name = %self.def.name, "stun recovered");
            }
        }
        if self.stunned_until.is_none() && self.hits >= self.def.stun_threshold {
            self.hits = 0;
            self.stunned_until = Some(tick + self.def.stun_duration_ticks);
            info!(target: "zsim::enemy", tick, name = %self.def.name, "stunned");
        }
        self.stunned_until.is_some()
    }

    fn is_stunned(&self) -> bool {
        self.stunned_until.is_some()
    }

    fn broadcast_and_update(&mut self, signal: SpecialStateSignal) {
        match signal {
            SpecialStateSignal::BeforePreload => self.special_state_updates += 1,
        }
    }

    fn attack_event(&mut self, tick: u64) -> Option<EnemyAttack> {
        let every = self.def.attack_every.filter(|&every| every > 0)?;
        if tick == 0 || tick % every != 0 || self.is_stunned() {
            return None;
        }
        let attack = EnemyAttack {
            attack_id: self.next_attack_id,
            declared_tick: tick,
            hit_tick: tick + self.def.attack_windup,
        };
        self.next_attack_id += 1;
        debug!(target: "zsim::enemy", tick, attack_id = attack.attack_id, "attack declared");
        Some(attack)
    }

    fn absorb_hit(&mut self, node: &SkillNode) {
        if node.active_generation() || node.is_additional_damage() {
            self.hits += 1;
        }
    }
}
