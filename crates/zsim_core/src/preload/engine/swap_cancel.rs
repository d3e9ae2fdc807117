use tracing::trace;

use super::{ForceAddEngine, PreloadEngine};
use crate::{PreloadData, SkillNode};

/// Decides whether the APL candidate may start at this tick.
///
/// The candidate's own running action may only be cancelled by a dodge or an
/// uninterruptible skill, and an uninterruptible action only by a dodge.
/// Another character's on-field action blocks until its swap-cancel tick and
/// blocks outright while it is uninterruptible.
#[derive(Debug, Clone, Default)]
pub struct SwapCancelEngine {
    active_signal: bool,
    external_update_signal: bool,
}

impl SwapCancelEngine {
    pub fn run_myself(
        &mut self,
        tick: u64,
        candidate: Option<&SkillNode>,
        data: &PreloadData,
        force_add: &ForceAddEngine,
    ) {
        self.external_update_signal = force_add.active_signal();
        self.active_signal = false;

        let Some(candidate) = candidate else {
            return;
        };
        if force_add.produced_active() {
            trace!(
                target: "zsim::preload",
                tick,
                skill_tag = %candidate.skill_tag(),
                "candidate refused, force add already produced an active node"
            );
            return;
        }
        self.active_signal = Self::validate(tick, candidate, data);
        if !self.active_signal {
            trace!(
                target: "zsim::preload",
                tick,
                skill_tag = %candidate.skill_tag(),
                "candidate outside cancel window"
            );
        }
    }

    /// Cancel-window rules for `candidate` at `tick`.
    pub fn validate(tick: u64, candidate: &SkillNode, data: &PreloadData) -> bool {
        if let Some(own) = data.occupying_node(candidate.char_id(), tick) {
            let allowed = if own.do_immediately() {
                candidate.is_dodge()
            } else {
                candidate.is_dodge() || candidate.do_immediately()
            };
            if !allowed {
                return false;
            }
        }
        match data.on_field_node(tick) {
            Some(field) if field.char_id() != candidate.char_id() => {
                !field.do_immediately() && tick >= field.swap_cancel_tick()
            }
            _ => true,
        }
    }

    pub fn external_update_signal(&self) -> bool {
        self.external_update_signal
    }
}

impl PreloadEngine for SwapCancelEngine {
    fn name(&self) -> &'static str {
        "swap_cancel"
    }

    fn active_signal(&self) -> bool {
        self.active_signal
    }

    fn reset_myself(&mut self) {
        self.active_signal = false;
        self.external_update_signal = false;
    }
}
