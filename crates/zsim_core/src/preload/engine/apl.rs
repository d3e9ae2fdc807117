use tracing::debug;

use super::PreloadEngine;
use crate::apl::{AplDecision, AplEvaluator, AplView};
use crate::skill_node::spawn_node;
use crate::{Enemy, PreloadData, PreloadError, Roster, SharedNode};

/// Turns the priority list's pick into a self-initiated node.
pub struct AplEngine {
    evaluator: Box<dyn AplEvaluator>,
    trace_window: Option<(u64, u64)>,
    latest_node: Option<SharedNode>,
    active_signal: bool,
}

impl AplEngine {
    pub fn new(evaluator: Box<dyn AplEvaluator>, trace_window: Option<(u64, u64)>) -> Self {
        Self {
            evaluator,
            trace_window,
            latest_node: None,
            active_signal: false,
        }
    }

    /// `Ok(None)` means wait.
    pub fn run_myself(
        &mut self,
        tick: u64,
        data: &PreloadData,
        roster: &Roster,
        enemy: &dyn Enemy,
    ) -> Result<Option<SharedNode>, PreloadError> {
        let view = AplView {
            tick,
            data,
            roster,
            enemy,
        };
        let decision = self.evaluator.evaluate(&view);
        let traced = self
            .trace_window
            .is_some_and(|(start, end)| (start..end).contains(&tick));

        let AplDecision::Act {
            skill_tag,
            priority,
            unit,
        } = decision
        else {
            if traced {
                debug!(target: "zsim::apl", tick, "wait");
            }
            self.active_signal = false;
            return Ok(None);
        };

        let replaced = data.action_replace().replace(&skill_tag, tick, roster);
        if traced {
            debug!(
                target: "zsim::apl",
                tick,
                skill_tag = %skill_tag,
                priority,
                unit = %unit,
                replaced_by = ?replaced.as_ref().map(|t| t.as_str()),
                "apl pick"
            );
        }
        let tag = replaced.unwrap_or(skill_tag);
        let node = spawn_node(&tag, tick, roster, true, Some(priority), Some(unit))?;
        self.latest_node = Some(node.clone());
        self.active_signal = true;
        Ok(Some(node))
    }

    pub fn latest_node(&self) -> Option<&SharedNode> {
        self.latest_node.as_ref()
    }
}

impl PreloadEngine for AplEngine {
    fn name(&self) -> &'static str {
        "apl"
    }

    fn active_signal(&self) -> bool {
        self.active_signal
    }

    fn reset_myself(&mut self) {
        self.latest_node = None;
        self.active_signal = false;
    }
}
