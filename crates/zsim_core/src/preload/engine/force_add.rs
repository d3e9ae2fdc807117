use tracing::trace;

use super::PreloadEngine;
use crate::skill_node::spawn_node;
use crate::{PreloadData, PreloadError, Roster, SharedNode, SkillNode};

/// Whether `node` would displace an uninterruptible action of its actor at
/// `tick`. Such a request stays queued.
pub(crate) fn waits_behind_uninterruptible(
    node: &SkillNode,
    data: &PreloadData,
    tick: u64,
) -> bool {
    !node.rides_alongside()
        && !node.is_dodge()
        && data
            .occupying_node(node.char_id(), tick)
            .is_some_and(|busy| busy.do_immediately())
}

/// Converts queued external requests into nodes for this tick.
///
/// Requests are taken in FIFO order. At most one self-initiated request is
/// admitted per tick, and a request that would displace an uninterruptible
/// action stays queued for a later tick.
#[derive(Debug, Clone, Default)]
pub struct ForceAddEngine {
    active_signal: bool,
    added: Vec<SharedNode>,
    resolved_ids: Vec<u64>,
}

impl ForceAddEngine {
    pub fn run_myself(
        &mut self,
        tick: u64,
        data: &PreloadData,
        roster: &Roster,
    ) -> Result<(), PreloadError> {
        self.added.clear();
        self.resolved_ids.clear();

        for queued in data.external_queue().iter() {
            if queued.active_generation && self.produced_active() {
                continue;
            }
            let node = spawn_node(
                &queued.skill_tag,
                tick,
                roster,
                queued.active_generation,
                Some(queued.priority),
                None,
            )?;
            if waits_behind_uninterruptible(&node, data, tick) {
                trace!(
                    target: "zsim::preload",
                    tick,
                    skill_tag = %queued.skill_tag,
                    "force add deferred, actor is uninterruptible"
                );
                continue;
            }
            self.added.push(node);
            self.resolved_ids.push(queued.id);
        }
        self.active_signal = !self.added.is_empty();
        Ok(())
    }

    /// Whether a self-initiated node was produced this tick.
    pub fn produced_active(&self) -> bool {
        self.added.iter().any(|n| n.active_generation())
    }

    pub fn added(&self) -> &[SharedNode] {
        &self.added
    }

    pub fn resolved_ids(&self) -> &[u64] {
        &self.resolved_ids
    }

    /// Hands the produced nodes and their queue ids to confirmation.
    pub(crate) fn take_added(&mut self) -> (Vec<SharedNode>, Vec<u64>) {
        (
            std::mem::take(&mut self.added),
            std::mem::take(&mut self.resolved_ids),
        )
    }
}

impl PreloadEngine for ForceAddEngine {
    fn name(&self) -> &'static str {
        "force_add"
    }

    fn active_signal(&self) -> bool {
        self.active_signal
    }

    fn reset_myself(&mut self) {
        self.active_signal = false;
        self.added.clear();
        self.resolved_ids.clear();
    }
}
