use tracing::{debug, trace};

use super::force_add::waits_behind_uninterruptible;
use super::{ForceAddEngine, PreloadEngine};
use crate::battle::BattleWorld;
use crate::{PreloadData, PreloadError, SharedNode};

/// Commits the surviving nodes: the APL candidate first, then the force-added
/// ones. Runs at most once per tick.
///
/// A force-added node that would displace an uninterruptible action committed
/// earlier in the same pass is left in the external queue.
#[derive(Debug, Clone, Default)]
pub struct ConfirmEngine {
    active_signal: bool,
    last_confirmed_tick: Option<u64>,
}

impl ConfirmEngine {
    pub fn run_myself(
        &mut self,
        tick: u64,
        candidate: Option<SharedNode>,
        force_add: &mut ForceAddEngine,
        data: &mut PreloadData,
        world: &mut BattleWorld,
    ) -> Result<(), PreloadError> {
        if self.last_confirmed_tick == Some(tick) {
            return Err(PreloadError::DuplicateConfirmation { tick });
        }
        self.last_confirmed_tick = Some(tick);

        let (added, queue_ids) = force_add.take_added();
        let mut committed = 0usize;
        if let Some(node) = candidate {
            data.push_node(node, tick, world)?;
            committed += 1;
        }

        let mut resolved_ids = Vec::with_capacity(queue_ids.len());
        for (node, id) in added.into_iter().zip(queue_ids) {
            if waits_behind_uninterruptible(&node, data, tick) {
                trace!(
                    target: "zsim::preload",
                    tick,
                    skill_tag = %node.skill_tag(),
                    "force add deferred behind committed action"
                );
                continue;
            }
            data.push_node(node, tick, world)?;
            resolved_ids.push(id);
            committed += 1;
        }
        data.resolve_queued(&resolved_ids);
        data.counters_mut().confirmations += 1;
        self.active_signal = committed > 0;
        debug!(
            target: "zsim::preload",
            tick,
            committed,
            resolved = resolved_ids.len(),
            "confirmed"
        );
        Ok(())
    }

    pub fn last_confirmed_tick(&self) -> Option<u64> {
        self.last_confirmed_tick
    }
}

impl PreloadEngine for ConfirmEngine {
    fn name(&self) -> &'static str {
        "confirm"
    }

    fn active_signal(&self) -> bool {
        self.active_signal
    }

    fn reset_myself(&mut self) {
        self.active_signal = false;
        self.last_confirmed_tick = None;
    }
}
