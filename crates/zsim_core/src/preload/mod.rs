//! Preload stage: decides, each tick, which actions start.

mod data;
pub mod engine;
mod queue;
mod strategy;

pub use data::{PreloadCounters, PreloadData};
pub use queue::{ExternalQueue, QueuedAction};
pub use strategy::{PreloadStrategy, SwapCancelStrategy};

use crate::apl::AplEvaluator;
use crate::battle::BattleWorld;
use crate::{PreloadError, Roster};

pub struct Preload<S = SwapCancelStrategy> {
    data: PreloadData,
    strategy: S,
}

impl Preload<SwapCancelStrategy> {
    pub fn new(world: &BattleWorld, evaluator: Box<dyn AplEvaluator>) -> Self {
        let strategy = SwapCancelStrategy::new(evaluator, world.constants.apl_trace_window);
        Self::with_strategy(PreloadData::new(&world.roster, &world.constants), strategy)
    }
}

impl<S: PreloadStrategy> Preload<S> {
    pub fn with_strategy(data: PreloadData, strategy: S) -> Self {
        Self { data, strategy }
    }

    /// Runs one tick of the strategy. Admitted nodes are left in the pending
    /// list for the load stage.
    pub fn do_preload(&mut self, tick: u64, world: &mut BattleWorld) -> Result<(), PreloadError> {
        self.strategy.generate_actions(&mut self.data, world, tick)
    }

    pub fn reset(&mut self, roster: &Roster) {
        self.data.reset(roster);
        self.strategy.reset_myself();
    }

    pub fn data(&self) -> &PreloadData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut PreloadData {
        &mut self.data
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}
