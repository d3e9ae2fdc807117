use tracing::debug;

use super::engine::{
    AplEngine, AttackResponseEngine, ConfirmEngine, ForceAddEngine, PreloadEngine,
    SwapCancelEngine,
};
use crate::apl::AplEvaluator;
use crate::battle::BattleWorld;
use crate::listener::{BattleEvent, ListenerSignal};
use crate::{PreloadData, PreloadError, SpecialStateSignal};

/// Composes the decision engines into the per-tick algorithm.
pub trait PreloadStrategy {
    fn generate_actions(
        &mut self,
        data: &mut PreloadData,
        world: &mut BattleWorld,
        tick: u64,
    ) -> Result<(), PreloadError>;

    fn reset_myself(&mut self);
}

/// Swap-cancel scheduling: one candidate from the priority list per tick,
/// admitted only inside the cancel window.
pub struct SwapCancelStrategy {
    attack_response_engine: AttackResponseEngine,
    apl_engine: AplEngine,
    force_add_engine: ForceAddEngine,
    swap_cancel_engine: SwapCancelEngine,
    confirm_engine: ConfirmEngine,
    finish_post_init: bool,
}

impl SwapCancelStrategy {
    pub fn new(evaluator: Box<dyn AplEvaluator>, trace_window: Option<(u64, u64)>) -> Self {
        Self {
            attack_response_engine: AttackResponseEngine::default(),
            apl_engine: AplEngine::new(evaluator, trace_window),
            force_add_engine: ForceAddEngine::default(),
            swap_cancel_engine: SwapCancelEngine::default(),
            confirm_engine: ConfirmEngine::default(),
            finish_post_init: false,
        }
    }

    /// One-time post-init, then the pre-tick stun check.
    fn check_myself(
        &mut self,
        data: &mut PreloadData,
        world: &mut BattleWorld,
        tick: u64,
    ) -> Result<(), PreloadError> {
        if !self.finish_post_init {
            world.roster.post_init_all()?;
            self.finish_post_init = true;
        }
        if let Some(stunned) = data.check_before_preload(tick, &mut *world.enemy) {
            world.broadcast(
                &BattleEvent::EnemyStun { stunned },
                ListenerSignal::StateUpdate,
                tick,
                data.queue_mut(),
            )?;
        }
        Ok(())
    }

    pub fn engines(&self) -> [&dyn PreloadEngine; 5] {
        [
            &self.attack_response_engine,
            &self.apl_engine,
            &self.force_add_engine,
            &self.swap_cancel_engine,
            &self.confirm_engine,
        ]
    }

    pub fn attack_response_engine(&self) -> &AttackResponseEngine {
        &self.attack_response_engine
    }

    pub fn confirm_engine(&self) -> &ConfirmEngine {
        &self.confirm_engine
    }

    pub fn is_post_initialised(&self) -> bool {
        self.finish_post_init
    }
}

impl PreloadStrategy for SwapCancelStrategy {
    fn generate_actions(
        &mut self,
        data: &mut PreloadData,
        world: &mut BattleWorld,
        tick: u64,
    ) -> Result<(), PreloadError> {
        self.check_myself(data, world, tick)?;
        world
            .enemy
            .broadcast_and_update(SpecialStateSignal::BeforePreload);

        self.attack_response_engine
            .run_myself(tick, data, &mut *world.enemy);

        let candidate = self
            .apl_engine
            .run_myself(tick, data, &world.roster, &*world.enemy)?;
        if candidate.is_none() {
            data.counters_mut().waits += 1;
        }

        self.force_add_engine.run_myself(tick, data, &world.roster)?;

        self.swap_cancel_engine.run_myself(
            tick,
            candidate.as_deref(),
            data,
            &self.force_add_engine,
        );

        if self.swap_cancel_engine.active_signal()
            || self.force_add_engine.active_signal()
            || self.swap_cancel_engine.external_update_signal()
        {
            let admitted = candidate.filter(|_| self.swap_cancel_engine.active_signal());
            self.confirm_engine.run_myself(
                tick,
                admitted,
                &mut self.force_add_engine,
                data,
                world,
            )?;
        }
        Ok(())
    }

    fn reset_myself(&mut self) {
        self.attack_response_engine.reset_myself();
        self.apl_engine.reset_myself();
        self.force_add_engine.reset_myself();
        self.swap_cancel_engine.reset_myself();
        self.confirm_engine.reset_myself();
        debug!(target: "zsim::preload", "strategy reset");
    }
}
