//! The five decision engines consulted each tick, in this order:
//! attack response, APL, force add, swap cancel, confirm.
//!
//! Each engine owns only its signals and scratch state. Inputs that differ per
//! engine are passed to its `run_myself`; the shared surface is the
//! [`PreloadEngine`] trait used by the orchestrator.

mod apl;
mod attack_response;
mod confirm;
mod force_add;
mod swap_cancel;

pub use apl::AplEngine;
pub use attack_response::AttackResponseEngine;
pub use confirm::ConfirmEngine;
pub use force_add::ForceAddEngine;
pub use swap_cancel::SwapCancelEngine;

pub trait PreloadEngine {
    fn name(&self) -> &'static str;

    /// Whether the engine changed anything on its last run.
    fn active_signal(&self) -> bool;

    /// Drops per-segment state.
    fn reset_myself(&mut self);
}
