//! Narrow stateful helpers fed by the working state on every committed action.

mod action_replace;
mod attack_response;
mod quick_assist;

pub use action_replace::{ActionReplaceManager, ParryAidStrategy};
pub use attack_response::{AttackOutcome, AttackTracker, ResolvedAttack};
pub use quick_assist::{QuickAssistSystem, QuickAssistWindow};
