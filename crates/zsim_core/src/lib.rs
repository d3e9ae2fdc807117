//! `zsim_core`: deterministic action scheduling for a team combat simulator.
//!
//! No IO. The preload stage picks, validates and commits at most one
//! self-initiated action per tick; listeners react to what it commits.

pub mod apl;
mod battle;
mod character;
mod enemy;
mod error;
pub mod listener;
mod mission;
mod node_stack;
pub mod preload;
mod session;
mod skill_node;
pub mod tracker;
mod types;

pub use battle::{Battle, BattleWorld};
pub use character::{Character, Roster};
pub use enemy::{Enemy, EnemyAttack, SpecialStateSignal, TrainingDummy};
pub use error::PreloadError;
pub use mission::{LoadingMission, MissionTable};
pub use node_stack::{NodeStack, GLOBAL_STACK_CAPACITY, PERSONAL_STACK_CAPACITY};
pub use preload::{
    ExternalQueue, Preload, PreloadCounters, PreloadData, PreloadStrategy, QueuedAction,
    SwapCancelStrategy,
};
pub use session::{generate_uuid, SessionContext};
pub use skill_node::{spawn_node, SharedNode, SkillNode, Timed};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
