//! Error type for the preload pipeline.
//!
//! Every variant is an engine-ordering or integration-contract violation.
//! None of them is a game-state outcome: a driver receiving one must abort
//! the run instead of retrying the tick.

use crate::listener::ListenerSignal;
use crate::{CharacterId, SkillTag};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PreloadError {
    #[error(
        "tick {tick}: self-initiated {incoming} refused, {pending} is already pending this tick"
    )]
    MultipleActiveActions {
        tick: u64,
        pending: SkillTag,
        incoming: SkillTag,
    },

    #[error("tick {tick}: confirmation already ran for this tick")]
    DuplicateConfirmation { tick: u64 },

    #[error("force change requested by {incoming}, but character {char_id} has no action on record")]
    NothingToDisplace {
        char_id: CharacterId,
        incoming: SkillTag,
    },

    #[error(
        "{incoming} tried to displace {displaced}, which already ended at tick {end_tick} \
         (replacement starts at {start_tick}); force change should not have been called"
    )]
    DisplacedAlreadyFinished {
        displaced: SkillTag,
        incoming: SkillTag,
        end_tick: u64,
        start_tick: u64,
    },

    #[error("{incoming} tried to displace uninterruptible skill {displaced}")]
    UninterruptibleDisplaced {
        displaced: SkillTag,
        incoming: SkillTag,
    },

    #[error("skill tag '{0}' does not encode a character id")]
    MalformedSkillTag(SkillTag),

    #[error("skill tag '{0}' is not defined by any roster member")]
    UnknownSkill(SkillTag),

    #[error("character {0} is not in the roster")]
    UnknownCharacter(CharacterId),

    #[error("character {0} was post-initialised twice")]
    DuplicatePostInit(CharacterId),

    #[error("listener '{listener}' received {signal:?} carrying a {found} event")]
    UnexpectedEvent {
        listener: String,
        signal: ListenerSignal,
        found: &'static str,
    },
}
