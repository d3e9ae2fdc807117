use serde::Serialize;

use super::{BattleEvent, Listener, ListenerContext, ListenerSignal};
use crate::{CharacterId, PreloadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalRecord {
    pub tick: u64,
    pub signal: ListenerSignal,
    pub subject: Option<CharacterId>,
}

/// Passive recorder of every broadcast it receives.
#[derive(Debug, Clone)]
pub struct SignalLog {
    listener_id: String,
    entries: Vec<SignalRecord>,
}

impl SignalLog {
    pub fn new(listener_id: impl Into<String>) -> Self {
        Self {
            listener_id: listener_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[SignalRecord] {
        &self.entries
    }

    pub fn count(&self, signal: ListenerSignal) -> usize {
        self.entries.iter().filter(|e| e.signal == signal).count()
    }

    /// How many times `signal` was broadcast about `subject`.
    pub fn count_for(&self, signal: ListenerSignal, subject: CharacterId) -> usize {
        self.entries
            .iter()
            .filter(|e| e.signal == signal && e.subject == Some(subject))
            .count()
    }
}

impl Listener for SignalLog {
    fn listener_id(&self) -> &str {
        &self.listener_id
    }

    fn receive(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        ctx: &mut ListenerContext<'_>,
    ) -> Result<(), PreloadError> {
        self.entries.push(SignalRecord {
            tick: ctx.tick,
            signal,
            subject: event.subject(),
        });
        Ok(())
    }

    fn activate(&mut self, _ctx: &mut ListenerContext<'_>) -> Result<(), PreloadError> {
        Ok(())
    }
}
