//! Registry that owns the listeners and delivers broadcasts.

use tracing::trace;

use super::{BattleEvent, BattleListener, Listener, ListenerContext, ListenerSignal, SignalLog};
use crate::PreloadError;

/// Delivers every broadcast to each listener, in registration order, before
/// returning. There is no deferred or batched delivery.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<BattleListener>,
}

impl ListenerRegistry {
    pub fn register(&mut self, listener: impl Into<BattleListener>) {
        let listener = listener.into();
        trace!(target: "zsim::listener", id = listener.listener_id(), "listener registered");
        self.listeners.push(listener);
    }

    /// Stops at the first listener error; the run is over at that point.
    pub fn broadcast(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        ctx: &mut ListenerContext<'_>,
    ) -> Result<(), PreloadError> {
        trace!(
            target: "zsim::listener",
            tick = ctx.tick,
            ?signal,
            event = event.kind_name(),
            listeners = self.listeners.len(),
            "broadcast"
        );
        for listener in &mut self.listeners {
            listener.receive(event, signal, ctx)?;
        }
        Ok(())
    }

    pub fn get(&self, listener_id: &str) -> Option<&BattleListener> {
        self.listeners
            .iter()
            .find(|l| l.listener_id() == listener_id)
    }

    /// First registered signal log, if any.
    pub fn signal_log(&self) -> Option<&SignalLog> {
        self.listeners.iter().find_map(|l| match l {
            BattleListener::SignalLog(log) => Some(log),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleListener> + '_ {
        self.listeners.iter()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
