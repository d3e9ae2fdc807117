//! Listener broadcast: typed signals delivered synchronously to passive systems.
//!
//! Listeners form a closed set ([`BattleListener`]) dispatched through the
//! [`Listener`] capability trait. Each listener filters by signal, binds
//! lazily to the character it affects and owns its cooldown state.

mod anomaly_refund;
mod coordinated_attack;
mod registry;
mod signal_log;

use serde::{Deserialize, Serialize};

use crate::{CharacterId, ElementType, ExternalQueue, PreloadError, Roster, SharedNode};

pub use anomaly_refund::AnomalyRefundListener;
pub use coordinated_attack::CoordinatedAttackListener;
pub use registry::ListenerRegistry;
pub use signal_log::{SignalLog, SignalRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerSignal {
    /// A character's first admitted action in the current segment.
    EnterBattle,
    /// A new anomaly was created on the enemy.
    Anomaly,
    /// The enemy's special state changed (stun entered or left).
    StateUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyEvent {
    pub element: ElementType,
    pub source: CharacterId,
    pub tick: u64,
}

#[derive(Debug, Clone)]
pub enum BattleEvent {
    Node(SharedNode),
    Anomaly(AnomalyEvent),
    EnemyStun { stunned: bool },
}

impl BattleEvent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            BattleEvent::Node(_) => "node",
            BattleEvent::Anomaly(_) => "anomaly",
            BattleEvent::EnemyStun { .. } => "enemy_stun",
        }
    }

    /// Character the event concerns, if any.
    pub fn subject(&self) -> Option<CharacterId> {
        match self {
            BattleEvent::Node(node) => Some(node.char_id()),
            BattleEvent::Anomaly(anomaly) => Some(anomaly.source),
            BattleEvent::EnemyStun { .. } => None,
        }
    }
}

/// What a listener may touch while handling a signal. The registry itself is
/// deliberately absent, so no listener can subscribe or unsubscribe mid-dispatch.
pub struct ListenerContext<'a> {
    pub tick: u64,
    pub roster: &'a mut Roster,
    pub queue: &'a mut ExternalQueue,
}

pub trait Listener {
    fn listener_id(&self) -> &str;

    /// Handles one broadcast. Irrelevant signals are ignored.
    fn receive(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        ctx: &mut ListenerContext<'_>,
    ) -> Result<(), PreloadError>;

    /// Applies the listener's effect. A cooldown that is not ready is a no-op.
    fn activate(&mut self, ctx: &mut ListenerContext<'_>) -> Result<(), PreloadError>;
}

#[derive(Debug, Clone)]
pub enum BattleListener {
    AnomalyRefund(AnomalyRefundListener),
    CoordinatedAttack(CoordinatedAttackListener),
    SignalLog(SignalLog),
}

impl BattleListener {
    fn as_listener_mut(&mut self) -> &mut dyn Listener {
        match self {
            BattleListener::AnomalyRefund(l) => l,
            BattleListener::CoordinatedAttack(l) => l,
            BattleListener::SignalLog(l) => l,
        }
    }
}

impl Listener for BattleListener {
    fn listener_id(&self) -> &str {
        match self {
            BattleListener::AnomalyRefund(l) => l.listener_id(),
            BattleListener::CoordinatedAttack(l) => l.listener_id(),
            BattleListener::SignalLog(l) => l.listener_id(),
        }
    }

    fn receive(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        ctx: &mut ListenerContext<'_>,
    ) -> Result<(), PreloadError> {
        self.as_listener_mut().receive(event, signal, ctx)
    }

    fn activate(&mut self, ctx: &mut ListenerContext<'_>) -> Result<(), PreloadError> {
        self.as_listener_mut().activate(ctx)
    }
}

impl From<AnomalyRefundListener> for BattleListener {
    fn from(listener: AnomalyRefundListener) -> Self {
        BattleListener::AnomalyRefund(listener)
    }
}

impl From<CoordinatedAttackListener> for BattleListener {
    fn from(listener: CoordinatedAttackListener) -> Self {
        BattleListener::CoordinatedAttack(listener)
    }
}

impl From<SignalLog> for BattleListener {
    fn from(listener: SignalLog) -> Self {
        BattleListener::SignalLog(listener)
    }
}

/// Cooldown gate shared by listeners: the first activation is always
/// eligible, later ones once `cooldown` ticks have elapsed.
pub(crate) fn cooldown_ready(last_active_tick: Option<u64>, cooldown: u64, tick: u64) -> bool {
    last_active_tick.is_none_or(|last| last + cooldown <= tick)
}
