use tracing::{debug, trace};

use super::{cooldown_ready, BattleEvent, Listener, ListenerContext, ListenerSignal};
use crate::{CharacterId, ElementType, PreloadError, ResourceKind};

/// Refunds a resource to one character whenever an anomaly is created, at
/// most once per cooldown window.
#[derive(Debug, Clone)]
pub struct AnomalyRefundListener {
    listener_id: String,
    target: CharacterId,
    resource: ResourceKind,
    recover_value: f64,
    cooldown: u64,
    element: Option<ElementType>,
    bound: bool,
    last_active_tick: Option<u64>,
    activations: u32,
}

impl AnomalyRefundListener {
    pub fn new(
        listener_id: impl Into<String>,
        target: CharacterId,
        resource: ResourceKind,
        recover_value: f64,
        cooldown: u64,
    ) -> Self {
        Self {
            listener_id: listener_id.into(),
            target,
            resource,
            recover_value,
            cooldown,
            element: None,
            bound: false,
            last_active_tick: None,
            activations: 0,
        }
    }

    /// Only react to anomalies of one element.
    #[must_use]
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.element = Some(element);
        self
    }

    pub fn target(&self) -> CharacterId {
        self.target
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn activations(&self) -> u32 {
        self.activations
    }

    pub fn last_active_tick(&self) -> Option<u64> {
        self.last_active_tick
    }

    pub fn ready(&self, tick: u64) -> bool {
        cooldown_ready(self.last_active_tick, self.cooldown, tick)
    }
}

impl Listener for AnomalyRefundListener {
    fn listener_id(&self) -> &str {
        &self.listener_id
    }

    fn receive(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        ctx: &mut ListenerContext<'_>,
    ) -> Result<(), PreloadError> {
        if !self.bound {
            // The target may not be seated yet; try again on the next event.
            if ctx.roster.get(self.target).is_none() {
                return Ok(());
            }
            self.bound = true;
        }
        if signal != ListenerSignal::Anomaly {
            return Ok(());
        }
        let BattleEvent::Anomaly(anomaly) = event else {
            return Err(PreloadError::UnexpectedEvent {
                listener: self.listener_id.clone(),
                signal,
                found: event.kind_name(),
            });
        };
        if self.element.is_some_and(|e| e != anomaly.element) {
            return Ok(());
        }
        self.activate(ctx)
    }

    fn activate(&mut self, ctx: &mut ListenerContext<'_>) -> Result<(), PreloadError> {
        if !self.ready(ctx.tick) {
            trace!(
                target: "zsim::listener",
                id = %self.listener_id,
                tick = ctx.tick,
                last_active_tick = ?self.last_active_tick,
                "refund on cooldown"
            );
            return Ok(());
        }
        let character = ctx
            .roster
            .get_mut(self.target)
            .ok_or(PreloadError::UnknownCharacter(self.target))?;
        let level = character.update_resource(self.resource, self.recover_value);
        self.last_active_tick = Some(ctx.tick);
        self.activations += 1;
        debug!(
            target: "zsim::listener",
            id = %self.listener_id,
            tick = ctx.tick,
            char_id = %self.target,
            resource = ?self.resource,
            level,
            "resource refunded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::AnomalyEvent;
    use crate::test_fixtures::base_content;
    use crate::{ExternalQueue, Roster};

    fn anomaly(element: ElementType, tick: u64) -> BattleEvent {
        BattleEvent::Anomaly(AnomalyEvent {
            element,
            source: CharacterId(11),
            tick,
        })
    }

    fn refund() -> AnomalyRefundListener {
        AnomalyRefundListener::new(
            "refund",
            CharacterId(13),
            ResourceKind::Adrenaline,
            10.0,
            600,
        )
    }

    fn deliver(
        listener: &mut AnomalyRefundListener,
        roster: &mut Roster,
        event: &BattleEvent,
        signal: ListenerSignal,
        tick: u64,
    ) -> Result<(), PreloadError> {
        let mut queue = ExternalQueue::default();
        let mut ctx = ListenerContext {
            tick,
            roster,
            queue: &mut queue,
        };
        listener.receive(event, signal, &mut ctx)
    }

    fn adrenaline(roster: &Roster) -> f64 {
        roster
            .get(CharacterId(13))
            .unwrap()
            .resource(ResourceKind::Adrenaline)
    }

    #[test]
    fn test_first_activation_is_unconditional_then_cooldown() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut listener = refund();
        let event = anomaly(ElementType::Electric, 0);

        deliver(&mut listener, &mut roster, &event, ListenerSignal::Anomaly, 0).unwrap();
        assert!((adrenaline(&roster) - 10.0).abs() < 1e-9);

        deliver(&mut listener, &mut roster, &event, ListenerSignal::Anomaly, 599).unwrap();
        assert!((adrenaline(&roster) - 10.0).abs() < 1e-9);

        deliver(&mut listener, &mut roster, &event, ListenerSignal::Anomaly, 600).unwrap();
        assert!((adrenaline(&roster) - 20.0).abs() < 1e-9);
        assert_eq!(listener.activations(), 2);
    }

    #[test]
    fn test_other_signals_ignored_but_bind() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut listener = refund();
        let event = BattleEvent::EnemyStun { stunned: true };
        deliver(&mut listener, &mut roster, &event, ListenerSignal::StateUpdate, 5).unwrap();
        assert!(listener.is_bound());
        assert_eq!(listener.activations(), 0);
    }

    #[test]
    fn test_absent_target_stays_unbound() {
        let mut roster = Roster::default();
        let mut listener = refund();
        let event = anomaly(ElementType::Electric, 0);
        deliver(&mut listener, &mut roster, &event, ListenerSignal::Anomaly, 0).unwrap();
        assert!(!listener.is_bound());
        assert_eq!(listener.activations(), 0);
    }

    #[test]
    fn test_wrong_event_kind_is_fatal() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut listener = refund();
        let err = deliver(
            &mut listener,
            &mut roster,
            &BattleEvent::EnemyStun { stunned: false },
            ListenerSignal::Anomaly,
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PreloadError::UnexpectedEvent { found: "enemy_stun", .. }
        ));
    }

    #[test]
    fn test_element_filter() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut listener = refund().with_element(ElementType::AuricInk);
        let event = anomaly(ElementType::Fire, 0);
        deliver(&mut listener, &mut roster, &event, ListenerSignal::Anomaly, 0).unwrap();
        assert_eq!(listener.activations(), 0);
    }
}
