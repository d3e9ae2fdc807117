use tracing::debug;

use super::{cooldown_ready, BattleEvent, Listener, ListenerContext, ListenerSignal};
use crate::{CharacterId, PreloadError, SkillTag};

/// Queues a passive follow-up skill whenever a trigger character creates an
/// anomaly. The follow-up is drained by the force-add engine on a later tick.
#[derive(Debug, Clone)]
pub struct CoordinatedAttackListener {
    listener_id: String,
    trigger: CharacterId,
    follow_up: SkillTag,
    priority: i32,
    cooldown: u64,
    bound: bool,
    last_active_tick: Option<u64>,
    queued: u32,
}

impl CoordinatedAttackListener {
    pub fn new(
        listener_id: impl Into<String>,
        trigger: CharacterId,
        follow_up: SkillTag,
        priority: i32,
        cooldown: u64,
    ) -> Self {
        Self {
            listener_id: listener_id.into(),
            trigger,
            follow_up,
            priority,
            cooldown,
            bound: false,
            last_active_tick: None,
            queued: 0,
        }
    }

    pub fn follow_up(&self) -> &SkillTag {
        &self.follow_up
    }

    pub fn queued(&self) -> u32 {
        self.queued
    }
}

impl Listener for CoordinatedAttackListener {
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
            let Some(owner) = self.follow_up.actor_id() else {
                return Err(PreloadError::MalformedSkillTag(self.follow_up.clone()));
            };
            if ctx.roster.get(owner).is_none() {
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
        if anomaly.source != self.trigger {
            return Ok(());
        }
        self.activate(ctx)
    }

    fn activate(&mut self, ctx: &mut ListenerContext<'_>) -> Result<(), PreloadError> {
        if !cooldown_ready(self.last_active_tick, self.cooldown, ctx.tick) {
            return Ok(());
        }
        let id = ctx
            .queue
            .push(self.follow_up.clone(), false, self.priority);
        self.last_active_tick = Some(ctx.tick);
        self.queued += 1;
        debug!(
            target: "zsim::listener",
            id = %self.listener_id,
            tick = ctx.tick,
            skill_tag = %self.follow_up,
            queue_id = id,
            "coordinated attack queued"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::AnomalyEvent;
    use crate::test_fixtures::base_content;
    use crate::{ElementType, ExternalQueue, Roster};

    fn anomaly(source: u32, tick: u64) -> BattleEvent {
        BattleEvent::Anomaly(AnomalyEvent {
            element: ElementType::Electric,
            source: CharacterId(source),
            tick,
        })
    }

    fn coordinated() -> CoordinatedAttackListener {
        CoordinatedAttackListener::new(
            "coordinated",
            CharacterId(11),
            SkillTag::from("11_coordinated"),
            5,
            300,
        )
    }

    #[test]
    fn test_trigger_anomaly_queues_passive_follow_up() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut queue = ExternalQueue::default();
        let mut listener = coordinated();
        for (source, tick) in [(11, 0), (7, 10), (11, 100), (11, 300)] {
            let mut ctx = ListenerContext {
                tick,
                roster: &mut roster,
                queue: &mut queue,
            };
            listener
                .receive(&anomaly(source, tick), ListenerSignal::Anomaly, &mut ctx)
                .unwrap();
        }
        // Tick 10 is the wrong source, tick 100 is inside the cooldown.
        assert_eq!(listener.queued(), 2);
        let queued: Vec<_> = queue.iter().collect();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].skill_tag, SkillTag::from("11_coordinated"));
        assert!(!queued[0].active_generation);
        assert_eq!(queued[0].priority, 5);
    }

    #[test]
    fn test_malformed_follow_up_is_fatal() {
        let mut roster = Roster::from_defs(&base_content().characters);
        let mut queue = ExternalQueue::default();
        let mut listener = CoordinatedAttackListener::new(
            "broken",
            CharacterId(11),
            SkillTag::from("coordinated"),
            0,
            0,
        );
        let mut ctx = ListenerContext {
            tick: 0,
            roster: &mut roster,
            queue: &mut queue,
        };
        let err = listener
            .receive(&anomaly(11, 0), ListenerSignal::Anomaly, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, PreloadError::MalformedSkillTag(_)));
    }
}
