//! Battle tick: preload followed by a minimal load stage.
//!
//! `BattleWorld` bundles the collaborators the preload stage is handed on
//! every call. Nothing in the core reaches for them any other way.

use tracing::{debug, trace};

use crate::apl::AplEvaluator;
use crate::listener::{
    AnomalyEvent, BattleEvent, BattleListener, ListenerContext, ListenerRegistry, ListenerSignal,
};
use crate::{
    BattleContent, Constants, Enemy, ExternalQueue, LoadingMission, MissionTable, Preload,
    PreloadError, Roster, SharedNode, SkillTag, TrainingDummy,
};

pub struct BattleWorld {
    pub roster: Roster,
    pub missions: MissionTable,
    pub listeners: ListenerRegistry,
    pub enemy: Box<dyn Enemy>,
    pub constants: Constants,
}

impl BattleWorld {
    /// World with a training dummy built from the content's enemy definition.
    pub fn new(content: &BattleContent) -> Self {
        Self::with_enemy(content, Box::new(TrainingDummy::new(content.enemy.clone())))
    }

    pub fn with_enemy(content: &BattleContent, enemy: Box<dyn Enemy>) -> Self {
        Self {
            roster: Roster::from_defs(&content.characters),
            missions: MissionTable::default(),
            listeners: ListenerRegistry::default(),
            enemy,
            constants: content.constants.clone(),
        }
    }

    /// Delivers `event` to every registered listener before returning.
    pub fn broadcast(
        &mut self,
        event: &BattleEvent,
        signal: ListenerSignal,
        tick: u64,
        queue: &mut ExternalQueue,
    ) -> Result<(), PreloadError> {
        let mut ctx = ListenerContext {
            tick,
            roster: &mut self.roster,
            queue,
        };
        self.listeners.broadcast(event, signal, &mut ctx)
    }

    /// Materialises one committed node.
    fn load(
        &mut self,
        node: &SharedNode,
        tick: u64,
        queue: &mut ExternalQueue,
    ) -> Result<(), PreloadError> {
        self.missions.insert(LoadingMission::from_node(node));
        let def = self
            .roster
            .skill(node.skill_tag())
            .ok_or_else(|| PreloadError::UnknownSkill(node.skill_tag().clone()))?;
        let deltas = def.resource_deltas.clone();
        let anomaly = def.anomaly;

        let character = self
            .roster
            .get_mut(node.char_id())
            .ok_or(PreloadError::UnknownCharacter(node.char_id()))?;
        for delta in deltas {
            character.update_resource(delta.resource, delta.amount);
        }
        self.enemy.absorb_hit(node);

        if let Some(element) = anomaly {
            debug!(
                target: "zsim::preload",
                tick,
                char_id = %node.char_id(),
                ?element,
                "anomaly created"
            );
            let event = BattleEvent::Anomaly(AnomalyEvent {
                element,
                source: node.char_id(),
                tick,
            });
            self.broadcast(&event, ListenerSignal::Anomaly, tick, queue)?;
        }
        Ok(())
    }
}

pub struct Battle {
    world: BattleWorld,
    preload: Preload,
    tick: u64,
}

impl Battle {
    pub fn new(world: BattleWorld, evaluator: Box<dyn AplEvaluator>) -> Self {
        let preload = Preload::new(&world, evaluator);
        Self {
            world,
            preload,
            tick: 0,
        }
    }

    pub fn register_listener(&mut self, listener: impl Into<BattleListener>) {
        self.world.listeners.register(listener);
    }

    /// Advances one tick and returns the nodes admitted during it.
    pub fn tick(&mut self) -> Result<Vec<SharedNode>, PreloadError> {
        let tick = self.tick;
        self.preload.do_preload(tick, &mut self.world)?;

        let admitted = self.preload.data_mut().take_pending();
        for node in &admitted {
            self.world.load(node, tick, self.preload.data_mut().queue_mut())?;
        }
        let retired = self.world.missions.retire_finished(tick);
        if !retired.is_empty() {
            trace!(target: "zsim::preload", tick, retired = retired.len(), "missions retired");
        }

        self.tick += 1;
        Ok(admitted)
    }

    /// Starts a new segment from tick zero with empty history.
    pub fn reset_segment(&mut self) {
        self.preload.reset(&self.world.roster);
        self.world.missions.clear();
        self.tick = 0;
    }

    pub fn external_add_skill(
        &mut self,
        skill_tag: SkillTag,
        active_generation: bool,
        priority: i32,
    ) -> u64 {
        self.preload
            .data_mut()
            .external_add_skill(skill_tag, active_generation, priority)
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &BattleWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut BattleWorld {
        &mut self.world
    }

    pub fn preload(&self) -> &Preload {
        &self.preload
    }
}
