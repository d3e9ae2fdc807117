//! Working state of the preload stage.
//!
//! `PreloadData` is the only place where a chosen action becomes committed
//! history. Engines read it freely but change it exclusively through
//! [`PreloadData::push_node`] and the queue-resolution path used by the
//! confirm engine.

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::battle::BattleWorld;
use crate::listener::{BattleEvent, ListenerSignal};
use crate::node_stack::{GLOBAL_STACK_CAPACITY, PERSONAL_STACK_CAPACITY};
use crate::tracker::{ActionReplaceManager, AttackTracker, QuickAssistSystem, ResolvedAttack};
use crate::{
    CharacterId, Constants, Enemy, EnemyAttack, ExternalQueue, MissionTable, NodeStack,
    PreloadError, Roster, SharedNode, SkillNode, SkillTag,
};

/// Run-level tallies kept across segment resets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadCounters {
    pub ticks: u64,
    pub waits: u64,
    pub confirmations: u64,
    pub nodes_admitted: u64,
    pub displacements: u64,
    pub attacks_resolved: u64,
}

#[derive(Debug, Clone)]
pub struct PreloadData {
    pending: Vec<SharedNode>,
    external_queue: ExternalQueue,
    personal_stacks: AHashMap<CharacterId, NodeStack<SharedNode>>,
    global_stack: NodeStack<SharedNode>,
    latest_active: Option<SharedNode>,
    name_order: Vec<CharacterId>,
    quick_assist_window_ticks: u64,
    quick_assist: Option<QuickAssistSystem>,
    attack_tracker: Option<AttackTracker>,
    action_replace: ActionReplaceManager,
    counters: PreloadCounters,
}

impl PreloadData {
    pub fn new(roster: &Roster, constants: &Constants) -> Self {
        Self {
            pending: Vec::new(),
            external_queue: ExternalQueue::default(),
            personal_stacks: AHashMap::new(),
            global_stack: NodeStack::new(GLOBAL_STACK_CAPACITY),
            latest_active: None,
            name_order: roster.name_order(),
            quick_assist_window_ticks: constants.quick_assist_window_ticks,
            quick_assist: None,
            attack_tracker: None,
            action_replace: ActionReplaceManager::new(constants),
            counters: PreloadCounters::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Admission
    // -----------------------------------------------------------------------

    /// Commits `node` into history.
    ///
    /// Every check runs before the first mutation, so a refused node leaves
    /// the stacks, the pending list and the mission table untouched.
    pub fn push_node(
        &mut self,
        node: SharedNode,
        tick: u64,
        world: &mut BattleWorld,
    ) -> Result<(), PreloadError> {
        self.check_before_push(&node, tick)?;
        let char_id = node.char_id();

        let displacing = !node.rides_alongside()
            && self
                .personal_stacks
                .get(&char_id)
                .is_some_and(|stack| !stack.last_is_finished(node.preload_tick()));
        if displacing {
            let displaced = self.force_change_action(&node, &mut world.missions)?;
            self.counters.displacements += 1;
            debug!(
                target: "zsim::preload",
                tick,
                char_id = %char_id,
                displaced = %displaced.skill_tag(),
                skill_tag = %node.skill_tag(),
                "action displaced"
            );
        }

        self.pending.push(node.clone());
        self.global_stack.push(node.clone());

        let first_action = self
            .personal_stacks
            .get(&char_id)
            .is_none_or(NodeStack::is_empty);
        if first_action {
            debug!(target: "zsim::preload", tick, char_id = %char_id, "enter battle");
            world.broadcast(
                &BattleEvent::Node(node.clone()),
                ListenerSignal::EnterBattle,
                tick,
                &mut self.external_queue,
            )?;
        }
        self.personal_stacks
            .entry(char_id)
            .or_insert_with(|| NodeStack::new(PERSONAL_STACK_CAPACITY))
            .push(node.clone());

        if node.active_generation() {
            self.latest_active = Some(node.clone());
        }

        let window = self.quick_assist_window_ticks;
        self.quick_assist
            .get_or_insert_with(|| QuickAssistSystem::new(world.roster.name_order(), window))
            .update(tick, &node);

        if let Some(tracker) = self.attack_tracker.as_mut().filter(|t| t.attacking()) {
            tracker.record_answer(node.clone());
        }

        self.action_replace.update(&node, tick);
        self.counters.nodes_admitted += 1;
        trace!(
            target: "zsim::preload",
            tick,
            char_id = %char_id,
            skill_tag = %node.skill_tag(),
            active = node.active_generation(),
            end_tick = node.end_tick(),
            "node admitted"
        );
        Ok(())
    }

    /// At most one self-initiated node may be pending per tick.
    pub fn check_before_push(&self, node: &SkillNode, tick: u64) -> Result<(), PreloadError> {
        if !node.active_generation() {
            return Ok(());
        }
        match self
            .pending
            .iter()
            .find(|p| p.active_generation() && p.preload_tick() == node.preload_tick())
        {
            Some(pending) => Err(PreloadError::MultipleActiveActions {
                tick,
                pending: pending.skill_tag().clone(),
                incoming: node.skill_tag().clone(),
            }),
            None => Ok(()),
        }
    }

    /// Force-ends the top of the actor's personal stack in favour of `node`.
    ///
    /// Ends and removes every mission carrying the displaced tag. Returns the
    /// displaced node.
    pub fn force_change_action(
        &self,
        node: &SkillNode,
        missions: &mut MissionTable,
    ) -> Result<SharedNode, PreloadError> {
        let displaced = self
            .personal_stacks
            .get(&node.char_id())
            .and_then(NodeStack::peek)
            .ok_or_else(|| PreloadError::NothingToDisplace {
                char_id: node.char_id(),
                incoming: node.skill_tag().clone(),
            })?;
        if displaced.end_tick() <= node.preload_tick() {
            return Err(PreloadError::DisplacedAlreadyFinished {
                displaced: displaced.skill_tag().clone(),
                incoming: node.skill_tag().clone(),
                end_tick: displaced.end_tick(),
                start_tick: node.preload_tick(),
            });
        }
        if displaced.do_immediately() && !node.is_dodge() {
            return Err(PreloadError::UninterruptibleDisplaced {
                displaced: displaced.skill_tag().clone(),
                incoming: node.skill_tag().clone(),
            });
        }
        missions.end_and_remove_by_tag(displaced.skill_tag());
        Ok(displaced.clone())
    }

    /// Pre-tick check. Runs the enemy stun check and returns the new stun
    /// state when it changed.
    pub fn check_before_preload(&mut self, tick: u64, enemy: &mut dyn Enemy) -> Option<bool> {
        if !self.pending.is_empty() {
            warn!(
                target: "zsim::preload",
                tick,
                pending = self.pending.len(),
                "nodes left unconsumed by the load stage"
            );
        }
        self.counters.ticks += 1;
        let was_stunned = enemy.is_stunned();
        let stunned = enemy.stun_judge(tick);
        (was_stunned != stunned).then_some(stunned)
    }

    // -----------------------------------------------------------------------
    // External queue
    // -----------------------------------------------------------------------

    /// Queues a `(skill_tag, active_generation, priority)` request for the
    /// force-add engine. Returns the queue id.
    pub fn external_add_skill(
        &mut self,
        skill_tag: SkillTag,
        active_generation: bool,
        priority: i32,
    ) -> u64 {
        self.external_queue.push(skill_tag, active_generation, priority)
    }

    pub fn external_queue(&self) -> &ExternalQueue {
        &self.external_queue
    }

    pub(crate) fn queue_mut(&mut self) -> &mut ExternalQueue {
        &mut self.external_queue
    }

    pub(crate) fn resolve_queued(&mut self, ids: &[u64]) {
        self.external_queue.remove_resolved(ids);
    }

    // -----------------------------------------------------------------------
    // Segment reset
    // -----------------------------------------------------------------------

    /// Clears history and queues and re-seats the roster order. The object
    /// itself survives; run-level counters are kept.
    pub fn reset(&mut self, roster: &Roster) {
        self.pending.clear();
        self.external_queue.clear();
        for stack in self.personal_stacks.values_mut() {
            stack.reset();
        }
        self.global_stack.reset();
        self.latest_active = None;
        self.name_order = roster.name_order();
        self.quick_assist = None;
        self.attack_tracker = None;
        self.action_replace.reset();
        debug!(target: "zsim::preload", characters = self.name_order.len(), "preload data reset");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Newest self-initiated node in the team history, if still running.
    pub fn on_field_node(&self, tick: u64) -> Option<&SharedNode> {
        self.global_stack
            .find_newest(|n| n.active_generation())
            .filter(|n| n.end_tick() > tick)
    }

    /// The character's running action, if any.
    pub fn occupying_node(&self, char_id: CharacterId, tick: u64) -> Option<&SharedNode> {
        self.personal_stacks.get(&char_id)?.effective_node(tick)
    }

    pub fn is_occupied(&self, char_id: CharacterId, tick: u64) -> bool {
        self.occupying_node(char_id, tick).is_some()
    }

    /// Character of the newest self-initiated node.
    pub fn operating_now(&self) -> Option<CharacterId> {
        self.latest_active.as_ref().map(|n| n.char_id())
    }

    pub fn latest_active(&self) -> Option<&SharedNode> {
        self.latest_active.as_ref()
    }

    pub fn personal_stack(&self, char_id: CharacterId) -> Option<&NodeStack<SharedNode>> {
        self.personal_stacks.get(&char_id)
    }

    pub fn global_stack(&self) -> &NodeStack<SharedNode> {
        &self.global_stack
    }

    pub fn pending(&self) -> &[SharedNode] {
        &self.pending
    }

    /// Hands this tick's admitted nodes to the load stage.
    pub fn take_pending(&mut self) -> Vec<SharedNode> {
        std::mem::take(&mut self.pending)
    }

    pub fn name_order(&self) -> &[CharacterId] {
        &self.name_order
    }

    pub fn quick_assist(&self) -> Option<&QuickAssistSystem> {
        self.quick_assist.as_ref()
    }

    pub fn action_replace(&self) -> &ActionReplaceManager {
        &self.action_replace
    }

    pub fn counters(&self) -> &PreloadCounters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut PreloadCounters {
        &mut self.counters
    }

    // -----------------------------------------------------------------------
    // Enemy attacks
    // -----------------------------------------------------------------------

    pub fn attack_tracker(&self) -> Option<&AttackTracker> {
        self.attack_tracker.as_ref()
    }

    /// Starts tracking a declared attack. The tracker is built on first use.
    pub fn begin_enemy_attack(&mut self, attack: EnemyAttack) -> bool {
        self.attack_tracker
            .get_or_insert_with(AttackTracker::default)
            .begin(attack)
    }

    pub fn resolve_enemy_attack(&mut self, tick: u64) -> Option<ResolvedAttack> {
        let resolved = self.attack_tracker.as_mut()?.resolve_due(tick)?;
        self.counters.attacks_resolved += 1;
        Some(resolved)
    }
}
