//! Mission table: in-flight skill executions owned by the Load stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{CharacterId, SkillNode, SkillTag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingMission {
    key: String,
    mission_tag: SkillTag,
    char_id: CharacterId,
    start_tick: u64,
    end_tick: u64,
    ended: bool,
}

impl LoadingMission {
    /// Materialises a committed node. Keyed by tag and start tick.
    pub fn from_node(node: &SkillNode) -> Self {
        Self {
            key: format!("{}@{}", node.skill_tag(), node.preload_tick()),
            mission_tag: node.skill_tag().clone(),
            char_id: node.char_id(),
            start_tick: node.preload_tick(),
            end_tick: node.end_tick(),
            ended: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mission_tag(&self) -> &SkillTag {
        &self.mission_tag
    }

    pub fn char_id(&self) -> CharacterId {
        self.char_id
    }

    pub fn start_tick(&self) -> u64 {
        self.start_tick
    }

    pub fn end_tick(&self) -> u64 {
        self.end_tick
    }

    /// Finalises the mission. Idempotent; returns true only for the call that
    /// actually ended it.
    pub fn end(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        true
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

#[derive(Debug, Clone, Default)]
pub struct MissionTable {
    missions: BTreeMap<String, LoadingMission>,
}

impl MissionTable {
    pub fn insert(&mut self, mission: LoadingMission) {
        self.missions.insert(mission.key.clone(), mission);
    }

    pub fn get(&self, key: &str) -> Option<&LoadingMission> {
        self.missions.get(key)
    }

    pub fn contains_tag(&self, tag: &SkillTag) -> bool {
        self.missions.values().any(|m| &m.mission_tag == tag)
    }

    /// Ends, then removes, every mission whose tag matches. Returns the
    /// removed missions.
    pub fn end_and_remove_by_tag(&mut self, tag: &SkillTag) -> Vec<LoadingMission> {
        let keys: Vec<String> = self
            .missions
            .values()
            .filter(|m| &m.mission_tag == tag)
            .map(|m| m.key.clone())
            .collect();
        let mut removed = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(mut mission) = self.missions.remove(&key) {
                mission.end();
                trace!(target: "zsim::preload", key = %key, "mission ended by displacement");
                removed.push(mission);
            }
        }
        removed
    }

    /// Ends and removes missions that ran to completion by `tick`.
    pub fn retire_finished(&mut self, tick: u64) -> Vec<LoadingMission> {
        let keys: Vec<String> = self
            .missions
            .values()
            .filter(|m| m.end_tick <= tick)
            .map(|m| m.key.clone())
            .collect();
        keys.into_iter()
            .filter_map(|key| self.missions.remove(&key))
            .map(|mut mission| {
                mission.end();
                mission
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.missions.clear();
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoadingMission> + '_ {
        self.missions.values()
    }
}
