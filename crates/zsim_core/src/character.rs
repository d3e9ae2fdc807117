//! Roster: the ordered team the scheduler acts for.

use std::collections::BTreeMap;

use ahash::AHashMap;
use tracing::debug;

use crate::{CharacterDef, CharacterId, PreloadError, ResourceKind, SkillDef, SkillTag};

#[derive(Debug, Clone)]
pub struct Character {
    id: CharacterId,
    name: String,
    skills: Vec<SkillDef>,
    resources: BTreeMap<ResourceKind, f64>,
    /// Built by `post_init`; lookups fall back to a linear scan before that.
    skill_index: AHashMap<SkillTag, usize>,
    post_init_done: bool,
}

impl Character {
    pub fn from_def(def: &CharacterDef) -> Self {
        Self {
            id: def.id,
            name: def.name.clone(),
            skills: def.skills.clone(),
            resources: def.resources.clone(),
            skill_index: AHashMap::new(),
            post_init_done: false,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-time wiring run before the first tick.
    pub fn post_init(&mut self) -> Result<(), PreloadError> {
        if self.post_init_done {
            return Err(PreloadError::DuplicatePostInit(self.id));
        }
        self.skill_index = self
            .skills
            .iter()
            .enumerate()
            .map(|(i, skill)| (skill.tag.clone(), i))
            .collect();
        self.post_init_done = true;
        debug!(
            target: "zsim::preload",
            char_id = %self.id,
            skills = self.skills.len(),
            "character post-initialised"
        );
        Ok(())
    }

    pub fn is_post_initialised(&self) -> bool {
        self.post_init_done
    }

    pub fn skill(&self, tag: &SkillTag) -> Option<&SkillDef> {
        if self.post_init_done {
            return self.skill_index.get(tag).map(|&i| &self.skills[i]);
        }
        self.skills.iter().find(|skill| &skill.tag == tag)
    }

    pub fn skills(&self) -> &[SkillDef] {
        &self.skills
    }

    pub fn resource(&self, kind: ResourceKind) -> f64 {
        self.resources.get(&kind).copied().unwrap_or(0.0)
    }

    /// Adds `delta` to a resource, flooring at zero. Returns the new level.
    pub fn update_resource(&mut self, kind: ResourceKind, delta: f64) -> f64 {
        let level = self.resources.entry(kind).or_insert(0.0);
        *level = (*level + delta).max(0.0);
        *level
    }
}

/// Stable, ordered collection of characters.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    pub fn from_defs(defs: &[CharacterDef]) -> Self {
        Self {
            characters: defs.iter().map(Character::from_def).collect(),
        }
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Skill definition for a tag, resolved through its encoded character id.
    pub fn skill(&self, tag: &SkillTag) -> Option<&SkillDef> {
        self.get(tag.actor_id()?)?.skill(tag)
    }

    /// Character ids in roster order.
    pub fn name_order(&self) -> Vec<CharacterId> {
        self.characters.iter().map(|c| c.id).collect()
    }

    /// Runs every character's one-time hook.
    pub fn post_init_all(&mut self) -> Result<(), PreloadError> {
        self.characters.iter_mut().try_for_each(Character::post_init)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> + '_ {
        self.characters.iter()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
