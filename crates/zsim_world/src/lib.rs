//! Content loading and battle assembly shared between zsim_cli and tests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use zsim_control::PriorityList;
use zsim_core::listener::{AnomalyRefundListener, CoordinatedAttackListener, SignalLog};
use zsim_core::{
    Battle, BattleContent, BattleWorld, CharacterDef, CharacterId, Constants, ElementType,
    EnemyDef, ResourceKind, SkillTag,
};

/// Id of the signal log every assembled battle carries.
pub const SIGNAL_LOG_ID: &str = "signal_log";

#[derive(Deserialize)]
struct RosterFile {
    content_version: String,
    characters: Vec<CharacterDef>,
}

/// Listener configuration read from `listeners.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListenerDef {
    /// Falls back to the constants' refund value and cooldown when unset.
    AnomalyRefund {
        id: String,
        target: CharacterId,
        resource: ResourceKind,
        #[serde(default)]
        element: Option<ElementType>,
        #[serde(default)]
        recover_value: Option<f64>,
        #[serde(default)]
        cooldown_ticks: Option<u64>,
    },
    CoordinatedAttack {
        id: String,
        trigger: CharacterId,
        follow_up: SkillTag,
        #[serde(default)]
        priority: i32,
        cooldown_ticks: u64,
    },
    SignalLog {
        id: String,
    },
}

impl ListenerDef {
    pub fn id(&self) -> &str {
        match self {
            Self::AnomalyRefund { id, .. }
            | Self::CoordinatedAttack { id, .. }
            | Self::SignalLog { id } => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a skill tag whose prefix names another character,
/// the same tag on two skills, or a swap-cancel offset past the action's end.
pub fn validate_content(content: &BattleContent) {
    assert!(
        !content.characters.is_empty(),
        "roster must contain at least one character"
    );

    let mut char_ids = HashSet::new();
    let mut tags: HashSet<&SkillTag> = HashSet::new();
    for character in &content.characters {
        assert!(
            char_ids.insert(character.id),
            "character id {} appears more than once",
            character.id,
        );
        for skill in &character.skills {
            assert!(
                skill.tag.actor_id() == Some(character.id),
                "skill tag '{}' does not belong to character {}",
                skill.tag,
                character.id,
            );
            assert!(
                tags.insert(&skill.tag),
                "skill tag '{}' is defined more than once",
                skill.tag,
            );
            assert!(skill.ticks > 0, "skill '{}' has zero ticks", skill.tag);
            assert!(
                skill.swap_cancel_ticks <= skill.ticks,
                "skill '{}' swap_cancel_ticks {} exceeds ticks {}",
                skill.tag,
                skill.swap_cancel_ticks,
                skill.ticks,
            );
        }
    }

    if let Some((start, end)) = content.constants.apl_trace_window {
        assert!(
            start <= end,
            "apl_trace_window start {start} is after end {end}"
        );
    }
    assert!(
        content.enemy.attack_every != Some(0),
        "enemy '{}' attack_every must be positive",
        content.enemy.name,
    );
}

/// Checks listener definitions against the roster, panicking on any mismatch.
pub fn validate_listeners(defs: &[ListenerDef], content: &BattleContent) {
    let char_ids: HashSet<CharacterId> = content.characters.iter().map(|c| c.id).collect();
    let mut ids = HashSet::new();
    for def in defs {
        assert!(
            def.id() != SIGNAL_LOG_ID && ids.insert(def.id()),
            "listener id '{}' is not unique",
            def.id(),
        );
        match def {
            ListenerDef::AnomalyRefund { target, .. } => assert!(
                char_ids.contains(target),
                "listener '{}' targets unknown character {target}",
                def.id(),
            ),
            ListenerDef::CoordinatedAttack {
                trigger, follow_up, ..
            } => {
                assert!(
                    char_ids.contains(trigger),
                    "listener '{}' triggers on unknown character {trigger}",
                    def.id(),
                );
                assert!(
                    skill_known(content, follow_up),
                    "listener '{}' follow-up '{follow_up}' is not a known skill",
                    def.id(),
                );
            }
            ListenerDef::SignalLog { .. } => {}
        }
    }
}

/// Checks every APL unit against the roster, panicking on any mismatch.
pub fn validate_priority_list(list: &PriorityList, content: &BattleContent) {
    let mut ids = HashSet::new();
    for unit in &list.units {
        assert!(
            ids.insert(&unit.id),
            "apl unit id '{}' appears more than once",
            unit.id,
        );
        assert!(
            skill_known(content, &unit.skill_tag),
            "apl unit '{}' skill '{}' is not a known skill",
            unit.id,
            unit.skill_tag,
        );
        assert!(
            unit.skill_tag.actor_id() == Some(unit.char_id),
            "apl unit '{}' skill '{}' does not belong to character {}",
            unit.id,
            unit.skill_tag,
            unit.char_id,
        );
    }
}

fn skill_known(content: &BattleContent, tag: &SkillTag) -> bool {
    content
        .characters
        .iter()
        .flat_map(|c| &c.skills)
        .any(|s| &s.tag == tag)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let name = path.display();
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {name}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {name}"))
}

/// Loads `roster.json`, `constants.json` and the optional `enemy.json`.
pub fn load_content(content_dir: &str) -> Result<BattleContent> {
    let dir = Path::new(content_dir);
    let roster: RosterFile = read_json(&dir.join("roster.json"))?;
    let constants: Constants = read_json(&dir.join("constants.json"))?;
    let enemy_path = dir.join("enemy.json");
    let enemy: EnemyDef = if enemy_path.exists() {
        read_json(&enemy_path)?
    } else {
        EnemyDef::default()
    };
    let content = BattleContent {
        content_version: roster.content_version,
        characters: roster.characters,
        enemy,
        constants,
    };
    validate_content(&content);
    info!(
        content_version = %content.content_version,
        characters = content.characters.len(),
        "content loaded"
    );
    Ok(content)
}

/// Loads `listeners.json` from the content directory; absent means none.
pub fn load_listeners(content_dir: &str, content: &BattleContent) -> Result<Vec<ListenerDef>> {
    let path = Path::new(content_dir).join("listeners.json");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let defs: Vec<ListenerDef> = read_json(&path)?;
    validate_listeners(&defs, content);
    Ok(defs)
}

pub fn load_priority_list(path: &str, content: &BattleContent) -> Result<PriorityList> {
    let list: PriorityList = read_json(Path::new(path))?;
    validate_priority_list(&list, content);
    Ok(list)
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Seats the roster, registers a signal log followed by `listeners` in
/// order, and hands the priority list to the preload stage.
pub fn build_battle(
    content: &BattleContent,
    listeners: &[ListenerDef],
    apl: PriorityList,
) -> Battle {
    let mut world = BattleWorld::new(content);
    world.listeners.register(SignalLog::new(SIGNAL_LOG_ID));
    for def in listeners {
        match def {
            ListenerDef::AnomalyRefund {
                id,
                target,
                resource,
                element,
                recover_value,
                cooldown_ticks,
            } => {
                let mut listener = AnomalyRefundListener::new(
                    id.clone(),
                    *target,
                    *resource,
                    recover_value.unwrap_or(content.constants.anomaly_refund_value),
                    cooldown_ticks.unwrap_or(content.constants.anomaly_refund_cooldown_ticks),
                );
                if let Some(element) = element {
                    listener = listener.with_element(*element);
                }
                world.listeners.register(listener);
            }
            ListenerDef::CoordinatedAttack {
                id,
                trigger,
                follow_up,
                priority,
                cooldown_ticks,
            } => world.listeners.register(CoordinatedAttackListener::new(
                id.clone(),
                *trigger,
                follow_up.clone(),
                *priority,
                *cooldown_ticks,
            )),
            ListenerDef::SignalLog { id } => world.listeners.register(SignalLog::new(id.clone())),
        }
    }
    Battle::new(world, Box::new(apl))
}
