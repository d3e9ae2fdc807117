//! Type definitions for `zsim_core`.
//!
//! ID newtypes, content definitions and the tunable constants shared by the
//! preload pipeline and its collaborators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(SkillTag);
string_id!(AplUnitId);

/// Stable numeric id of a roster member. Skill tags encode it as their prefix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl SkillTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Character id encoded before the first `_`, e.g. `7` for `"7_basic"`.
    pub fn actor_id(&self) -> Option<CharacterId> {
        let (prefix, _) = self.0.trim().split_once('_')?;
        prefix.parse().ok().map(CharacterId)
    }

    pub fn is_dodge(&self) -> bool {
        self.0.contains("dodge")
    }
}

impl From<&str> for SkillTag {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

pub type Labels = SmallVec<[String; 2]>;

/// Well-known skill labels the scheduler reacts to.
pub mod labels {
    /// Rides alongside the actor's current action instead of displacing it.
    pub const ADDITIONAL_DAMAGE: &str = "additional_damage";
    pub const DODGE: &str = "dodge";
    pub const PARRY: &str = "parry";
    pub const ASSIST_FOLLOW_UP: &str = "assist_follow_up";
    pub const QUICK_ASSIST: &str = "quick_assist";
    pub const TRIGGER_QUICK_ASSIST: &str = "trigger_quick_assist";
}

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Energy,
    Decibel,
    Adrenaline,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Physical,
    Fire,
    Ice,
    Electric,
    Ether,
    AuricInk,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleContent {
    pub content_version: String,
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub enemy: EnemyDef,
    pub constants: Constants,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: CharacterId,
    pub name: String,
    pub skills: Vec<SkillDef>,
    /// Starting resource levels.
    #[serde(default)]
    pub resources: BTreeMap<ResourceKind, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDef {
    pub tag: SkillTag,
    pub name: String,
    /// Full action length in ticks.
    pub ticks: u64,
    /// Offset from the start after which another character may swap in.
    pub swap_cancel_ticks: u64,
    #[serde(default)]
    pub labels: Labels,
    /// Highest-priority skill: cannot be displaced except by a dodge.
    #[serde(default)]
    pub do_immediately: bool,
    #[serde(default)]
    pub resource_deltas: Vec<ResourceDelta>,
    /// Element of the anomaly this skill builds up when it lands, if any.
    #[serde(default)]
    pub anomaly: Option<ElementType>,
}

impl SkillDef {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceDelta {
    pub resource: ResourceKind,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDef {
    pub name: String,
    /// Landed hits before the stun check flips the enemy into stun.
    pub stun_threshold: u32,
    pub stun_duration_ticks: u64,
    /// Declare an attack every N ticks. `None` disables attacks.
    #[serde(default)]
    pub attack_every: Option<u64>,
    /// Ticks between an attack's declaration and its hit.
    #[serde(default)]
    pub attack_windup: u64,
}

impl Default for EnemyDef {
    fn default() -> Self {
        Self {
            name: "Training Dummy".to_string(),
            stun_threshold: 20,
            stun_duration_ticks: 600,
            attack_every: None,
            attack_windup: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// How long a quick assist stays armed after being triggered.
    pub quick_assist_window_ticks: u64,
    /// How long after a parry the assist follow-up may replace the APL pick.
    pub parry_aid_window_ticks: u64,
    pub anomaly_refund_cooldown_ticks: u64,
    pub anomaly_refund_value: f64,
    /// Inclusive-exclusive tick range in which APL decisions are traced.
    #[serde(default)]
    pub apl_trace_window: Option<(u64, u64)>,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            quick_assist_window_ticks: 180,
            parry_aid_window_ticks: 60,
            anomaly_refund_cooldown_ticks: 600,
            anomaly_refund_value: 10.0,
            apl_trace_window: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_id_parses_prefix() {
        assert_eq!(SkillTag::from("7_basic").actor_id(), Some(CharacterId(7)));
        assert_eq!(
            SkillTag::from(" 1371_dodge_back ").actor_id(),
            Some(CharacterId(1371))
        );
    }

    #[test]
    fn test_actor_id_rejects_malformed_tags() {
        assert_eq!(SkillTag::from("wait").actor_id(), None);
        assert_eq!(SkillTag::from("anby_basic").actor_id(), None);
    }

    #[test]
    fn test_constants_roundtrip_defaults_missing_window() {
        let json = r#"{
            "quick_assist_window_ticks": 180,
            "parry_aid_window_ticks": 60,
            "anomaly_refund_cooldown_ticks": 600,
            "anomaly_refund_value": 10.0
        }"#;
        let constants: Constants = serde_json::from_str(json).unwrap();
        assert_eq!(constants.apl_trace_window, None);
        assert_eq!(constants.quick_assist_window_ticks, 180);
    }
}
