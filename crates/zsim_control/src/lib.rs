use serde::{Deserialize, Serialize};
use zsim_core::apl::{AplDecision, AplEvaluator, AplView};
use zsim_core::{AplUnitId, CharacterId, ResourceKind, SkillTag};

/// Ordered list of APL units. The first unit whose conditions all hold
/// decides the tick; when none matches the team waits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriorityList {
    pub units: Vec<AplUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AplUnit {
    pub id: AplUnitId,
    pub char_id: CharacterId,
    pub skill_tag: SkillTag,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub conditions: Vec<AplCondition>,
}

/// One check against the current battle view.
///
/// Conditions that take an optional `char_id` default to the unit's own
/// character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AplCondition {
    TickAtLeast {
        tick: u64,
    },
    ResourceAtLeast {
        #[serde(default)]
        char_id: Option<CharacterId>,
        resource: ResourceKind,
        value: f64,
    },
    ResourceBelow {
        #[serde(default)]
        char_id: Option<CharacterId>,
        resource: ResourceKind,
        value: f64,
    },
    Occupied {
        #[serde(default)]
        char_id: Option<CharacterId>,
    },
    Free {
        #[serde(default)]
        char_id: Option<CharacterId>,
    },
    OperatingNow {
        #[serde(default)]
        char_id: Option<CharacterId>,
    },
    NotOperatingNow {
        #[serde(default)]
        char_id: Option<CharacterId>,
    },
    /// Newest node on the character's personal stack carries this tag.
    LastSkillIs {
        #[serde(default)]
        char_id: Option<CharacterId>,
        skill_tag: SkillTag,
    },
    QuickAssistReady,
    EnemyStunned {
        #[serde(default = "default_true")]
        stunned: bool,
    },
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Condition evaluation
// ---------------------------------------------------------------------------

impl AplCondition {
    /// Whether the condition holds for `unit` in `view`.
    pub fn holds(&self, unit: &AplUnit, view: &AplView<'_>) -> bool {
        let who = |char_id: &Option<CharacterId>| char_id.unwrap_or(unit.char_id);
        match self {
            Self::TickAtLeast { tick } => view.tick >= *tick,
            Self::ResourceAtLeast {
                char_id,
                resource,
                value,
            } => resource_level(view, who(char_id), *resource).is_some_and(|v| v >= *value),
            Self::ResourceBelow {
                char_id,
                resource,
                value,
            } => resource_level(view, who(char_id), *resource).is_some_and(|v| v < *value),
            Self::Occupied { char_id } => view.data.is_occupied(who(char_id), view.tick),
            Self::Free { char_id } => !view.data.is_occupied(who(char_id), view.tick),
            Self::OperatingNow { char_id } => view.data.operating_now() == Some(who(char_id)),
            Self::NotOperatingNow { char_id } => view.data.operating_now() != Some(who(char_id)),
            Self::LastSkillIs { char_id, skill_tag } => view
                .data
                .personal_stack(who(char_id))
                .and_then(|stack| stack.peek())
                .is_some_and(|node| node.skill_tag() == skill_tag),
            Self::QuickAssistReady => view
                .data
                .quick_assist()
                .is_some_and(|qa| qa.is_ready(unit.char_id, view.tick)),
            Self::EnemyStunned { stunned } => view.enemy.is_stunned() == *stunned,
        }
    }
}

fn resource_level(view: &AplView<'_>, char_id: CharacterId, kind: ResourceKind) -> Option<f64> {
    view.roster.get(char_id).map(|c| c.resource(kind))
}

// ---------------------------------------------------------------------------
// PriorityList
// ---------------------------------------------------------------------------

impl PriorityList {
    pub fn new(units: Vec<AplUnit>) -> Self {
        Self { units }
    }

    /// First unit whose conditions all hold, in list order.
    pub fn first_match(&self, view: &AplView<'_>) -> Option<&AplUnit> {
        self.units
            .iter()
            .find(|unit| unit.conditions.iter().all(|c| c.holds(unit, view)))
    }
}

impl AplEvaluator for PriorityList {
    fn evaluate(&mut self, view: &AplView<'_>) -> AplDecision {
        match self.first_match(view) {
            Some(unit) => AplDecision::Act {
                skill_tag: unit.skill_tag.clone(),
                priority: unit.priority,
                unit: unit.id.clone(),
            },
            None => AplDecision::Wait,
        }
    }
}
