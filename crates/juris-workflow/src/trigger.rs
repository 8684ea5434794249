//! # Triggers and Domain Events
//!
//! A [`Trigger`] pairs a [`TriggerType`] with a condition list. Matching
//! checks the event type first and only then evaluates conditions, so an
//! event of an unrelated type can never raise a condition error.
//!
//! Conditions see the event's `entity` merged with its `context`. On a key
//! collision the entity value wins.

use std::str::FromStr;

use juris_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition::{self, lookup, Condition, ConditionEvaluationError, Snapshot};
use crate::error::ValidationError;

/// Domain event types a workflow can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerType {
    /// A legal process was created.
    #[serde(rename = "processo_criado")]
    ProcessCreated,
    /// A process changed status.
    #[serde(rename = "status_alterado")]
    StatusChanged,
    /// A deadline is approaching.
    #[serde(rename = "prazo_proximo")]
    DeadlineApproaching,
    /// A hearing is approaching.
    #[serde(rename = "audiencia_proxima")]
    HearingApproaching,
    /// A comment was added to a process.
    #[serde(rename = "comentario_adicionado")]
    CommentAdded,
}

impl TriggerType {
    /// All trigger types.
    pub const ALL: [TriggerType; 5] = [
        Self::ProcessCreated,
        Self::StatusChanged,
        Self::DeadlineApproaching,
        Self::HearingApproaching,
        Self::CommentAdded,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessCreated => "processo_criado",
            Self::StatusChanged => "status_alterado",
            Self::DeadlineApproaching => "prazo_proximo",
            Self::HearingApproaching => "audiencia_proxima",
            Self::CommentAdded => "comentario_adicionado",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownTriggerType(s.to_string()))
    }
}

impl FromStr for TriggerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event type plus the conditions that must hold for a workflow to fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// Event type this trigger listens for.
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Flat AND of conditions. Empty means "always, when the type matches".
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Trigger {
    /// A trigger with no conditions.
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            conditions: Vec::new(),
        }
    }

    /// Append a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Whether `event` fires this trigger.
    ///
    /// Returns `Ok(false)` without evaluating conditions when the event type
    /// differs.
    pub fn matches(&self, event: &DomainEvent) -> Result<bool, ConditionEvaluationError> {
        if self.trigger_type != event.event_type {
            return Ok(false);
        }
        condition::evaluate(&self.conditions, &event.snapshot())
    }
}

/// Notification that something happened to an entity.
///
/// Immutable once handed to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: TriggerType,
    /// Snapshot of the subject record's fields at event time.
    #[serde(default)]
    pub entity: Map<String, Value>,
    /// Auxiliary values, e.g. the current user or computed days remaining.
    #[serde(default)]
    pub context: Map<String, Value>,
    /// When the event happened.
    #[serde(default = "Timestamp::now")]
    pub occurred_at: Timestamp,
}

impl DomainEvent {
    /// An event with empty entity and context, occurring now.
    pub fn new(event_type: TriggerType) -> Self {
        Self {
            event_type,
            entity: Map::new(),
            context: Map::new(),
            occurred_at: Timestamp::now(),
        }
    }

    /// Set the entity snapshot. Non-object values are ignored.
    pub fn with_entity(mut self, entity: Value) -> Self {
        match entity {
            Value::Object(map) => self.entity = map,
            other => tracing::warn!(value = %other, "ignoring non-object entity snapshot"),
        }
        self
    }

    /// Set the context map. Non-object values are ignored.
    pub fn with_context(mut self, context: Value) -> Self {
        match context {
            Value::Object(map) => self.context = map,
            other => tracing::warn!(value = %other, "ignoring non-object event context"),
        }
        self
    }

    /// Override the event time.
    pub fn at(mut self, occurred_at: Timestamp) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    /// `entity.id` rendered as a string, if present and not null.
    pub fn entity_id(&self) -> Option<String> {
        match self.entity.get("id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// The merged view conditions are evaluated against.
    pub fn snapshot(&self) -> EventSnapshot<'_> {
        EventSnapshot {
            entity: &self.entity,
            context: &self.context,
        }
    }
}

/// Borrowed view of an event's entity over its context.
#[derive(Debug, Clone, Copy)]
pub struct EventSnapshot<'a> {
    entity: &'a Map<String, Value>,
    context: &'a Map<String, Value>,
}

impl Snapshot for EventSnapshot<'_> {
    fn field(&self, name: &str) -> Option<&Value> {
        lookup(self.entity, name).or_else(|| lookup(self.context, name))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn trigger_type() -> impl Strategy<Value = TriggerType> {
        prop::sample::select(TriggerType::ALL.to_vec())
    }

    fn object() -> impl Strategy<Value = Map<String, Value>> {
        prop::collection::btree_map(
            "[a-z_]{1,10}",
            prop_oneof![
                any::<i64>().prop_map(Value::from),
                ".{0,12}".prop_map(Value::from),
                any::<bool>().prop_map(Value::from),
                Just(Value::Null),
            ],
            0..6,
        )
        .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        /// A condition-free trigger matches every event of its type and only
        /// those.
        #[test]
        fn empty_conditions_match_on_type_alone(
            trigger_type in trigger_type(),
            event_type in trigger_type(),
            entity in object(),
            context in object(),
        ) {
            let trigger = Trigger::new(trigger_type);
            let event = DomainEvent {
                event_type,
                entity,
                context,
                occurred_at: Timestamp::now(),
            };
            prop_assert_eq!(trigger.matches(&event), Ok(trigger_type == event_type));
        }

        /// Adding a failing clause anywhere turns a match into a non-match.
        #[test]
        fn any_false_condition_prevents_match(
            position in 0usize..4,
            entity in object(),
        ) {
            let mut conditions: Vec<Condition> = entity
                .iter()
                .take(3)
                .map(|(k, v)| Condition::new(k.clone(), crate::condition::ConditionOperator::Equal, v.clone()))
                .collect();
            let at = position.min(conditions.len());
            conditions.insert(
                at,
                Condition::new("0never", crate::condition::ConditionOperator::Equal, "x"),
            );
            let trigger = Trigger { trigger_type: TriggerType::StatusChanged, conditions };
            let event = DomainEvent {
                event_type: TriggerType::StatusChanged,
                entity,
                context: Map::new(),
                occurred_at: Timestamp::now(),
            };
            prop_assert_eq!(trigger.matches(&event), Ok(false));
        }
    }
}
