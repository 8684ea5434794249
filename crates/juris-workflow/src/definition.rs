//! # Workflow Definitions
//!
//! Immutable templates pairing one [`Trigger`] with an ordered action list.
//! Definitions come from the built-in catalog or from JSON/YAML documents
//! and are validated before they can be activated.

use juris_core::TemplateId;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::ValidationError;
use crate::trigger::Trigger;

/// A named rule: one trigger, ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Stable template identifier.
    pub id: TemplateId,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// When the workflow fires.
    pub trigger: Trigger,
    /// What it does, in execution order.
    pub actions: Vec<Action>,
}

impl WorkflowDefinition {
    /// A definition with no description and no actions yet.
    pub fn new(id: TemplateId, name: impl Into<String>, trigger: Trigger) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            trigger,
            actions: Vec::new(),
        }
    }

    /// Set the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an action.
    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Parse a JSON document. The result is validated.
    pub fn from_json(input: &str) -> Result<Self, ValidationError> {
        let definition: Self =
            serde_json::from_str(input).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Parse a YAML document. The result is validated.
    pub fn from_yaml(input: &str) -> Result<Self, ValidationError> {
        let definition: Self =
            serde_yaml::from_str(input).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check structural rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "name".to_string(),
            });
        }
        for (i, condition) in self.trigger.conditions.iter().enumerate() {
            if condition.field.trim().is_empty() {
                return Err(ValidationError::EmptyField {
                    field: format!("trigger.conditions[{i}].field"),
                });
            }
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions {
                workflow: self.id.to_string(),
            });
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }
}
