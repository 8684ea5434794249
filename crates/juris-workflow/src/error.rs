//! # Workflow Errors
//!
//! Errors that leave the engine through its public API. Per-action failures
//! are not here: they are contained in `ActionResult` (see `dispatch`) and
//! never abort a run. Condition failures are defined next to the evaluator.

use thiserror::Error;

use crate::condition::ConditionEvaluationError;

/// A workflow definition is malformed.
///
/// Raised while loading or activating a definition, before any instance
/// enters the registry, so no partially valid workflow is ever runnable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or blank.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Dotted path of the offending field, e.g. `trigger.conditions[0].field`.
        field: String,
    },

    /// The definition declares no actions.
    #[error("workflow {workflow} declares no actions")]
    NoActions {
        /// Template id of the offending definition.
        workflow: String,
    },

    /// The template id does not follow identifier rules.
    #[error("invalid template id: {0}")]
    InvalidTemplateId(String),

    /// The trigger type name is not one of the supported domain events.
    #[error("unknown trigger type {0:?}")]
    UnknownTriggerType(String),

    /// The condition operator is not supported.
    #[error("unknown condition operator {0:?}")]
    UnknownOperator(String),

    /// An action declares an empty type name.
    #[error("action type must not be empty")]
    EmptyActionType,

    /// A required action parameter is missing or blank.
    #[error("action {action_type}: parameter {parameter:?} is missing or empty")]
    MissingParameter {
        /// Wire name of the action type.
        action_type: String,
        /// Wire name of the parameter.
        parameter: String,
    },

    /// Action parameters do not match the payload shape of the action type.
    #[error("action {action_type}: invalid parameters: {reason}")]
    InvalidParameters {
        /// Wire name of the action type.
        action_type: String,
        /// Decoder message.
        reason: String,
    },

    /// Two catalog templates share an id.
    #[error("duplicate template id {0}")]
    DuplicateTemplate(String),

    /// The document could not be parsed at all.
    #[error("malformed workflow definition: {0}")]
    Malformed(String),
}

/// Top-level error type of the workflow engine.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// A registry operation referenced an unknown instance or template id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A definition failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A condition compared incompatible types. Returned by
    /// [`WorkflowRegistry::check_trigger`](crate::registry::WorkflowRegistry::check_trigger);
    /// `handle` reports it on `ExecutionResult::condition_error` instead.
    #[error(transparent)]
    ConditionEvaluation(#[from] ConditionEvaluationError),
}
