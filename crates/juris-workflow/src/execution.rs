//! # Execution Result Aggregation
//!
//! [`run`] evaluates one workflow instance against one event and folds the
//! per-action outcomes into an [`ExecutionResult`].
//!
//! The instance's execution count advances exactly once per matched event,
//! whatever the actions do afterwards. A condition that cannot be evaluated
//! counts as a non-match and is reported on the result instead of aborting
//! the caller's batch.

use juris_core::{InstanceId, TemplateId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::condition::ConditionEvaluationError;
use crate::dispatch::{ActionDispatcher, ActionResult};
use crate::registry::WorkflowInstance;
use crate::trigger::DomainEvent;

/// Record of one instance's response to one event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Instance that was evaluated.
    pub workflow_id: InstanceId,
    /// Template the instance was activated from.
    pub template_id: TemplateId,
    /// Whether the trigger matched.
    pub matched: bool,
    /// Matched and every action succeeded.
    pub success: bool,
    /// Per-action outcomes in declared order. Empty unless matched.
    pub results: Vec<ActionResult>,
    /// Set when the trigger's conditions could not be evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_error: Option<ConditionEvaluationError>,
    /// When evaluation finished.
    pub executed_at: Timestamp,
}

impl ExecutionResult {
    fn unmatched(instance: &WorkflowInstance, condition_error: Option<ConditionEvaluationError>) -> Self {
        Self {
            workflow_id: instance.id(),
            template_id: instance.template_id().clone(),
            matched: false,
            success: false,
            results: Vec::new(),
            condition_error,
            executed_at: Timestamp::now(),
        }
    }

    /// Results of the actions that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Evaluate `instance` against `event` and, on a match, dispatch its actions.
pub async fn run(
    instance: &mut WorkflowInstance,
    event: &DomainEvent,
    dispatcher: &ActionDispatcher,
) -> ExecutionResult {
    match instance.definition().trigger.matches(event) {
        Ok(true) => {}
        Ok(false) => return ExecutionResult::unmatched(instance, None),
        Err(e) => {
            tracing::warn!(
                workflow_id = %instance.id(),
                template_id = %instance.template_id(),
                error = %e,
                "condition evaluation failed"
            );
            return ExecutionResult::unmatched(instance, Some(e));
        }
    }

    let results = dispatcher.dispatch(&instance.definition().actions, event).await;
    instance.record_execution();
    let success = results.iter().all(|r| r.success);
    tracing::info!(
        workflow_id = %instance.id(),
        template_id = %instance.template_id(),
        actions = results.len(),
        success,
        execution_count = instance.execution_count(),
        "workflow executed"
    );
    ExecutionResult {
        workflow_id: instance.id(),
        template_id: instance.template_id().clone(),
        matched: true,
        success,
        results,
        condition_error: None,
        executed_at: Timestamp::now(),
    }
}
