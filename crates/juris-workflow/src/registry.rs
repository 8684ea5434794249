//! # Workflow Registry
//!
//! Owns the live set of activated [`WorkflowInstance`]s and feeds domain
//! events to them.
//!
//! ## Lifecycle
//!
//! ```text
//! activate ──▶ Active ⇄ Inactive ──remove──▶ (gone)
//! ```
//!
//! Instances are copies of their template. Removal is terminal: the same
//! template can be activated again, but that yields a new instance with a
//! new id and a zero count.
//!
//! ## Ordering
//!
//! Instances are kept in activation order and [`WorkflowRegistry::handle`]
//! visits the active ones sequentially in that order. The registry holds no
//! locks; callers serialize events per entity before calling `handle`.

use juris_core::{InstanceId, TemplateId, Timestamp};
use serde::Serialize;
use serde_json::json;

use crate::audit::{AuditEntryType, AuditTrail};
use crate::catalog::TemplateCatalog;
use crate::config::EngineConfig;
use crate::definition::WorkflowDefinition;
use crate::dispatch::ActionDispatcher;
use crate::error::WorkflowError;
use crate::execution::{self, ExecutionResult};
use crate::handler::HandlerRegistry;
use crate::trigger::DomainEvent;

/// An activated copy of a [`WorkflowDefinition`] with runtime state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInstance {
    id: InstanceId,
    definition: WorkflowDefinition,
    active: bool,
    execution_count: u64,
    created_at: Timestamp,
}

impl WorkflowInstance {
    /// Fresh active instance with a zero count.
    pub(crate) fn activate(definition: WorkflowDefinition) -> Self {
        Self {
            id: InstanceId::new(),
            definition,
            active: true,
            execution_count: 0,
            created_at: Timestamp::now(),
        }
    }

    pub(crate) fn record_execution(&mut self) {
        self.execution_count = self.execution_count.saturating_add(1);
    }

    /// Instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Template this instance was copied from.
    pub fn template_id(&self) -> &TemplateId {
        &self.definition.id
    }

    /// The copied definition.
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Whether events reach this instance.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of events this instance matched.
    pub fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Activation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// The live collection of workflow instances.
pub struct WorkflowRegistry {
    instances: Vec<WorkflowInstance>,
    dispatcher: ActionDispatcher,
    /// Record of every mutation and handled event.
    pub audit_trail: AuditTrail,
}

impl WorkflowRegistry {
    /// An empty registry dispatching to `handlers`.
    pub fn new(handlers: HandlerRegistry, config: &EngineConfig) -> Self {
        Self {
            instances: Vec::new(),
            dispatcher: ActionDispatcher::new(handlers, config.action_timeout),
            audit_trail: AuditTrail::new(config.audit_capacity),
        }
    }

    /// Validate `template` and add an active copy of it.
    pub fn activate(&mut self, template: &WorkflowDefinition) -> Result<WorkflowInstance, WorkflowError> {
        template.validate()?;
        let instance = WorkflowInstance::activate(template.clone());
        tracing::info!(
            workflow_id = %instance.id,
            template_id = %instance.template_id(),
            "workflow activated"
        );
        self.audit_trail.record(
            AuditEntryType::WorkflowActivated,
            None,
            json!({
                "workflow_id": instance.id,
                "template_id": instance.template_id(),
            }),
        );
        self.instances.push(instance.clone());
        Ok(instance)
    }

    /// Activate the catalog template `template_id`.
    pub fn activate_template(
        &mut self,
        catalog: &TemplateCatalog,
        template_id: &str,
    ) -> Result<WorkflowInstance, WorkflowError> {
        let template = catalog
            .get(template_id)
            .ok_or_else(|| WorkflowError::NotFound(format!("template {template_id}")))?;
        self.activate(template)
    }

    /// Flip an instance between active and inactive.
    pub fn toggle(&mut self, id: InstanceId) -> Result<WorkflowInstance, WorkflowError> {
        let instance = self
            .instances
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        instance.active = !instance.active;
        let snapshot = instance.clone();
        tracing::info!(workflow_id = %id, active = snapshot.active, "workflow toggled");
        self.audit_trail.record(
            AuditEntryType::WorkflowToggled,
            None,
            json!({"workflow_id": id, "active": snapshot.active}),
        );
        Ok(snapshot)
    }

    /// Delete an instance permanently.
    pub fn remove(&mut self, id: InstanceId) -> Result<(), WorkflowError> {
        let position = self
            .instances
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        let removed = self.instances.remove(position);
        tracing::info!(workflow_id = %id, template_id = %removed.template_id(), "workflow removed");
        self.audit_trail.record(
            AuditEntryType::WorkflowRemoved,
            None,
            json!({
                "workflow_id": id,
                "template_id": removed.template_id(),
                "execution_count": removed.execution_count,
            }),
        );
        Ok(())
    }

    /// Snapshot of one instance.
    pub fn get(&self, id: InstanceId) -> Option<WorkflowInstance> {
        self.instances.iter().find(|i| i.id == id).cloned()
    }

    /// Snapshot of every instance, in activation order.
    pub fn instances(&self) -> Vec<WorkflowInstance> {
        self.instances.clone()
    }

    /// Snapshot of the active instances, in activation order.
    pub fn active_instances(&self) -> Vec<WorkflowInstance> {
        self.instances.iter().filter(|i| i.active).cloned().collect()
    }

    /// Number of instances, active or not.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the registry holds no instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Whether instance `id`'s trigger would fire for `event`, without
    /// dispatching anything or touching its count. Ignores the active flag.
    pub fn check_trigger(&self, id: InstanceId, event: &DomainEvent) -> Result<bool, WorkflowError> {
        let instance = self
            .instances
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| WorkflowError::NotFound(id.to_string()))?;
        Ok(instance.definition.trigger.matches(event)?)
    }

    /// Feed `event` to every active instance in order.
    ///
    /// Returns one result per active instance, including non-matches.
    /// Inactive instances produce no entry.
    pub async fn handle(&mut self, event: &DomainEvent) -> Vec<ExecutionResult> {
        let entity_id = event.entity_id();
        tracing::debug!(
            event_type = %event.event_type,
            entity_id = entity_id.as_deref().unwrap_or("-"),
            "handling event"
        );
        self.audit_trail.record(
            AuditEntryType::EventReceived,
            entity_id.clone(),
            json!({
                "event_type": event.event_type,
                "occurred_at": event.occurred_at,
            }),
        );

        let mut results = Vec::new();
        for instance in self.instances.iter_mut().filter(|i| i.active) {
            let result = execution::run(instance, event, &self.dispatcher).await;
            audit_result(&mut self.audit_trail, entity_id.as_deref(), &result);
            results.push(result);
        }
        results
    }
}

fn audit_result(trail: &mut AuditTrail, entity_id: Option<&str>, result: &ExecutionResult) {
    trail.record(
        AuditEntryType::WorkflowEvaluated,
        entity_id.map(str::to_string),
        json!({
            "workflow_id": result.workflow_id,
            "template_id": result.template_id,
            "matched": result.matched,
            "success": result.success,
        }),
    );
    if let Some(error) = &result.condition_error {
        trail.record(
            AuditEntryType::ConditionFailed,
            entity_id.map(str::to_string),
            json!({
                "workflow_id": result.workflow_id,
                "condition_index": error.index,
                "field": error.field,
                "reason": error.reason,
            }),
        );
    }
    for action in &result.results {
        let entry_type = if action.success {
            AuditEntryType::ActionExecuted
        } else {
            AuditEntryType::ActionFailed
        };
        trail.record(
            entry_type,
            entity_id.map(str::to_string),
            json!({
                "workflow_id": result.workflow_id,
                "action_type": action.action_type,
                "error": action.error,
            }),
        );
    }
}

impl std::fmt::Debug for WorkflowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowRegistry")
            .field("instances", &self.instances.len())
            .field("active", &self.instances.iter().filter(|i| i.active).count())
            .field("dispatcher", &self.dispatcher)
            .field("audit_trail", &self.audit_trail)
            .finish()
    }
}
