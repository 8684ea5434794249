#![deny(missing_docs)]

//! # juris-workflow — Workflow Automation Engine
//!
//! Reacts to domain events of a legal-practice application (process
//! created, status changed, deadline or hearing approaching, comment added)
//! by running declarative trigger → condition → action rules.
//!
//! ## Pipeline
//!
//! 1. [`WorkflowRegistry::handle`] receives a [`DomainEvent`] and visits
//!    every active [`WorkflowInstance`] in activation order.
//! 2. [`Trigger::matches`] checks the event type, then evaluates the flat
//!    AND of [`Condition`]s against the event's entity and context.
//! 3. On a match, [`ActionDispatcher`] runs the instance's [`Action`]s
//!    strictly in order. Each action's failure stays inside its
//!    [`ActionResult`].
//! 4. [`execution::run`] folds the outcomes into an [`ExecutionResult`] and
//!    advances the instance's execution count.
//!
//! Side effects are performed by host-supplied [`ActionHandler`]s. Every
//! registry mutation and handled event is recorded in an [`AuditTrail`].

pub mod action;
pub mod audit;
pub mod catalog;
pub mod condition;
pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod handler;
pub mod registry;
pub mod trigger;

// Re-export primary types.
pub use action::{Action, ActionType, AlertPriority};
pub use audit::{AuditEntry, AuditEntryType, AuditTrail};
pub use catalog::TemplateCatalog;
pub use condition::{Condition, ConditionEvaluationError, ConditionOperator};
pub use config::{ConfigError, EngineConfig};
pub use definition::WorkflowDefinition;
pub use dispatch::{ActionDispatcher, ActionError, ActionResult, ErrorKind};
pub use error::{ValidationError, WorkflowError};
pub use execution::ExecutionResult;
pub use handler::{ActionHandler, FnHandler, HandlerError, HandlerRegistry, TracingHandler};
pub use registry::{WorkflowInstance, WorkflowRegistry};
pub use trigger::{DomainEvent, Trigger, TriggerType};
