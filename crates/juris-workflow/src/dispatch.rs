//! # Action Dispatcher
//!
//! Executes a matched workflow's actions strictly in declared order, one at
//! a time. Each action resolves to a handler by its [`ActionType`]; a
//! missing handler, a handler error, or a timeout is recorded in that
//! action's [`ActionResult`] and the chain continues with the next action.
//! A handler that panics is reported as an execution failure.
//! Nothing escapes [`ActionDispatcher::dispatch`] as an error.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::{Action, ActionType};
use crate::handler::HandlerRegistry;
use crate::trigger::DomainEvent;

/// Coarse classification of an action failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No handler is registered for the action type.
    #[serde(rename = "UnknownActionTypeError")]
    UnknownActionType,
    /// The handler failed or timed out.
    #[serde(rename = "ActionExecutionError")]
    ActionExecution,
}

impl ErrorKind {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownActionType => "UnknownActionTypeError",
            Self::ActionExecution => "ActionExecutionError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single action failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionError {
    /// No handler is registered for the action type.
    #[error("no handler registered for action type {action_type}")]
    UnknownActionType {
        /// Wire name of the action type.
        action_type: String,
    },

    /// The handler returned an error.
    #[error("action {action_type} failed: {message}")]
    Execution {
        /// Wire name of the action type.
        action_type: String,
        /// Handler error message.
        message: String,
    },

    /// The handler did not finish within its time budget.
    #[error("action {action_type} timed out after {timeout_ms}ms")]
    Timeout {
        /// Wire name of the action type.
        action_type: String,
        /// Budget that was exceeded.
        timeout_ms: u64,
    },
}

impl ActionError {
    /// Classification for callers that only distinguish the two kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownActionType { .. } => ErrorKind::UnknownActionType,
            Self::Execution { .. } | Self::Timeout { .. } => ErrorKind::ActionExecution,
        }
    }

    /// Whether the handler timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Outcome of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Type of the action, in wire form.
    pub action_type: ActionType,
    /// Whether the handler completed successfully.
    pub success: bool,
    /// Failure detail when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionResult {
    fn ok(action_type: ActionType) -> Self {
        Self {
            action_type,
            success: true,
            error: None,
        }
    }

    fn failed(action_type: ActionType, error: ActionError) -> Self {
        Self {
            action_type,
            success: false,
            error: Some(error),
        }
    }

    /// Failure classification, if the action failed.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ActionError::kind)
    }
}

/// Runs action lists against a [`HandlerRegistry`].
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    handlers: HandlerRegistry,
    timeout: Duration,
}

impl ActionDispatcher {
    /// A dispatcher bounding every handler call by `timeout`.
    pub fn new(handlers: HandlerRegistry, timeout: Duration) -> Self {
        Self { handlers, timeout }
    }

    /// Per-call time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The handlers this dispatcher resolves against.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Execute `actions` in order. Returns one result per action, in the
    /// same order.
    pub async fn dispatch(&self, actions: &[Action], event: &DomainEvent) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(actions.len());
        for action in actions {
            results.push(self.dispatch_one(action, event).await);
        }
        results
    }

    async fn dispatch_one(&self, action: &Action, event: &DomainEvent) -> ActionResult {
        let action_type = action.action_type();
        let Some(handler) = self.handlers.get(&action_type) else {
            tracing::warn!(action_type = %action_type, "no handler registered");
            let error = ActionError::UnknownActionType {
                action_type: action_type.to_string(),
            };
            return ActionResult::failed(action_type, error);
        };

        let call = AssertUnwindSafe(handler.handle(action, event)).catch_unwind();
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(()))) => {
                tracing::debug!(action_type = %action_type, "action succeeded");
                ActionResult::ok(action_type)
            }
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(action_type = %action_type, panic = %message, "action handler panicked");
                let error = ActionError::Execution {
                    action_type: action_type.to_string(),
                    message: format!("handler panicked: {message}"),
                };
                ActionResult::failed(action_type, error)
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!(action_type = %action_type, error = %e, "action failed");
                let error = ActionError::Execution {
                    action_type: action_type.to_string(),
                    message: e.to_string(),
                };
                ActionResult::failed(action_type, error)
            }
            Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(action_type = %action_type, timeout_ms, "action timed out");
                let error = ActionError::Timeout {
                    action_type: action_type.to_string(),
                    timeout_ms,
                };
                ActionResult::failed(action_type, error)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
