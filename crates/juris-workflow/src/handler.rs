//! # Action Handlers
//!
//! The host application performs side effects through [`ActionHandler`]
//! implementations registered per [`ActionType`] in a [`HandlerRegistry`].
//! The dispatcher only ever calls the trait; it never inspects which action
//! a handler is for.
//!
//! A registry may be partial. Actions whose type has no handler fail at
//! dispatch time and do not prevent the registry from being built.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::action::{Action, ActionType};
use crate::trigger::DomainEvent;

/// Failure reported by a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The collaborator behind the handler could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator refused the request.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The handler was given an action it does not perform.
    #[error("handler does not perform {0} actions")]
    UnexpectedAction(String),
}

/// Performs one kind of action.
///
/// Implementations must be `Send + Sync` so a registry can be shared.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Perform `action` on behalf of `event`.
    async fn handle(&self, action: &Action, event: &DomainEvent) -> Result<(), HandlerError>;
}

/// Map of action type to handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `action_type`, replacing any previous one.
    pub fn register(&mut self, action_type: ActionType, handler: Arc<dyn ActionHandler>) {
        if self.handlers.insert(action_type.clone(), handler).is_some() {
            tracing::debug!(action_type = %action_type, "replaced action handler");
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, action_type: ActionType, handler: Arc<dyn ActionHandler>) -> Self {
        self.register(action_type, handler);
        self
    }

    /// A registry with a [`TracingHandler`] for every known action type.
    pub fn tracing_only() -> Self {
        let handler: Arc<dyn ActionHandler> = Arc::new(TracingHandler);
        ActionType::KNOWN
            .into_iter()
            .fold(Self::new(), |registry, t| registry.with(t, Arc::clone(&handler)))
    }

    /// Handler for `action_type`, if any.
    pub fn get(&self, action_type: &ActionType) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(action_type).cloned()
    }

    /// Whether a handler is registered for `action_type`.
    pub fn contains(&self, action_type: &ActionType) -> bool {
        self.handlers.contains_key(action_type)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered action types, sorted.
    pub fn registered_types(&self) -> Vec<ActionType> {
        let mut types: Vec<_> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.registered_types())
            .finish()
    }
}

/// Logs the action and succeeds. Used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHandler;

#[async_trait]
impl ActionHandler for TracingHandler {
    async fn handle(&self, action: &Action, event: &DomainEvent) -> Result<(), HandlerError> {
        let action_type = action.action_type();
        tracing::info!(
            action_type = %action_type,
            capability = action_type.capability_name().unwrap_or("-"),
            event_type = %event.event_type,
            entity_id = event.entity_id().as_deref().unwrap_or("-"),
            parameters = %serde_json::Value::Object(action.parameters()),
            "dry-run action"
        );
        Ok(())
    }
}

/// Adapts an async closure into a handler.
///
/// ```ignore
/// let handler = FnHandler::new(|action, _event| async move {
///     println!("{action}");
///     Ok(())
/// });
/// ```
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(Action, DomainEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, action: &Action, event: &DomainEvent) -> Result<(), HandlerError> {
        (self.f)(action.clone(), event.clone()).await
    }
}
