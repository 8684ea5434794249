//! # Identifier Newtypes
//!
//! Type-level distinction between the two identifier namespaces of the
//! workflow engine: catalog templates and activated instances. A template can
//! be activated more than once, so the two must never be confused.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::JurisError;

/// Maximum length of a template identifier.
const TEMPLATE_ID_MAX_LEN: usize = 64;

/// Unique identifier of an activated workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Generate a new random instance identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "workflow:{}", self.0)
    }
}

/// Stable identifier of a workflow template, e.g. `prazo-7dias-alerta`.
///
/// Lowercase ASCII letters, digits, `-` and `_`; 1 to 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a validated template identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, JurisError> {
        let id = id.into();
        if id.is_empty() {
            return Err(JurisError::InvalidIdentifier(
                "template id must not be empty".to_string(),
            ));
        }
        if id.len() > TEMPLATE_ID_MAX_LEN {
            return Err(JurisError::InvalidIdentifier(format!(
                "template id exceeds {TEMPLATE_ID_MAX_LEN} characters: {id:?}"
            )));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '_'))
        {
            return Err(JurisError::InvalidIdentifier(format!(
                "template id {id:?} contains invalid character {c:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Access the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TemplateId {
    type Error = JurisError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TemplateId> for String {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
