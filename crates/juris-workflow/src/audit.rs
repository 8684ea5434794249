//! # Workflow Audit Trail
//!
//! Bounded in-memory record of what the engine did: events received,
//! workflows evaluated, actions executed or failed, and registry mutations.
//!
//! When the trail grows past its capacity the oldest 10% of entries are
//! dropped. Hosts that need durable history should drain entries with
//! [`AuditTrail::last_n`] before they age out.
//!
//! Every entry can be digested over its RFC 8785 canonical JSON form.

use juris_core::{sha256_digest, CanonicalBytes, ContentDigest, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default maximum number of retained entries.
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

/// Kind of audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntryType {
    /// A domain event reached the registry.
    EventReceived,
    /// A workflow instance was evaluated against an event.
    WorkflowEvaluated,
    /// A workflow's conditions could not be evaluated.
    ConditionFailed,
    /// An action handler completed.
    ActionExecuted,
    /// An action failed, timed out, or had no handler.
    ActionFailed,
    /// A template was activated into the registry.
    WorkflowActivated,
    /// An instance was switched on or off.
    WorkflowToggled,
    /// An instance was removed.
    WorkflowRemoved,
}

impl AuditEntryType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventReceived => "event_received",
            Self::WorkflowEvaluated => "workflow_evaluated",
            Self::ConditionFailed => "condition_failed",
            Self::ActionExecuted => "action_executed",
            Self::ActionFailed => "action_failed",
            Self::WorkflowActivated => "workflow_activated",
            Self::WorkflowToggled => "workflow_toggled",
            Self::WorkflowRemoved => "workflow_removed",
        }
    }
}

impl std::fmt::Display for AuditEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// What happened.
    pub entry_type: AuditEntryType,
    /// When it was recorded.
    pub timestamp: Timestamp,
    /// Subject entity (`entity.id` of the event), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Structured detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl AuditEntry {
    /// An entry stamped with the current time.
    pub fn new(entry_type: AuditEntryType, entity_id: Option<String>, metadata: Option<Value>) -> Self {
        Self {
            entry_type,
            timestamp: Timestamp::now(),
            entity_id,
            metadata,
        }
    }

    /// SHA-256 digest of the canonical JSON form.
    ///
    /// `None` only if the entry cannot be serialized.
    pub fn digest(&self) -> Option<ContentDigest> {
        match CanonicalBytes::new(self) {
            Ok(canonical) => Some(sha256_digest(&canonical)),
            Err(e) => {
                tracing::warn!(entry_type = %self.entry_type, error = %e, "audit entry digest unavailable");
                None
            }
        }
    }
}

/// Timestamps are excluded so entries recorded at different instants with
/// the same content compare equal.
impl PartialEq for AuditEntry {
    fn eq(&self, other: &Self) -> bool {
        self.entry_type == other.entry_type
            && self.entity_id == other.entity_id
            && self.metadata == other.metadata
    }
}

/// Append-only trail with a retention cap.
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
    capacity: usize,
}

impl AuditTrail {
    /// A trail retaining at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append an entry, trimming the oldest 10% when over capacity.
    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let trim = (self.capacity / 10).max(1);
            self.entries.drain(..trim);
            tracing::debug!(trimmed = trim, retained = self.entries.len(), "audit trail trimmed");
        }
    }

    /// Shorthand for appending a fresh [`AuditEntry`].
    pub fn record(&mut self, entry_type: AuditEntryType, entity_id: Option<String>, metadata: Value) {
        self.append(AuditEntry::new(entry_type, entity_id, Some(metadata)));
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Maximum retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries about one entity.
    pub fn entries_for_entity(&self, entity_id: &str) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.entity_id.as_deref() == Some(entity_id))
            .collect()
    }

    /// Entries of one type.
    pub fn entries_by_type(&self, entry_type: AuditEntryType) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .collect()
    }

    /// The most recent `n` entries, or all of them if fewer exist.
    pub fn last_n(&self, n: usize) -> &[AuditEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// `(index, digest)` for every digestable entry.
    pub fn compute_digests(&self) -> Vec<(usize, ContentDigest)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.digest().map(|d| (i, d)))
            .collect()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
