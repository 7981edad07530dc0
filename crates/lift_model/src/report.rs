//! Accumulated report of records and artifacts skipped during a run.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Why an item was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// A required field was absent in a raw record.
    MalformedRecord,
    /// A child referenced a parent id missing from the snapshot.
    DanglingReference,
    /// A render step lacked a value it needed.
    MissingSubstitution,
    /// One or more remote-state backend settings were blank.
    MissingBackendConfig,
}

impl SkipKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipKind::MalformedRecord => "malformed_record",
            SkipKind::DanglingReference => "dangling_reference",
            SkipKind::MissingSubstitution => "missing_substitution",
            SkipKind::MissingBackendConfig => "missing_backend_config",
        }
    }
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single skipped record or artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedItem {
    pub kind: SkipKind,
    /// Offending resource ids, enough to retry the item.
    pub resource_ids: Vec<String>,
    pub reason: String,
}

impl SkippedItem {
    pub fn involves(&self, id: &str) -> bool {
        self.resource_ids.iter().any(|r| r == id)
    }
}

impl fmt::Display for SkippedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.kind,
            self.resource_ids.join(", "),
            self.reason
        )
    }
}

/// Report of everything skipped during one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    items: Vec<SkippedItem>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped item and log it.
    pub fn record<I, S>(&mut self, kind: SkipKind, resource_ids: I, reason: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let item = SkippedItem {
            kind,
            resource_ids: resource_ids.into_iter().map(Into::into).collect(),
            reason: reason.into(),
        };
        warn!(kind = %item.kind, ids = ?item.resource_ids, "{}", item.reason);
        self.items.push(item);
    }

    pub fn items(&self) -> &[SkippedItem] {
        &self.items
    }

    pub fn of_kind(&self, kind: SkipKind) -> impl Iterator<Item = &SkippedItem> {
        self.items.iter().filter(move |item| item.kind == kind)
    }

    pub fn count(&self, kind: SkipKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append another report's items after this one's.
    pub fn merge(&mut self, other: RunReport) {
        self.items.extend(other.items);
    }
}
