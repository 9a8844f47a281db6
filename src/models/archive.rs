//! Embedded archive state
//!
//! Top-level records are never deleted outright; they are archived, either as
//! part of a fiscal-year cascade or manually. The archive type decides what a
//! cascade restore may bring back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a record came to be archived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArchiveType {
    /// Archived by the fiscal-year cascade (sweep or budget archive)
    FiscalYear,
    /// Archived by an explicit admin action
    Manual,
}

impl fmt::Display for ArchiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveType::FiscalYear => write!(f, "fiscal year"),
            ArchiveType::Manual => write!(f, "manual"),
        }
    }
}

/// Archive metadata embedded in every archivable record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveState {
    #[serde(default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_type: Option<ArchiveType>,
}

impl ArchiveState {
    /// Fresh, non-archived state
    pub fn active() -> Self {
        Self::default()
    }

    /// Whether the record is archived
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// Mark the record archived
    pub fn archive(&mut self, archive_type: ArchiveType, actor: &str, reason: impl Into<String>) {
        self.archived = true;
        self.archived_at = Some(Utc::now());
        self.archived_by = Some(actor.to_string());
        self.reason = reason.into();
        self.archive_type = Some(archive_type);
    }

    /// Clear the archive flag and provenance
    pub fn restore(&mut self) {
        self.archived = false;
        self.archived_at = None;
        self.archived_by = None;
        self.reason.clear();
        self.archive_type = None;
    }

    /// Whether a fiscal-year cascade restore may bring this record back
    ///
    /// Manually archived records survive a cascade restore.
    pub fn restorable_by_cascade(&self) -> bool {
        self.archived && self.archive_type == Some(ArchiveType::FiscalYear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_active() {
        let state = ArchiveState::active();
        assert!(!state.is_archived());
        assert!(state.archived_at.is_none());
    }

    #[test]
    fn test_archive_and_restore() {
        let mut state = ArchiveState::active();
        state.archive(ArchiveType::Manual, "bursar", "duplicate entry");

        assert!(state.is_archived());
        assert_eq!(state.archived_by.as_deref(), Some("bursar"));
        assert_eq!(state.reason, "duplicate entry");
        assert_eq!(state.archive_type, Some(ArchiveType::Manual));

        state.restore();
        assert!(!state.is_archived());
        assert!(state.archive_type.is_none());
        assert!(state.reason.is_empty());
    }

    #[test]
    fn test_cascade_restore_provenance() {
        let mut fiscal = ArchiveState::active();
        fiscal.archive(ArchiveType::FiscalYear, "system", "fiscal year 2024 closed");
        assert!(fiscal.restorable_by_cascade());

        let mut manual = ArchiveState::active();
        manual.archive(ArchiveType::Manual, "bursar", "voided");
        assert!(!manual.restorable_by_cascade());

        assert!(!ArchiveState::active().restorable_by_cascade());
    }

    #[test]
    fn test_serde_wire_format() {
        let mut state = ArchiveState::active();
        state.archive(ArchiveType::FiscalYear, "system", "closed");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("FISCAL_YEAR"));

        // Legacy records with only the flag present
        let legacy: ArchiveState = serde_json::from_str(r#"{"archived": false}"#).unwrap();
        assert!(!legacy.is_archived());
    }
}
