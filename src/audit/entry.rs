//! Audit entry data structures
//!
//! Defines the structure of audit log entries including operation types,
//! entity types, and the entry format itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Entity was created
    Create,
    /// Entity was updated
    Update,
    /// Entity was deleted
    Delete,
    /// Document was submitted for review
    Submit,
    /// Document was approved (partially or finally)
    Approve,
    /// Document was rejected
    Reject,
    /// Record was archived
    Archive,
    /// Record was restored from the archive
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Submit => write!(f, "SUBMIT"),
            Operation::Approve => write!(f, "APPROVE"),
            Operation::Reject => write!(f, "REJECT"),
            Operation::Archive => write!(f, "ARCHIVE"),
            Operation::Restore => write!(f, "RESTORE"),
        }
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Budget,
    Allocation,
    Pre,
    PurchaseRequest,
    ActivityDesign,
    Realignment,
    SavingsSnapshot,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Budget => write!(f, "Budget"),
            EntityType::Allocation => write!(f, "Allocation"),
            EntityType::Pre => write!(f, "PRE"),
            EntityType::PurchaseRequest => write!(f, "PurchaseRequest"),
            EntityType::ActivityDesign => write!(f, "ActivityDesign"),
            EntityType::Realignment => write!(f, "Realignment"),
            EntityType::SavingsSnapshot => write!(f, "SavingsSnapshot"),
        }
    }
}

/// A single audit log entry
///
/// Records a single operation on an entity with the acting user and optional
/// before/after values for tracking changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    /// Type of operation performed
    pub operation: Operation,

    /// Type of entity affected
    pub entity_type: EntityType,

    /// ID of the affected entity
    pub entity_id: String,

    /// Human-readable description of the entity (e.g., department name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Who performed the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// JSON representation of the entity before the operation (for updates/deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    /// JSON representation of the entity after the operation (for creates/updates)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable diff summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry for a create operation
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            actor,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
        }
    }

    /// Create a new audit entry for an update operation
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            actor,
            before: serde_json::to_value(before).ok(),
            after: serde_json::to_value(after).ok(),
            diff_summary,
        }
    }

    /// Create a new audit entry for a delete operation
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            actor,
            before: serde_json::to_value(entity).ok(),
            after: None,
            diff_summary: None,
        }
    }

    /// Create a new audit entry for a workflow or archive action
    pub fn action(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: Option<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            actor,
            before: None,
            after: None,
            diff_summary: detail,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(actor) = &self.actor {
            output.push_str(&format!(" by {}", actor));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Approve.to_string(), "APPROVE");
        assert_eq!(Operation::Archive.to_string(), "ARCHIVE");
    }

    #[test]
    fn test_entity_type_display() {
        assert_eq!(EntityType::Budget.to_string(), "Budget");
        assert_eq!(EntityType::Pre.to_string(), "PRE");
    }

    #[test]
    fn test_create_entry() {
        let data = json!({"department": "Registrar", "allocated": 100000});
        let entry = AuditEntry::create(
            EntityType::Allocation,
            "alc-12345678",
            Some("Registrar".to_string()),
            Some("bursar".to_string()),
            &data,
        );

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Allocation);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry() {
        let before = json!({"allocated": 1000});
        let after = json!({"allocated": 1500});

        let entry = AuditEntry::update(
            EntityType::Allocation,
            "alc-12345678",
            Some("Registrar".to_string()),
            Some("bursar".to_string()),
            &before,
            &after,
            Some("allocated: 1000 -> 1500".to_string()),
        );

        assert_eq!(entry.operation, Operation::Update);
        assert!(entry.before.is_some());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_action_entry() {
        let entry = AuditEntry::action(
            Operation::Approve,
            EntityType::PurchaseRequest,
            "pr-12345678",
            Some("PR-2025-0001".to_string()),
            Some("budget officer".to_string()),
            Some("final approval".to_string()),
        );

        assert_eq!(entry.operation, Operation::Approve);
        assert!(entry.before.is_none());
        assert!(entry.after.is_none());
        assert_eq!(entry.diff_summary.as_deref(), Some("final approval"));
    }

    #[test]
    fn test_serialization() {
        let data = json!({"name": "Test"});
        let entry = AuditEntry::create(EntityType::Budget, "bud-123", None, None, &data);

        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: AuditEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.operation, Operation::Create);
        assert_eq!(deserialized.entity_type, EntityType::Budget);
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::action(
            Operation::Reject,
            EntityType::Pre,
            "pre-12345678",
            Some("Registrar".to_string()),
            Some("officer".to_string()),
            Some("missing quarterly spread".to_string()),
        );

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("REJECT"));
        assert!(formatted.contains("PRE"));
        assert!(formatted.contains("by officer"));
        assert!(formatted.contains("missing quarterly spread"));
    }
}
