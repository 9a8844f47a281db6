//! Custom error types for fundwatch
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for fundwatch operations
#[derive(Error, Debug)]
pub enum FundwatchError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Budget balance errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// Illegal workflow transitions
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// A funding request exceeds what a line item quarter can cover
    #[error(
        "Insufficient funds in '{line_item}' {quarter}: need {needed_centavos}, have {available_centavos}"
    )]
    InsufficientFunds {
        line_item: String,
        quarter: String,
        needed_centavos: i64,
        available_centavos: i64,
    },

    /// Operation attempted on an archived record
    #[error("Record is archived: {0}")]
    Archived(String),

    /// PRE sheet import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FundwatchError {
    /// Create a "not found" error for approved budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for allocations
    pub fn allocation_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Allocation",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for PREs
    pub fn pre_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "PRE",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for PRE line items
    pub fn line_item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Line item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for purchase requests
    pub fn purchase_request_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Purchase request",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for activity designs
    pub fn activity_design_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Activity design",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for realignments
    pub fn realignment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Realignment",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a workflow transition error
    pub fn is_workflow(&self) -> bool {
        matches!(self, Self::Workflow(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for FundwatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FundwatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for fundwatch operations
pub type FundwatchResult<T> = Result<T, FundwatchError>;
