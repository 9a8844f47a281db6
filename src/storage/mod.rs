//! Storage layer for fundwatch
//!
//! Provides JSON file storage with atomic writes and a coordinator struct
//! that owns all repositories plus the audit logger.

pub mod activity_designs;
pub mod allocations;
pub mod budgets;
pub mod file_io;
pub mod init;
pub mod ledger;
pub mod pres;
pub mod purchase_requests;
pub mod realignments;
pub mod savings;

pub use activity_designs::ActivityDesignRepository;
pub use allocations::AllocationRepository;
pub use budgets::BudgetRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use ledger::LedgerRepository;
pub use pres::PreRepository;
pub use purchase_requests::PurchaseRequestRepository;
pub use realignments::RealignmentRepository;
pub use savings::SavingsRepository;

use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType, Operation};
use crate::config::paths::FundwatchPaths;
use crate::error::FundwatchError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: FundwatchPaths,
    audit: AuditLogger,
    pub budgets: BudgetRepository,
    pub allocations: AllocationRepository,
    pub pres: PreRepository,
    pub purchase_requests: PurchaseRequestRepository,
    pub activity_designs: ActivityDesignRepository,
    pub realignments: RealignmentRepository,
    pub ledger: LedgerRepository,
    pub savings: SavingsRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: FundwatchPaths) -> Result<Self, FundwatchError> {
        // Ensure directories exist
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            allocations: AllocationRepository::new(paths.allocations_file()),
            pres: PreRepository::new(paths.pres_file()),
            purchase_requests: PurchaseRequestRepository::new(paths.purchase_requests_file()),
            activity_designs: ActivityDesignRepository::new(paths.activity_designs_file()),
            realignments: RealignmentRepository::new(paths.realignments_file()),
            ledger: LedgerRepository::new(paths.ledger_file()),
            savings: SavingsRepository::new(paths.savings_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &FundwatchPaths {
        &self.paths
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), FundwatchError> {
        self.budgets.load()?;
        self.allocations.load()?;
        self.pres.load()?;
        self.purchase_requests.load()?;
        self.activity_designs.load()?;
        self.realignments.load()?;
        self.ledger.load()?;
        self.savings.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), FundwatchError> {
        self.budgets.save()?;
        self.allocations.save()?;
        self.pres.save()?;
        self.purchase_requests.save()?;
        self.activity_designs.save()?;
        self.realignments.save()?;
        self.ledger.save()?;
        self.savings.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.settings_file().exists()
    }

    // Audit helpers, so service code stays one call per event.

    /// Record a create operation in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: &str,
        entity: &T,
    ) -> Result<(), FundwatchError> {
        let entry = AuditEntry::create(
            entity_type,
            entity_id,
            entity_name,
            Some(actor.to_string()),
            entity,
        );
        self.audit.log(&entry)
    }

    /// Record an update operation with a generated diff summary
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: &str,
        before: &T,
        after: &T,
    ) -> Result<(), FundwatchError> {
        let before_value = serde_json::to_value(before)?;
        let after_value = serde_json::to_value(after)?;
        let diff = generate_diff(&before_value, &after_value);

        let entry = AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            Some(actor.to_string()),
            before,
            after,
            diff,
        );
        self.audit.log(&entry)
    }

    /// Record a workflow or archive action
    pub fn log_action(
        &self,
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        actor: &str,
        detail: Option<String>,
    ) -> Result<(), FundwatchError> {
        let entry = AuditEntry::action(
            operation,
            entity_type,
            entity_id,
            entity_name,
            Some(actor.to_string()),
            detail,
        );
        self.audit.log(&entry)
    }
}
