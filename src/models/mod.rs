//! Core data models for fundwatch
//!
//! This module contains all the data structures that represent the budget
//! monitoring domain: approved budgets, department allocations, PREs,
//! purchase requests, activity designs, realignments, ledger entries, and
//! savings snapshots.

pub mod activity_design;
pub mod allocation;
pub mod archive;
pub mod budget;
pub mod fiscal_year;
pub mod ids;
pub mod ledger;
pub mod money;
pub mod pre;
pub mod purchase_request;
pub mod quarter;
pub mod realignment;
pub mod savings;
pub mod status;

pub use activity_design::ActivityDesign;
pub use allocation::Allocation;
pub use archive::{ArchiveState, ArchiveType};
pub use budget::ApprovedBudget;
pub use fiscal_year::FiscalYear;
pub use ids::{
    ActivityDesignId, AllocationId, BudgetId, LedgerEntryId, LineItemId, PreId,
    PurchaseRequestId, RealignmentId, SnapshotId,
};
pub use ledger::{LedgerEntry, LedgerKind};
pub use money::Money;
pub use pre::{LineItem, LineItemSource, Pre, Receipt, Section};
pub use purchase_request::{Funding, PurchaseItem, PurchaseRequest};
pub use quarter::{Quarter, QuarterAmounts};
pub use realignment::Realignment;
pub use savings::{LineSavings, SavingsSnapshot, SIGNIFICANT_SURPLUS};
pub use status::RequestStatus;
