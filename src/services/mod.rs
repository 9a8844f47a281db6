//! Business logic layer for fundwatch
//!
//! Services own the rules; repositories only persist. Each service borrows
//! the storage coordinator and writes audit entries for every mutation.

pub mod activity_design;
pub mod allocation;
pub mod archive;
pub mod budget;
pub mod funding;
pub mod ledger;
pub mod pre;
pub mod purchase_request;
pub mod realignment;
pub mod savings;

pub use activity_design::ActivityDesignService;
pub use allocation::AllocationService;
pub use archive::{ArchiveService, SweepOutcome};
pub use budget::{BudgetService, BudgetTotals};
pub use funding::{DocumentRef, QuarterUsage};
pub use pre::PreService;
pub use purchase_request::PurchaseRequestService;
pub use realignment::RealignmentService;
pub use savings::SavingsService;
