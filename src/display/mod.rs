//! Terminal output formatting
//!
//! Pure string builders over models and reports; command handlers print the
//! results.

pub mod budget;
pub mod report;
pub mod request;

pub use budget::{format_allocation_list, format_budget_detail, format_budget_list};
pub use report::{
    format_dashboard, format_ledger, format_quarterly, format_savings, format_utilization,
};
pub use request::{
    format_ad_list, format_pr_detail, format_pr_list, format_pre_detail, format_pre_list,
    format_realignment_list,
};
