//! Reports for fundwatch
//!
//! Serializable report structs built straight off storage, shared by the
//! terminal display and the export layer.

pub mod dashboard;
pub mod quarterly;
pub mod utilization;

pub use dashboard::{DashboardReport, DepartmentRow, DocCounts};
pub use quarterly::{LineItemBreakdown, QuarterCell, QuarterlyReport};
pub use utilization::{UtilizationReport, UtilizationRow};
