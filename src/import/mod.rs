//! Import layer for fundwatch
//!
//! Parses CSV exports of the standard PRE spreadsheet template.

pub mod pre_sheet;

pub use pre_sheet::{parse_pre_sheet, ParsedLineItem, ParsedPreSheet, ParsedReceipt, RowMismatch};
