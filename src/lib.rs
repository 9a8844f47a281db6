//! fundwatch - Terminal-based campus budget monitoring
//!
//! This library provides the core functionality for fundwatch, a budget
//! monitoring application for campus fiscal administration. It tracks
//! fiscal-year budgets, department allocations, PRE planning documents,
//! purchase requests, activity designs, and budget realignments through a
//! shared approval workflow, with full audit trails.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (budgets, allocations, PREs, requests, etc.)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `import`: PRE sheet (CSV) parsing
//! - `reports`: Dashboard, utilization, and quarterly reports
//! - `export`: CSV/JSON/YAML export of reports and raw data
//!
//! # Example
//!
//! ```rust,ignore
//! use fundwatch::config::{paths::FundwatchPaths, settings::Settings};
//!
//! let paths = FundwatchPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::FundwatchError;
