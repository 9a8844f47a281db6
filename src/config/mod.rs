//! Configuration and path management for fundwatch

pub mod paths;
pub mod settings;

pub use paths::FundwatchPaths;
pub use settings::Settings;
