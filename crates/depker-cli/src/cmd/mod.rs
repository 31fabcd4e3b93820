//! Command implementations. Each returns the exit code to report.

pub mod create;
pub mod passthrough;
pub mod reload;
pub mod run;
pub mod update;
