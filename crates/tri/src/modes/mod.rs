//! Run-mode dispatch targets
//!
//! One typed function per `RUN_MODE` branch.

pub mod cron;
pub mod exec;
pub mod once;
