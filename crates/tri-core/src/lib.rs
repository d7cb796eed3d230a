//! Core library for trendradar-init
//!
//! This crate carries the operational contract of the TrendRadar container
//! entrypoint: the environment-variable settings surface, the persistent
//! data-dir remapping, cron schedule handling, and the environment file
//! writer that scheduler-invoked children inherit from.
//!
//! The application itself (scraper, report pipeline, dashboard) is an
//! external program; everything in here exists to get the container into a
//! runnable state and hand off to it.

pub mod cronline;
pub mod envfile;
pub mod error;
pub mod fsops;
pub mod logging;
pub mod paths;
pub mod settings;

pub use error::InitError;
pub use paths::AppLayout;
pub use settings::{RunMode, Settings};
