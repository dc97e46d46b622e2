//! Batch reports over a folder of daily trading files.
//!
//! Trades are joined with per-instrument mark values and ranked per company by
//! asset value, volume, market value and net long activity.

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod io;
pub mod prelude;
pub mod report;
