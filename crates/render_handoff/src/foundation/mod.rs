//! Foundation module - core utilities used throughout the harness
//!
//! - Time measurement
//! - Logging setup

pub mod logging;
pub mod time;
