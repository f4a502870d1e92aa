//! Foundation module - Core utilities and types
//!
//! - Collections and data structures
//! - Logging utilities

pub mod collections;
pub mod logging;
