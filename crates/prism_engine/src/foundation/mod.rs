//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Frame clocks
//! - Thread synchronization latches
//! - Logging utilities

pub mod logging;
pub mod math;
pub mod sync;
pub mod time;
