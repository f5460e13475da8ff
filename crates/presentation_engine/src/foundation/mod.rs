//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the presenter:
//! - Math types for camera transforms
//! - Tick gates and time measurement
//! - Logging utilities

pub mod math;
pub mod time;
pub mod logging;
