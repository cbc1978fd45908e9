//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Generational handles for components and scene nodes
//! - Frame time management
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod time;
pub mod logging;
