//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified result model (ResultItem)
//! - Rendering functions for different output formats
//! - Path utilities
//! - Status line reporting
//! - Common utilities

pub mod model;
pub mod paths;
pub mod render;
pub mod status;
pub mod util;
