//! Search module - Finds tabular files that contain a value
//!
//! Provides:
//! - request: the immutable search request
//! - scanner: directory walk and per-file test

pub mod request;
pub mod scanner;
