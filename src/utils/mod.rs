//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Zero-width and whitespace text helpers

pub mod error;
pub mod text;

// Re-export commonly used items
pub use error::{downgrade, ExtractError, ExtractResult};
