//! Common Utilities and Types Library
//!
//! This crate provides the record types, operator directory and numeric
//! helpers shared across the KQI aggregation crates.

pub mod layout;
pub mod operators;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use layout::RawColumn;
pub use operators::OperatorDirectory;
pub use types::*;
pub use utils::*;
