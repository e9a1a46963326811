//! # Core Type Definitions
//!
//! Primitive identifiers shared by ledger logic and off-ledger clients.

pub mod address;
pub mod coin;

// Re-export all types
pub use address::*;
pub use coin::*;
