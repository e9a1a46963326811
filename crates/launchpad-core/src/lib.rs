//! # Launchpad Core - Shared Curve Logic
//!
//! This crate contains the types and integer math shared between the
//! ledger-facing launchpad state machine and off-ledger clients. It provides:
//!
//! - The error taxonomy used across the launchpad
//! - Overflow-checked and 256-bit intermediate arithmetic
//! - The bonding curve pricing model and its inversion
//! - Sqrt-price and tick helpers for the external AMM
//! - Address and coin identifier types
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde and borsh serialization

// Re-export all modules
pub mod constants;
pub mod errors;
pub mod math;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use errors::{LaunchpadError, LaunchpadResult};
pub use math::pricing::{BuyQuote, PriceCurve};
pub use types::*;
