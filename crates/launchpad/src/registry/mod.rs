//! Registries
//!
//! Small uniqueness and lookup stores shared by every curve on the platform.

pub mod referral;
pub mod ticker;

pub use referral::ReferralRegistry;
pub use ticker::{normalize_ticker, TickerRegistry};
