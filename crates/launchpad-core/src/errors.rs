//! # Core Error Types
//!
//! One error taxonomy shared by the pricing model, the curve state machine
//! and the liquidity seeder. Every rejection is a local abort: the operation
//! that returns one of these has not mutated any state.

use thiserror::Error;

/// Launchpad errors surfaced to callers as typed rejections
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize))]
pub enum LaunchpadError {
    // ========================================================================
    // Math Errors
    // ========================================================================

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    // ========================================================================
    // Trade Errors
    // ========================================================================

    #[error("Deadline expired: deadline {deadline_ms}ms, ledger time {now_ms}ms")]
    DeadlineExpired { deadline_ms: u64, now_ms: u64 },

    #[error("Slippage exceeded: minimum {minimum}, actual {actual}")]
    SlippageExceeded { minimum: u64, actual: u64 },

    #[error("Curve is sold out")]
    SoldOut,

    #[error("Payment too small to buy a single whole token")]
    PaymentTooSmall,

    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),

    #[error("Insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("Insufficient reserve: needed {needed}, available {available}")]
    InsufficientReserve { needed: u64, available: u64 },

    #[error("Sell of {requested} tokens exceeds {sold} sold on the curve")]
    SupplyExceeded { requested: u64, sold: u64 },

    // ========================================================================
    // State Machine Errors
    // ========================================================================

    #[error("Curve has already graduated")]
    AlreadyGraduated,

    #[error("Curve has not graduated yet")]
    NotYetGraduated,

    #[error("Supply cap not reached: {sold} of {cap} sold")]
    CapNotReached { sold: u64, cap: u64 },

    #[error("Graduation payouts have not been distributed")]
    PayoutsPending,

    #[error("Graduation payouts already distributed")]
    PayoutsAlreadyDistributed,

    #[error("Liquidity already seeded")]
    AlreadySeeded,

    // ========================================================================
    // Registry and Configuration Errors
    // ========================================================================

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration file error: {0}")]
    ConfigIo(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Ticker already taken: {0}")]
    TickerTaken(String),

    #[error("Curve not found: {0}")]
    CurveNotFound(String),

    #[error("Curve already exists: {0}")]
    CurveExists(String),

    #[error("Unauthorized")]
    Unauthorized,

    // ========================================================================
    // Liquidity Seeding Errors
    // ========================================================================

    #[error("Coin pair not in canonical order or not this curve's pair: ({coin_a}, {coin_b})")]
    CoinOrderMismatch { coin_a: String, coin_b: String },

    #[error("Tick spacing {0} is not an enabled fee tier")]
    UnsupportedTickSpacing(u32),

    #[error("No LP bot address configured")]
    LpBotNotConfigured,

    #[error("External AMM rejected pool creation: {0}")]
    ExternalAmm(String),
}

/// Result type using launchpad errors
pub type LaunchpadResult<T> = Result<T, LaunchpadError>;

impl LaunchpadError {
    /// Create an invalid configuration error
    pub fn invalid_config(field: &str, reason: &str) -> Self {
        Self::InvalidConfig(format!("{}: {}", field, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LaunchpadError::invalid_config("platform_cut_bps", "must be at most 10000");
        assert_eq!(
            format!("{}", err),
            "Invalid configuration: platform_cut_bps: must be at most 10000"
        );

        let err = LaunchpadError::SlippageExceeded { minimum: 10, actual: 9 };
        assert_eq!(format!("{}", err), "Slippage exceeded: minimum 10, actual 9");
    }
}
