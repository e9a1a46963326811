//! # Protocol Constants
//!
//! Shared between ledger logic and off-ledger clients:
//! - Mathematical constants (Q64, basis points)
//! - Default curve shape and supply split
//! - External AMM tick bounds and fee tiers

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Q64 fixed-point scale factor: 2^64
pub const Q64: u128 = 1u128 << 64;

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum basis points value (100%)
pub const MAX_BPS: u16 = 10_000;

// ============================================================================
// Curve Defaults
// ============================================================================

/// Price of the first whole token, in smallest payment units
pub const DEFAULT_BASE_PRICE: u64 = 1_000;

/// Default slope numerator: price grows by s^2 * num / den
pub const DEFAULT_SLOPE_NUMERATOR: u128 = 1;

/// Default slope denominator, sized so a sold-out curve holds
/// 13,333 whole units of a 9-decimal payment currency
pub const DEFAULT_SLOPE_DENOMINATOR: u128 = 10_593_721_631_205;

/// Whole tokens sold along the curve before graduation
pub const DEFAULT_MAX_CURVE_SUPPLY: u64 = 737_000_000;

/// Whole tokens in existence after graduation; the excess over the curve
/// cap is reserved for liquidity seeding and burn
pub const DEFAULT_TOTAL_TOKEN_SUPPLY: u64 = 1_000_000_000;

/// Decimals of launched tokens
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Decimals of the payment currency
pub const DEFAULT_PAYMENT_DECIMALS: u8 = 9;

/// Default payment currency identifier
pub const DEFAULT_PAYMENT_COIN: &str = "0x2::sui::SUI";

/// Default trade fee (1%)
pub const DEFAULT_TRADE_FEE_BPS: u16 = 100;

/// Default referrer share of the trade fee (10%)
pub const DEFAULT_REFERRAL_SHARE_BPS: u16 = 1_000;

/// Default platform cut of the reserve at graduation (5%)
pub const DEFAULT_PLATFORM_CUT_BPS: u16 = 500;

/// Default flat creator payout at graduation, in smallest payment units
pub const DEFAULT_CREATOR_GRADUATION_PAYOUT: u64 = 100_000_000_000;

/// Default markup of the pool opening price over the final curve price
pub const DEFAULT_LIQUIDITY_BUMP_BPS: u16 = 0;

// ============================================================================
// Ticker Constants
// ============================================================================

/// Maximum ticker length after normalization
pub const MAX_TICKER_LEN: usize = 10;

// ============================================================================
// External AMM Constants
// ============================================================================

/// Minimum tick supported by the external AMM
pub const AMM_MIN_TICK: i32 = -443_636;

/// Maximum tick supported by the external AMM
pub const AMM_MAX_TICK: i32 = 443_636;

/// Fee tiers enabled on the external AMM, expressed as tick spacings
pub const DEFAULT_TICK_SPACINGS: [u32; 6] = [1, 2, 10, 60, 200, 220];

/// Tick spacing used for graduated pools unless configured otherwise
pub const DEFAULT_TICK_SPACING: u32 = 200;
