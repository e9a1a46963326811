//! # Fee Math
//!
//! Trade fee and referral split calculations in basis points.

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::math::big_int::{mul_div_u64, Rounding};

/// Floor of `amount * bps / 10000`
pub fn bps_of(amount: u64, bps: u16) -> LaunchpadResult<u64> {
    if bps as u64 > BPS_DENOMINATOR {
        return Err(LaunchpadError::invalid_config("bps", "must be at most 10000"));
    }
    mul_div_u64(amount, bps as u64, BPS_DENOMINATOR, Rounding::Down)
}

/// Largest curve spend such that `spend + bps_of(spend, fee_bps) <= payment`
pub fn budget_excluding_fee(payment: u64, fee_bps: u16) -> LaunchpadResult<u64> {
    if fee_bps as u64 > BPS_DENOMINATOR {
        return Err(LaunchpadError::invalid_config("trade_fee_bps", "must be at most 10000"));
    }
    mul_div_u64(
        payment,
        BPS_DENOMINATOR,
        BPS_DENOMINATOR + fee_bps as u64,
        Rounding::Down,
    )
}

/// Split a fee into (referrer share, platform share)
pub fn split_referral_fee(fee: u64, referral_share_bps: u16) -> LaunchpadResult<(u64, u64)> {
    let referral = bps_of(fee, referral_share_bps)?;
    Ok((referral, fee - referral))
}
