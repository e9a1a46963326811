//! # Sqrt Price and Tick Range
//!
//! Helpers for the external AMM's pool-creation surface: the opening price
//! as a Q64.64 square root, and the full tick range aligned to a spacing.

use crate::constants::{AMM_MAX_TICK, AMM_MIN_TICK};
use crate::errors::{LaunchpadError, LaunchpadResult};
use crate::math::big_int::{mul_u128_to_u256, U256};
use crate::math::safe_math::sqrt_u128;

/// Smallest sqrt price the AMM accepts (Q64.64)
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;

/// Largest sqrt price the AMM accepts (Q64.64)
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

/// `floor(sqrt(numerator / denominator) * 2^64)`
///
/// `numerator / denominator` is the price of coin A in coin B, both in
/// smallest units. The square root is taken of `numerator * 2^128 /
/// denominator`, which needs up to 256 bits.
pub fn sqrt_price_q64_from_ratio(numerator: u128, denominator: u128) -> LaunchpadResult<u128> {
    if denominator == 0 {
        return Err(LaunchpadError::DivisionByZero);
    }
    if numerator == 0 {
        return Err(LaunchpadError::InvalidAmount("pool price must be positive"));
    }

    let (scaled, _) = U256::new(0, numerator)
        .div_rem_u128(denominator)
        .ok_or(LaunchpadError::DivisionByZero)?;
    let sqrt_price = isqrt_u256(&scaled);

    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price) {
        return Err(LaunchpadError::InvalidAmount(
            "pool price is outside the AMM sqrt price range",
        ));
    }
    Ok(sqrt_price)
}

/// Floor square root of a 256-bit value; the root always fits in a u128
fn isqrt_u256(value: &U256) -> u128 {
    if value.hi == 0 {
        return sqrt_u128(value.lo);
    }

    let mut lo: u128 = 1u128 << 64;
    let mut hi: u128 = u128::MAX;
    while lo < hi {
        let mid = hi - (hi - lo) / 2;
        if mul_u128_to_u256(mid, mid) <= *value {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Widest `(tick_lower, tick_upper)` range that is a multiple of `tick_spacing`
pub fn full_range_ticks(tick_spacing: u32) -> LaunchpadResult<(i32, i32)> {
    if tick_spacing == 0 || tick_spacing > AMM_MAX_TICK as u32 {
        return Err(LaunchpadError::UnsupportedTickSpacing(tick_spacing));
    }
    let spacing = tick_spacing as i32;
    let upper = (AMM_MAX_TICK / spacing) * spacing;
    let lower = (AMM_MIN_TICK / spacing) * spacing;
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q64;

    #[test]
    fn test_unit_price_is_q64() {
        assert_eq!(sqrt_price_q64_from_ratio(1, 1).unwrap(), Q64);
        assert_eq!(sqrt_price_q64_from_ratio(4, 1).unwrap(), 2 * Q64);
        assert_eq!(sqrt_price_q64_from_ratio(1, 4).unwrap(), Q64 / 2);
        assert_eq!(sqrt_price_q64_from_ratio(7_000, 7_000).unwrap(), Q64);
    }

    #[test]
    fn test_wide_ratio_root() {
        // sqrt(2^62) * 2^64 = 2^95
        assert_eq!(sqrt_price_q64_from_ratio(1u128 << 62, 1).unwrap(), 1u128 << 95);

        let root = sqrt_price_q64_from_ratio(1_000_000, 52_272).unwrap();
        let square = mul_u128_to_u256(root, root);
        let next = mul_u128_to_u256(root + 1, root + 1);
        let (target, _) = U256::new(0, 1_000_000).div_rem_u128(52_272).unwrap();
        assert!(square <= target && target < next);
    }

    #[test]
    fn test_out_of_range_prices_rejected() {
        assert!(sqrt_price_q64_from_ratio(1, u128::MAX).is_err());
        assert!(sqrt_price_q64_from_ratio(u128::MAX, 1).is_err());
        assert_eq!(sqrt_price_q64_from_ratio(1, 0), Err(LaunchpadError::DivisionByZero));
        assert!(sqrt_price_q64_from_ratio(0, 1).is_err());
    }

    #[test]
    fn test_full_range_ticks_aligned() {
        assert_eq!(full_range_ticks(1).unwrap(), (-443_636, 443_636));
        assert_eq!(full_range_ticks(60).unwrap(), (-443_580, 443_580));
        assert_eq!(full_range_ticks(200).unwrap(), (-443_600, 443_600));
        assert_eq!(full_range_ticks(220).unwrap(), (-443_520, 443_520));
        assert_eq!(full_range_ticks(0), Err(LaunchpadError::UnsupportedTickSpacing(0)));
    }
}
