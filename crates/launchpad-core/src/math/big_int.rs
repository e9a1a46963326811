//! Big integer operations for high-precision math
//!
//! The pricing integral's cubic term (`slope_num * s^3`) outgrows `u128`
//! long before a `u64` supply does, so every product that can exceed 128
//! bits goes through this 256-bit intermediate.

use crate::errors::{LaunchpadError, LaunchpadResult};

const LOW_64: u128 = u64::MAX as u128;

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// 256-bit unsigned integer for intermediate calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U256 {
    /// Low 128 bits
    pub lo: u128,
    /// High 128 bits
    pub hi: u128,
}

impl U256 {
    pub const ZERO: U256 = U256 { lo: 0, hi: 0 };

    /// Create a new U256 from low and high parts
    pub const fn new(lo: u128, hi: u128) -> Self {
        Self { lo, hi }
    }

    /// Create from a single u128 value
    pub const fn from_u128(value: u128) -> Self {
        Self { lo: value, hi: 0 }
    }

    /// Convert to u128, returning None if overflow
    pub fn to_u128(&self) -> Option<u128> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Add two U256 values
    pub fn checked_add(&self, other: &U256) -> Option<U256> {
        let (lo, carry) = self.lo.overflowing_add(other.lo);
        let hi = self.hi.checked_add(other.hi)?.checked_add(carry as u128)?;
        Some(U256::new(lo, hi))
    }

    /// Subtract two U256 values
    pub fn checked_sub(&self, other: &U256) -> Option<U256> {
        let (lo, borrow) = self.lo.overflowing_sub(other.lo);
        let hi = self.hi.checked_sub(other.hi)?.checked_sub(borrow as u128)?;
        Some(U256::new(lo, hi))
    }

    /// Multiply by a u128, returning None if the product needs more than 256 bits
    pub fn checked_mul_u128(&self, rhs: u128) -> Option<U256> {
        let low = mul_u128_to_u256(self.lo, rhs);
        let high = self.hi.checked_mul(rhs)?;
        let hi = low.hi.checked_add(high)?;
        Some(U256::new(low.lo, hi))
    }

    /// Divide by a u128, returning quotient and remainder
    ///
    /// Restoring long division over all 256 bits; the remainder always
    /// stays below the divisor so it fits in a u128.
    pub fn div_rem_u128(&self, divisor: u128) -> Option<(U256, u128)> {
        if divisor == 0 {
            return None;
        }
        if self.hi == 0 {
            return Some((U256::from_u128(self.lo / divisor), self.lo % divisor));
        }

        let mut quotient = U256::ZERO;
        let mut remainder: u128 = 0;
        for i in (0..256u32).rev() {
            let carry = remainder >> 127;
            remainder = (remainder << 1) | self.bit(i);
            // With the carry set the true remainder is >= 2^128 > divisor and
            // the wrapped subtraction yields the exact difference.
            if carry == 1 || remainder >= divisor {
                remainder = remainder.wrapping_sub(divisor);
                quotient.set_bit(i);
            }
        }
        Some((quotient, remainder))
    }

    fn bit(&self, index: u32) -> u128 {
        if index >= 128 {
            (self.hi >> (index - 128)) & 1
        } else {
            (self.lo >> index) & 1
        }
    }

    fn set_bit(&mut self, index: u32) {
        if index >= 128 {
            self.hi |= 1u128 << (index - 128);
        } else {
            self.lo |= 1u128 << index;
        }
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.hi.cmp(&other.hi) {
            std::cmp::Ordering::Equal => self.lo.cmp(&other.lo),
            ordering => ordering,
        }
    }
}

/// Multiply two u128 values and return the full 256-bit product
pub fn mul_u128_to_u256(a: u128, b: u128) -> U256 {
    let a_lo = a & LOW_64;
    let a_hi = a >> 64;
    let b_lo = b & LOW_64;
    let b_hi = b >> 64;

    let lo_lo = a_lo * b_lo;
    let lo_hi = a_lo * b_hi;
    let hi_lo = a_hi * b_lo;
    let hi_hi = a_hi * b_hi;

    // Each term is below 2^64, so the sum cannot overflow
    let mid = (lo_lo >> 64) + (lo_hi & LOW_64) + (hi_lo & LOW_64);

    let lo = (lo_lo & LOW_64) | ((mid & LOW_64) << 64);
    let hi = hi_hi + (lo_hi >> 64) + (hi_lo >> 64) + (mid >> 64);

    U256::new(lo, hi)
}

/// Multiply two u128 values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div_u128(
    a: u128,
    b: u128,
    denominator: u128,
    rounding: Rounding,
) -> LaunchpadResult<u128> {
    let product = mul_u128_to_u256(a, b);
    let (quotient, remainder) = product
        .div_rem_u128(denominator)
        .ok_or(LaunchpadError::DivisionByZero)?;

    let mut result = quotient.to_u128().ok_or(LaunchpadError::ArithmeticOverflow)?;
    if rounding == Rounding::Up && remainder > 0 {
        result = result
            .checked_add(1)
            .ok_or(LaunchpadError::ArithmeticOverflow)?;
    }
    Ok(result)
}

/// Multiply two u64 values and divide by a third with specified rounding
pub fn mul_div_u64(a: u64, b: u64, denominator: u64, rounding: Rounding) -> LaunchpadResult<u64> {
    if denominator == 0 {
        return Err(LaunchpadError::DivisionByZero);
    }

    let product = (a as u128) * (b as u128);
    let quotient = product / (denominator as u128);
    let remainder = product % (denominator as u128);

    let mut result = quotient;
    if rounding == Rounding::Up && remainder > 0 {
        result += 1;
    }

    u64::try_from(result).map_err(|_| LaunchpadError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_width_product() {
        let p = mul_u128_to_u256(u128::MAX, u128::MAX);
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(p.lo, 1);
        assert_eq!(p.hi, u128::MAX - 1);

        let p = mul_u128_to_u256(1u128 << 64, 1u128 << 64);
        assert_eq!(p, U256::new(0, 1));

        let p = mul_u128_to_u256(12345, 678);
        assert_eq!(p, U256::from_u128(12345 * 678));
    }

    #[test]
    fn test_div_rem_wide_dividend() {
        // 2^128 / 3 = 113427455640312821154458202477256070485 rem 1
        let value = U256::new(0, 1);
        let (q, r) = value.div_rem_u128(3).unwrap();
        assert_eq!(q.to_u128().unwrap(), 113_427_455_640_312_821_154_458_202_477_256_070_485);
        assert_eq!(r, 1);

        // Divisor above 2^127 exercises the carry path
        let divisor = (1u128 << 127) + 5;
        let dividend = mul_u128_to_u256(divisor, 1_000_003).checked_add(&U256::from_u128(7)).unwrap();
        let (q, r) = dividend.div_rem_u128(divisor).unwrap();
        assert_eq!(q.to_u128().unwrap(), 1_000_003);
        assert_eq!(r, 7);

        assert!(value.div_rem_u128(0).is_none());
    }

    #[test]
    fn test_checked_mul_u128() {
        let s = 737_000_000u128;
        let cube = mul_u128_to_u256(s * s, s);
        assert_eq!(cube.to_u128().unwrap(), s * s * s);

        let big = U256::new(0, u128::MAX);
        assert!(big.checked_mul_u128(2).is_none());
        assert_eq!(U256::new(5, 1).checked_mul_u128(1), Some(U256::new(5, 1)));
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div_u128(10, 3, 4, Rounding::Down).unwrap(), 7);
        assert_eq!(mul_div_u128(10, 3, 4, Rounding::Up).unwrap(), 8);
        assert_eq!(mul_div_u128(u128::MAX, 2, 2, Rounding::Down).unwrap(), u128::MAX);
        assert_eq!(mul_div_u128(1, 1, 0, Rounding::Down), Err(LaunchpadError::DivisionByZero));
        assert_eq!(
            mul_div_u128(u128::MAX, 3, 2, Rounding::Down),
            Err(LaunchpadError::ArithmeticOverflow)
        );

        assert_eq!(mul_div_u64(100, 250, 10_000, Rounding::Down).unwrap(), 2);
        assert_eq!(mul_div_u64(101, 250, 10_000, Rounding::Up).unwrap(), 3);
        assert!(mul_div_u64(u64::MAX, u64::MAX, 1, Rounding::Down).is_err());
    }
}
