//! Account addresses
//!
//! 32-byte ledger addresses rendered as `0x`-prefixed hex. Parsing accepts
//! short forms (`0x2`) and left-pads them with zeros.

use std::fmt;
use std::str::FromStr;

use crate::errors::LaunchpadError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// 32-byte account address
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "client", derive(borsh::BorshSerialize, borsh::BorshDeserialize))]
pub struct Address(pub [u8; 32]);

impl Address {
    pub const ZERO: Address = Address([0u8; 32]);

    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Address whose last eight bytes hold `value`, handy for fixtures
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full 64-digit hex form with `0x` prefix
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(66);
        out.push_str("0x");
        for byte in self.0 {
            out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            out.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = LaunchpadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LaunchpadError::invalid_config("address", &format!("'{}' is not a 0x-prefixed hex address", s));

        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(invalid)?;
        if digits.is_empty() || digits.len() > 64 {
            return Err(invalid());
        }

        let mut nibbles = [0u8; 64];
        let offset = 64 - digits.len();
        for (i, c) in digits.chars().enumerate() {
            nibbles[offset + i] = c.to_digit(16).ok_or_else(invalid)? as u8;
        }

        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (nibbles[2 * i] << 4) | nibbles[2 * i + 1];
        }
        Ok(Self(bytes))
    }
}

#[cfg(feature = "client")]
impl serde::Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(feature = "client")]
impl<'de> serde::Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_form_is_left_padded() {
        let addr: Address = "0x2".parse().unwrap();
        assert_eq!(addr, Address::from_low_u64(2));
        assert_eq!(
            addr.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
    }

    #[test]
    fn test_full_form_round_trips() {
        let text = "0xa1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90";
        let addr: Address = text.parse().unwrap();
        assert_eq!(addr.to_string(), text);
        assert_eq!(addr.as_bytes()[0], 0xa1);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!("2".parse::<Address>().is_err());
        assert!("0x".parse::<Address>().is_err());
        assert!("0xzz".parse::<Address>().is_err());
        let too_long = format!("0x{}", "1".repeat(65));
        assert!(too_long.parse::<Address>().is_err());
    }
}
