//! Formatting & Validation Utilities
//!
//! Unit conversion, decimal serialization for 256-bit quantities, and the
//! input validation the entry points run before touching the network.

use alloy_primitives::U256;

/// Convert wei to FLOW (18 decimals)
#[inline]
pub fn wei_to_flow(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e18
}

/// Convert wei to gwei
#[inline]
pub fn wei_to_gwei(wei: U256) -> f64 {
    let wei_u128: u128 = wei.try_into().unwrap_or(u128::MAX);
    wei_u128 as f64 / 1e9
}

/// Format a wei amount as a decimal FLOW string, trimming trailing zeros
pub fn format_flow(wei: U256) -> String {
    let whole = wei / U256::from(10u64).pow(U256::from(18));
    let frac = wei % U256::from(10u64).pow(U256::from(18));
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = format!("{:0>18}", frac);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

/// Shorten an address for display: first 6 + last 4 hex chars
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Validate a transaction hash: 0x + 64 hex chars
pub fn is_valid_tx_hash(hash: &str) -> bool {
    hash.len() == 66
        && hash.starts_with("0x")
        && hash[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate an address: 0x + 40 hex chars
pub fn is_valid_address(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Serde helper: serialize U256 as a decimal string.
///
/// Hex quantities are fine on the wire, but the emitted report keeps all
/// 256-bit numbers as decimal strings so downstream consumers never lose
/// precision to floating point.
pub mod u256_dec {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<U256>().map_err(D::Error::custom)
    }
}

/// Serde helper: Option<U256> as an optional decimal string
pub mod u256_dec_opt {
    use alloy_primitives::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<U256>, D::Error> {
        let opt = Option::<String>::deserialize(deserializer)?;
        opt.map(|s| s.parse::<U256>().map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wei_to_flow() {
        let one = U256::from(1_000_000_000_000_000_000u128);
        assert!((wei_to_flow(one) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_wei_to_gwei() {
        let fifty = U256::from(50_000_000_000u64);
        assert!((wei_to_gwei(fifty) - 50.0).abs() < 0.0001);
    }

    #[test]
    fn test_format_flow() {
        assert_eq!(format_flow(U256::from(2_500_000_000_000_000_000u128)), "2.5");
        assert_eq!(format_flow(U256::from(3_000_000_000_000_000_000u128)), "3");
        assert_eq!(format_flow(U256::ZERO), "0");
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_tx_hash_validation() {
        let good = format!("0x{}", "a".repeat(64));
        assert!(is_valid_tx_hash(&good));
        assert!(!is_valid_tx_hash("0x1234"));
        assert!(!is_valid_tx_hash(&format!("0x{}", "g".repeat(64))));
        assert!(!is_valid_tx_hash(&"a".repeat(66)));
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("1234567890abcdef1234567890abcdef12345678xx"));
    }

    #[test]
    fn test_u256_decimal_round_trip() {
        use serde::{Deserialize, Serialize};

        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "u256_dec")]
            value: U256,
        }

        let big = U256::from_str_radix("123456789012345678901234567890123456789", 10)
            .expect("literal parses");
        let json = serde_json::to_string(&Wrapper { value: big }).expect("serializes");
        assert!(json.contains("\"123456789012345678901234567890123456789\""));
        let back: Wrapper = serde_json::from_str(&json).expect("parses");
        assert_eq!(back.value, big);
    }
}
