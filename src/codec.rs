//! Boundary conversions between display values and contract values
//!
//! - Bank names travel as `bytes32`: UTF-8, NUL padded to 32 bytes
//! - Amounts travel as base units (wei); the UI shows decimal ether strings

use ethers::types::U256;
use ethers::utils::{format_bytes32_string, format_ether, parse_bytes32_string, parse_ether};

use crate::error::BankError;

/// Width of the contract's string field
pub const FIXED_WIDTH: usize = 32;

/// Encode a bank name into its fixed-width contract representation
///
/// The name must leave room for a NUL terminator, so at most 31 bytes.
pub fn encode_bank_name(name: &str) -> Result<[u8; FIXED_WIDTH], BankError> {
    if name.len() >= FIXED_WIDTH {
        return Err(BankError::encoding(format!(
            "bank name is {} bytes, must be shorter than {}",
            name.len(),
            FIXED_WIDTH
        )));
    }
    Ok(format_bytes32_string(name)?)
}

/// Decode a fixed-width contract string, stopping at the first NUL byte
pub fn decode_bank_name(raw: &[u8; FIXED_WIDTH]) -> Result<String, BankError> {
    Ok(parse_bytes32_string(raw)?.to_string())
}

/// Parse a user-entered decimal amount into base units
pub fn parse_amount(amount: &str) -> Result<U256, BankError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(BankError::encoding("amount is empty"));
    }
    if trimmed.starts_with('-') {
        return Err(BankError::encoding(format!(
            "amount must not be negative: {}",
            trimmed
        )));
    }
    parse_ether(trimmed)
        .map_err(|e| BankError::encoding(format!("invalid amount '{}': {}", trimmed, e)))
}

/// Format a base-unit amount as a decimal display string
pub fn format_amount(amount: U256) -> String {
    format_ether(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_name_round_trip() {
        let encoded = encode_bank_name("Acme").unwrap();
        assert_eq!(&encoded[..4], b"Acme");
        assert!(encoded[4..].iter().all(|b| *b == 0));
        assert_eq!(decode_bank_name(&encoded).unwrap(), "Acme");
    }

    #[test]
    fn test_bank_name_overflow_rejected() {
        let long = "x".repeat(FIXED_WIDTH + 1);
        let err = encode_bank_name(&long).unwrap_err();
        assert!(matches!(err, BankError::Encoding(_)));
    }

    #[test]
    fn test_bank_name_needs_room_for_terminator() {
        let full = "x".repeat(FIXED_WIDTH);
        assert!(matches!(encode_bank_name(&full), Err(BankError::Encoding(_))));

        let longest = "x".repeat(FIXED_WIDTH - 1);
        let encoded = encode_bank_name(&longest).unwrap();
        assert_eq!(encoded[FIXED_WIDTH - 1], 0);
        assert_eq!(decode_bank_name(&encoded).unwrap(), longest);
    }

    #[test]
    fn test_empty_bank_name_decodes_empty() {
        assert_eq!(decode_bank_name(&[0u8; FIXED_WIDTH]).unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut raw = [0u8; FIXED_WIDTH];
        raw[0] = 0xff;
        raw[1] = 0xfe;
        assert!(decode_bank_name(&raw).is_err());
    }

    #[test]
    fn test_parse_amount_fractional() {
        let wei = parse_amount("1.5").unwrap();
        assert_eq!(wei, U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("   ").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_format_amount_parses_back() {
        let wei = U256::from(2_250_000_000_000_000_000u128);
        let display = format_amount(wei);
        assert!(display.starts_with("2.25"));
        assert_eq!(parse_amount(&display).unwrap(), wei);
    }
}
