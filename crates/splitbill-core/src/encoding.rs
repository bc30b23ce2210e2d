//! Lowercase hex helpers for fixed-width byte values.

use crate::error::ValidationError;

/// Render bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// First four bytes as hex, for `Debug` output.
pub fn hex_prefix(bytes: &[u8]) -> String {
    to_hex(&bytes[..bytes.len().min(4)])
}

/// Decode exactly `N` bytes from a hex string (case-insensitive, trimmed).
pub fn hex_to_array<const N: usize>(
    what: &'static str,
    hex: &str,
) -> Result<[u8; N], ValidationError> {
    let hex = hex.trim();
    if hex.len() != N * 2 {
        return Err(ValidationError::InvalidHex {
            what,
            reason: format!("expected {} chars, got {}", N * 2, hex.len()),
        });
    }
    if let Some(pos) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidHex {
            what,
            reason: format!("non-hex character at position {pos}"),
        });
    }
    let mut out = [0u8; N];
    for (i, slot) in out.iter_mut().enumerate() {
        let pair = &hex[i * 2..i * 2 + 2];
        *slot = u8::from_str_radix(pair, 16).map_err(|e| ValidationError::InvalidHex {
            what,
            reason: format!("invalid hex at position {}: {e}", i * 2),
        })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_mixed_case() {
        let arr: [u8; 2] = hex_to_array("test", "aBfF").unwrap();
        assert_eq!(arr, [0xab, 0xff]);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(hex_to_array::<4>("test", "aabb").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        assert!(hex_to_array::<2>("test", "zzzz").is_err());
    }

    #[test]
    fn rejects_multibyte_chars_without_panicking() {
        assert!(hex_to_array::<2>("test", "aé1").is_err());
    }

    #[test]
    fn rejects_sign_prefix() {
        assert!(hex_to_array::<1>("test", "+a").is_err());
    }

    #[test]
    fn prefix_is_four_bytes() {
        assert_eq!(hex_prefix(&[1, 2, 3, 4, 5, 6]), "01020304");
        assert_eq!(hex_prefix(&[1]), "01");
    }
}
