//! # Hex Encoding
//!
//! Lowercase hex rendering of byte strings. Offer-token signatures travel
//! as hex in URLs and are compared as strings, never decoded.

/// Render bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// First four bytes as hex, for `Debug` output of key material.
pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_and_zero_padded() {
        assert_eq!(to_hex(&[0x00, 0x0f, 0xa0, 0xff]), "000fa0ff");
        assert_eq!(to_hex(&[]), "");
    }

    #[test]
    fn prefix_is_first_four_bytes() {
        assert_eq!(hex_prefix(&[0xde, 0xad, 0xbe, 0xef, 0x01]), "deadbeef");
        assert_eq!(hex_prefix(&[0x0a]), "0a");
    }
}
