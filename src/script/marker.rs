//! Marker matching and coinbase text rendering

/// Case-insensitive hex substring matcher for an ASCII marker
///
/// The search is an unaligned string search over hex digits, so a match may
/// straddle a byte boundary. Payloads and raw scriptSigs are searched as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatcher {
    marker: String,
    marker_hex: String,
}

impl MarkerMatcher {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            marker_hex: hex::encode(marker.as_bytes()),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Lowercase hex encoding of the marker bytes
    pub fn marker_hex(&self) -> &str {
        &self.marker_hex
    }

    /// Does `haystack_hex` contain the marker hex (ignoring case)?
    pub fn matches_hex(&self, haystack_hex: &str) -> bool {
        !haystack_hex.is_empty() && haystack_hex.to_ascii_lowercase().contains(&self.marker_hex)
    }
}

/// Render script hex as printable ASCII, other bytes as `.`
///
/// Non-hex characters are ignored; a trailing odd nibble is dropped.
pub fn hex_to_ascii(hex: &str) -> String {
    let digits: Vec<u8> = hex.bytes().filter(u8::is_ascii_hexdigit).collect();

    digits
        .chunks_exact(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
        .map(|byte| {
            if (32..=126).contains(&byte) {
                byte as char
            } else {
                '.'
            }
        })
        .collect()
}
