use std::fmt::Write;

/// Percent-encodes arbitrary bytes, keeping only the RFC 3986 "unreserved" set.
///
/// The `info_hash` and `peer_id` tracker parameters are raw bytes, not UTF-8,
/// so they cannot go through a string-based query serializer.
/// Produces uppercase hex (e.g. "%3A" not "%3a").
pub fn url_encode_bytes(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 3);
    for &b in bytes {
        if is_unreserved(b) {
            encoded.push(b as char);
        } else {
            // writing to a String cannot fail
            let _ = write!(encoded, "%{:02X}", b);
        }
    }
    encoded
}

/// ALPHA / DIGIT / "-" / "." / "_" / "~"
/// https://datatracker.ietf.org/doc/html/rfc3986
fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'~')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_percent() {
        assert_eq!(url_encode_bytes(&[0x12, 0x34, 0x56]), "%124V");
        assert_eq!(url_encode_bytes(&[0x00, 0xff, b' ', b'/']), "%00%FF%20%2F");
    }

    #[test]
    fn test_unreserved_pass_through() {
        assert_eq!(url_encode_bytes(b"-TM0001-abc.XYZ_~"), "-TM0001-abc.XYZ_~");
    }
}
