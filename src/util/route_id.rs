//! Reversible article addressing for the detail view.
//!
//! An article url is turned into a single path-segment-safe token by
//! percent-encoding every byte that is not ASCII alphanumeric. The token
//! decodes back to the exact url.
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteIdError {
    #[error("Route id is empty")]
    Empty,
    #[error("Route id does not decode to UTF-8")]
    InvalidUtf8,
}

/// Encode an article url as a route segment.
pub fn encode_route_id(url: &str) -> String {
    utf8_percent_encode(url, NON_ALPHANUMERIC).to_string()
}

/// Decode a route segment produced by [`encode_route_id`].
pub fn decode_route_id(id: &str) -> Result<String, RouteIdError> {
    if id.is_empty() {
        return Err(RouteIdError::Empty);
    }
    percent_decode_str(id)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| RouteIdError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_id_is_single_segment() {
        let id = encode_route_id("https://example.com/a/b?c=d#e");
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '%'));
        assert!(!id.contains('/'));
    }

    #[test]
    fn test_round_trip_with_unicode() {
        let url = "https://example.com/nachrichten/über?q=ß&x=1 2";
        assert_eq!(decode_route_id(&encode_route_id(url)).unwrap(), url);
    }

    #[test]
    fn test_decode_rejects_empty() {
        assert_eq!(decode_route_id(""), Err(RouteIdError::Empty));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        assert_eq!(decode_route_id("%FF%FE"), Err(RouteIdError::InvalidUtf8));
    }
}
