//! Utility functions for common operations.
//!
//! - **Text**: terminal-safe sanitizing, width-aware truncation, reading time
//! - **URL validation**: scheme checks for opening links and for the upstream base URL
//! - **Route ids**: reversible encoding of article urls for the detail view
//! - **HTTP**: size-capped response body reads

mod http;
mod route_id;
mod text;
mod url_validator;

pub use http::{read_limited_bytes, BodyReadError};
pub use route_id::{decode_route_id, encode_route_id, RouteIdError};
pub use text::{
    display_width, preview, reading_time_minutes, strip_control_chars, truncate_to_width,
    WORDS_PER_MINUTE,
};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};

/// Maximum allowed search query length, enforced by the search input.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
