use futures::StreamExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BodyReadError {
    #[error("Response too large")]
    TooLarge,
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

/// Read a response body, failing as soon as it exceeds `limit` bytes.
///
/// A `Content-Length` over the limit is rejected before any body is read.
pub async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BodyReadError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(BodyReadError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BodyReadError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
