//! Dynamic-value fetch error types.

use thiserror::Error;

/// Errors raised while fetching dynamic values for a single field.
///
/// These never escape the fetch cascade; each one is recorded on the field's
/// [`DynamicValues`](crate::evaluation::DynamicValues) state instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP transport error: {0}")]
    Transport(String),
    #[error("Unexpected response status: {0}")]
    UnexpectedStatus(u16),
    #[error("Malformed response body: {0}")]
    MalformedBody(String),
    #[error("HTTP client build error: {0}")]
    ClientBuild(String),
}
