//! Error types for the API client.

/// Errors that can occur when making a single API request.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a usable response (network error, timeout,
    /// unreadable body, or an invalid URL).
    #[error("Request failed: {0}")]
    RequestFailed(String),
    /// The API returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
}
