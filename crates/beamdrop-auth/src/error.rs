//! Error types for the auth client.

/// Errors that can occur while talking to the authentication backend.
///
/// These *are* surfaced to the user (as toast messages on the login and
/// register screens), unlike session-cache errors, so the rejection
/// variant carries the human-readable message the backend sent.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request never produced a usable response: connection refused,
    /// DNS failure, timeout, or an unparseable body.
    #[error("could not reach the authentication backend: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status — wrong password,
    /// email already registered, expired token, and so on.
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
        /// The backend's `message` field, or a generic fallback when
        /// the error body had none.
        message: String,
    },
}
