//! Error types for the session layer.

/// Errors that can occur when using the session cache.
///
/// Note what is *not* here: storage failures. The cache's contract is
/// that storage problems degrade gracefully (a failed read means "no
/// session", a failed write is logged and the in-memory state still
/// wins) rather than propagating into the UI layer. The variants below
/// all describe contract misuse by the caller.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// `load` was called a second time. The startup load runs exactly
    /// once per cache lifetime; use `refresh` to re-read storage later.
    #[error("session cache was already loaded")]
    AlreadyLoaded,

    /// An operation that requires a settled cache ran before `load`
    /// completed.
    #[error("session cache has not finished loading yet")]
    NotLoaded,

    /// The caller tried to store a session record that fails the
    /// validity invariant (empty email or token). An incomplete record
    /// must never become a "signed in" state.
    #[error("refusing to store an incomplete session record")]
    InvalidRecord,
}
