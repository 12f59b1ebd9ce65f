//! Error types for the storage layer.

/// Errors that can occur while reading or writing local storage.
///
/// Every storage operation is independently fallible — the device may
/// be out of space, the backing file may have been mangled by another
/// process, and so on. Callers decide what a failure means; the session
/// layer, for example, treats a failed read as "no session found".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying filesystem operation failed.
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not contain valid JSON.
    /// Usually means the file was truncated or edited by hand.
    #[error("backing file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A backend-specific failure that doesn't map to I/O or parsing.
    /// Test doubles and alternative backends use this variant.
    #[error("storage backend error: {0}")]
    Backend(String),
}
