//! The session record: the signed-in user's identity and credential.

use serde::{Deserialize, Serialize};

/// A signed-in user's identity plus their bearer token.
///
/// This is the one record the client persists locally. It is stored as
/// a single serialized JSON blob under one storage key — earlier client
/// versions scattered the fields across separate keys, which made
/// partial writes possible; the single-blob form can't be half-written.
///
/// `email` and `token` are required; a record missing either is not a
/// session (see [`is_valid`](Session::is_valid)). `id` and `name` are
/// optional because the backend only started returning them later, and
/// records persisted by older clients must still deserialize.
///
/// The token is an opaque bearer credential. The client stores it and
/// presents it to the backend; it never inspects or interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-assigned user identifier, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The account's email address. Required.
    pub email: String,

    /// Opaque bearer token for authorizing backend requests. Required.
    pub token: String,
}

impl Session {
    /// Creates a session with the two required fields.
    pub fn new(email: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            email: email.into(),
            token: token.into(),
        }
    }

    /// Sets the backend-assigned user identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns `true` if this record satisfies the session invariant:
    /// non-empty `email` and non-empty `token`.
    ///
    /// The cache checks this on every read and write. Anything that
    /// fails it is treated as corruption, never as a signed-in user.
    pub fn is_valid(&self) -> bool {
        !self.email.is_empty() && !self.token.is_empty()
    }
}

/// Displays the email only — never the token. Sessions end up in log
/// lines, and a bearer token in a log file is a credential leak.
impl std::fmt::Display for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.email)
    }
}
