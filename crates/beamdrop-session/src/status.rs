//! The auth-state machine observed by the rest of the client.

use crate::Session;

/// The current authentication state of the client.
///
/// This is a state machine with four states:
///
/// ```text
///   Uninitialized ──(load starts)──→ Loading
///                                       │
///                      ┌────────────────┴────────────────┐
///                      ▼                                 ▼
///               Authenticated ◄──(sign in)──────── Unauthenticated
///                      └───────(sign out)──────────────►─┘
/// ```
///
/// - **Uninitialized**: The cache exists but hasn't been asked to load
///   yet. Nothing should render off this state.
/// - **Loading**: The startup read of local storage is in flight. The
///   navigation layer must show a splash/placeholder here — defaulting
///   to the signed-out screens would flash a login page at users who
///   are about to be restored to a signed-in state.
/// - **Authenticated**: A valid session record is held in memory.
/// - **Unauthenticated**: No session (or only an invalid one was found).
///
/// `Loading` is visited exactly once, at startup, and never re-entered:
/// later re-reads (`refresh`) go straight from one settled state to
/// another so consumers see at most one `Loading → settled` transition
/// per process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// `load` has not been called yet.
    Uninitialized,

    /// The startup storage read is in flight.
    Loading,

    /// A valid session is held; the user is signed in.
    Authenticated(Session),

    /// No valid session; the user is signed out.
    Unauthenticated,
}

impl SessionStatus {
    /// Returns `true` if the startup load is still in flight (or hasn't
    /// started). Consumers should gate on this rather than racing it.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    /// Returns `true` once the machine has reached a terminal
    /// authenticated/unauthenticated state.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Unauthenticated)
    }

    /// Returns `true` if the user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the session record, if signed in.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    /// Returns `true` if moving to `target` is a legal transition.
    ///
    /// The settled states swap freely between each other (sign in, sign
    /// out, replace account); `Uninitialized` and `Loading` can never be
    /// re-entered.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        match (self, target) {
            (Self::Uninitialized, Self::Loading) => true,
            (Self::Loading, s) if s.is_settled() => true,
            (s, t) if s.is_settled() && t.is_settled() => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Loading => write!(f, "Loading"),
            Self::Authenticated(session) => {
                write!(f, "Authenticated({session})")
            }
            Self::Unauthenticated => write!(f, "Unauthenticated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authed() -> SessionStatus {
        SessionStatus::Authenticated(Session::new("a@b.com", "tok1"))
    }

    #[test]
    fn test_can_transition_to_follows_lifecycle() {
        let uninit = SessionStatus::Uninitialized;
        let loading = SessionStatus::Loading;
        let unauth = SessionStatus::Unauthenticated;

        assert!(uninit.can_transition_to(&loading));
        assert!(loading.can_transition_to(&authed()));
        assert!(loading.can_transition_to(&unauth));
        assert!(authed().can_transition_to(&unauth));
        assert!(unauth.can_transition_to(&authed()));
        // Replacing one account with another is a legal settled swap.
        assert!(authed().can_transition_to(&authed()));
    }

    #[test]
    fn test_can_transition_to_never_re_enters_loading() {
        let loading = SessionStatus::Loading;
        let unauth = SessionStatus::Unauthenticated;

        assert!(!authed().can_transition_to(&loading));
        assert!(!unauth.can_transition_to(&loading));
        assert!(!authed().can_transition_to(&SessionStatus::Uninitialized));
        assert!(!SessionStatus::Uninitialized.can_transition_to(&unauth));
    }

    #[test]
    fn test_is_loading_covers_both_pre_settled_states() {
        assert!(SessionStatus::Uninitialized.is_loading());
        assert!(SessionStatus::Loading.is_loading());
        assert!(!authed().is_loading());
        assert!(!SessionStatus::Unauthenticated.is_loading());
    }

    #[test]
    fn test_session_accessor_only_on_authenticated() {
        assert!(authed().session().is_some());
        assert!(SessionStatus::Unauthenticated.session().is_none());
        assert!(SessionStatus::Loading.session().is_none());
    }

    #[test]
    fn test_display_does_not_leak_token() {
        let shown = authed().to_string();

        assert_eq!(shown, "Authenticated(a@b.com)");
    }
}
