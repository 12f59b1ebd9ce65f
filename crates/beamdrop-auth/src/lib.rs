//! REST client for the Beamdrop authentication backend.
//!
//! This crate is the network half of signing in: it talks to the
//! backend's `/auth/*` endpoints and turns a successful response into a
//! [`Session`](beamdrop_session::Session) ready to hand to the session
//! cache. It holds no state of its own beyond an HTTP connection pool —
//! persistence and the auth-state machine live in `beamdrop-session`.
//!
//! ```text
//! Login/Register screens
//!     │  login(email, password)
//!     ▼
//! AuthClient (this crate)  ──HTTP──►  Beamdrop backend
//!     │  AuthResponse::into_session()
//!     ▼
//! SessionCache::set_session(...)
//! ```

mod client;
mod error;

pub use client::{AuthClient, AuthResponse, AuthUser};
pub use error::AuthError;
