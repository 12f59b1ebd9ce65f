//! Session management for the Beamdrop client.
//!
//! This crate is the single source of truth for "is a user signed in,
//! and with what credentials". It handles:
//!
//! 1. **The session record** — who the user is plus their bearer token
//!    ([`Session`])
//! 2. **The auth-state machine** — loading vs. signed in vs. signed out
//!    ([`SessionStatus`])
//! 3. **Caching and persistence** — load at startup, write-through on
//!    change, self-healing on corrupt data ([`SessionCache`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Navigation Layer (above)  ← picks the signed-in or signed-out screen set
//!     ↕ (watch subscription)
//! Session Layer (this crate)  ← owns the session record and its lifecycle
//!     ↕
//! Storage Layer (below)  ← durable key-value storage (beamdrop-store)
//! ```
//!
//! The session layer never talks to the network. Signing in happens
//! elsewhere (`beamdrop-auth`); the successful result is handed to
//! [`SessionCache::set_session`], and this crate takes it from there.

mod cache;
mod error;
mod session;
mod status;

pub use cache::SessionCache;
pub use error::SessionError;
pub use session::Session;
pub use status::SessionStatus;
