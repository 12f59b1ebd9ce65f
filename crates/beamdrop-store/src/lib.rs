//! Durable local key-value storage for the Beamdrop client.
//!
//! On a phone this role is played by the platform's app-local storage.
//! Here it's a trait, [`KeyValueStore`], with two implementations:
//!
//! 1. **[`MemoryStore`]** — a shared in-memory map. Cloning it shares the
//!    underlying data, which lets tests simulate "app restart against the
//!    same device storage" by building a fresh consumer over a clone.
//! 2. **[`FileStore`]** — a single JSON file on disk. This is what the
//!    demo binary uses for real persistence.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session Layer (above)  ← caches the signed-in user, gates the UI
//!     ↕
//! Storage Layer (this crate)  ← get/set/remove of opaque strings
//! ```
//!
//! The storage layer knows nothing about sessions. It stores strings
//! under string keys; what those strings mean is the caller's business.

#![allow(async_fn_in_trait)]

mod error;
mod file;
mod kv;
mod memory;

pub use error::StoreError;
pub use file::FileStore;
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
