//! The storage seam: a minimal async key-value contract.

use crate::StoreError;

/// Asynchronous key-value storage of opaque strings.
///
/// This is the only persistence contract the rest of the client depends
/// on. Keeping it tiny — three operations, strings in and strings out —
/// means any platform storage (a JSON file, app preferences, an embedded
/// database) can sit behind it, and tests can swap in an in-memory map
/// or a deliberately failing double.
///
/// # Trait bounds
///
/// - `Send + Sync` → a store can be shared across async tasks.
/// - `'static` → it doesn't borrow temporary data; stores live as long
///   as the component that owns them.
///
/// # Example
///
/// ```rust
/// use beamdrop_store::{KeyValueStore, MemoryStore};
///
/// # async fn demo() -> Result<(), beamdrop_store::StoreError> {
/// let store = MemoryStore::new();
/// store.set("greeting", "hello").await?;
/// assert_eq!(store.get("greeting").await?, Some("hello".to_string()));
/// store.remove("greeting").await?;
/// assert_eq!(store.get("greeting").await?, None);
/// # Ok(())
/// # }
/// ```
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    ///
    /// An absent key is `Ok(None)`, never an error — "nothing stored"
    /// is a normal answer, not a failure.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Deletes the value stored under `key`.
    ///
    /// Removing an absent key is `Ok(())` — the operation is idempotent.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}
