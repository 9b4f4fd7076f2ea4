//! Backend-independent storage contract.

use crate::{Document, StoreResult};
use async_trait::async_trait;
use paymeta_id::MetadataId;

/// Store, retrieve and enumerate documents keyed by identifier.
///
/// Implemented by [`crate::LocalStore`] and [`crate::ObjectStoreBackend`]. The backend is
/// chosen once at startup and held as `Arc<dyn DocumentStore>`; callers never need to know
/// which one they have.
///
/// No operation imposes timeouts or retries. Those belong to the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Persists `document` under `id`, replacing any existing document.
    ///
    /// The document is tagged with an `id` field before writing; the tagged copy is returned.
    async fn store(&self, id: &MetadataId, document: Document) -> StoreResult<Document>;

    /// Reads the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NotFound`] when nothing is stored under `id`; any other
    /// error is a backend failure.
    async fn retrieve(&self, id: &MetadataId) -> StoreResult<Document>;

    /// Returns every readable document, newest identifier first.
    ///
    /// Entries that cannot be read or parsed are skipped.
    async fn list_all(&self) -> StoreResult<Vec<Document>>;

    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;
}
