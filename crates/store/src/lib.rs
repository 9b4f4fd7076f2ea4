//! Payment metadata document storage
//!
//! This crate persists payment-metadata documents keyed by a [`MetadataId`] and reads them
//! back, through one of two interchangeable backends behind the [`DocumentStore`] trait:
//!
//! - [`LocalStore`]: one JSON file per document under a root directory
//! - [`ObjectStoreBackend`]: one object per document in an S3-compatible bucket
//!
//! ## Storage layout
//!
//! Both backends use the same key, derived only from the identifier:
//!
//! ```text
//! <root or bucket>/
//! └── 2023/
//!     └── 11/
//!         └── 14/
//!             └── 01HF7YAT00FAY828T5CY4TQKFF.json
//! ```
//!
//! The date is the UTC day of the timestamp embedded in the identifier. Every stored document
//! carries an `id` field equal to its identifier.
//!
//! ## Guarantees
//!
//! - Concurrent writes to different identifiers never interfere.
//! - Concurrent writes to the same identifier are last-write-wins.
//! - Writes are not atomic; a crash mid-write can leave a partial file, which listing skips.
//! - Listing is lossy but available: unreadable entries are logged and skipped.
//!
//! ## Example Usage
//!
//! ```no_run
//! use paymeta_store::{Document, DocumentStore, LocalStore, MetadataId};
//!
//! # async fn run() -> Result<(), paymeta_store::StoreError> {
//! let store = LocalStore::new("metadata_data")?;
//! let id = MetadataId::new();
//!
//! let stored = store.store(&id, Document::new()).await?;
//! assert_eq!(stored.id(), Some(id.to_string().as_str()));
//! # Ok(())
//! # }
//! ```

mod document;
mod keys;
mod local;
mod object;
mod traits;

pub use document::Document;
pub use keys::{id_from_key, storage_key, DOCUMENT_EXTENSION, ID_FIELD, JSON_CONTENT_TYPE};
pub use local::LocalStore;
pub use object::{ObjectStoreBackend, S3Settings};
pub use paymeta_id::MetadataId;
pub use traits::DocumentStore;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists for the identifier
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// Root directory is unusable
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Backend settings are unusable
    #[error("invalid storage settings: {0}")]
    InvalidSettings(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Object store request failed for a reason other than a missing key
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("failed to serialize document: {0}")]
    Serialization(serde_json::Error),

    #[error("failed to deserialize document: {0}")]
    Deserialization(serde_json::Error),

    /// Documents must be JSON objects
    #[error("document must be a JSON object")]
    NotAnObject,

    /// Identifier error from paymeta-id crate
    #[error("identifier error: {0}")]
    Id(#[from] paymeta_id::IdError),
}

impl StoreError {
    /// True when the failure means "no such document" rather than a backend fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
