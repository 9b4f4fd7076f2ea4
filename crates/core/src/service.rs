//! Submission, lookup and listing of payment metadata.

use crate::config::{open_store, CoreConfig};
use crate::constants::METADATA_ROUTE;
use crate::description::format_description;
use crate::{CoreError, CoreResult};
use paymeta_id::MetadataId;
use paymeta_store::{Document, DocumentStore};
use std::sync::Arc;

/// Outcome of a successful submission.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Submission {
    pub id: MetadataId,
    /// Public URL the document can be fetched from
    pub url: String,
    /// Bounded description for the payment's description field
    pub description: String,
    /// The document as stored, including its `id` field
    pub document: Document,
}

/// Pure metadata operations - no API concerns
#[derive(Clone, Debug)]
pub struct MetadataService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn DocumentStore>,
}

impl MetadataService {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<dyn DocumentStore>) -> Self {
        Self { cfg, store }
    }

    /// Opens the backend named in `cfg` and wraps it in a service.
    pub fn open(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let store = open_store(cfg.storage())?;
        Ok(Self::new(cfg, store))
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Public URL for the document with `id`.
    pub fn document_url(&self, id: &MetadataId) -> String {
        format!("{}/{}/{}", self.cfg.public_base_url(), METADATA_ROUTE, id)
    }

    /// Stores `document` under a freshly generated identifier and describes it.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidInput`] if `action` is empty or contains whitespace.
    /// - [`CoreError::Store`] if the backend write fails. No description is produced then.
    pub async fn submit(
        &self,
        document: Document,
        action: &str,
        message: Option<&str>,
    ) -> CoreResult<Submission> {
        if action.is_empty() || action.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidInput(format!(
                "action must be a single non-empty token, got '{action}'"
            )));
        }

        let id = MetadataId::new();
        let document = self.store.store(&id, document).await?;
        let url = self.document_url(&id);
        let description = format_description(action, &url, message);

        tracing::info!(%id, action, backend = self.store.backend_name(), "stored payment metadata");

        Ok(Submission {
            id,
            url,
            description,
            document,
        })
    }

    /// Fetches a document by its string identifier.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidId`] if `id` is not canonical; the backend is not consulted.
    /// - [`CoreError::NotFound`] if nothing is stored under `id`.
    /// - [`CoreError::Store`] for any other backend failure.
    pub async fn get(&self, id: &str) -> CoreResult<Document> {
        let id = MetadataId::parse(id).map_err(CoreError::InvalidId)?;
        Ok(self.store.retrieve(&id).await?)
    }

    /// All stored documents, newest first.
    pub async fn list(&self) -> CoreResult<Vec<Document>> {
        Ok(self.store.list_all().await?)
    }
}
