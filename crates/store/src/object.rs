//! Networked object store backend
//!
//! Each document is one object whose key is the storage key (no bucket prefix) and whose
//! body is the JSON bytes, tagged `Content-Type: application/json`.
//!
//! Listing issues one `LIST` followed by one `GET` per key. That is O(n) round trips with no
//! batching; large buckets will list slowly.

use crate::keys::{id_from_key, newest_first, storage_key, DOCUMENT_EXTENSION, JSON_CONTENT_TYPE};
use crate::{Document, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, PutOptions, PutPayload};
use paymeta_id::MetadataId;
use std::sync::Arc;

/// Connection settings for an S3-compatible bucket.
///
/// Built once at startup; nothing here is read from the environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, R2, ...)
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Document store backed by any [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct ObjectStoreBackend {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// Connects to an S3-compatible bucket.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSettings`] if no bucket is named, or
    /// [`StoreError::ObjectStore`] if the client cannot be built from the settings.
    pub fn s3(settings: &S3Settings) -> StoreResult<Self> {
        if settings.bucket.trim().is_empty() {
            return Err(StoreError::InvalidSettings("bucket name cannot be empty".into()));
        }

        let mut builder = AmazonS3Builder::new().with_bucket_name(&settings.bucket);

        if let Some(region) = &settings.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &settings.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        if let Some(key) = &settings.access_key_id {
            builder = builder.with_access_key_id(key);
        }
        if let Some(secret) = &settings.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }

        Ok(Self::new(Arc::new(builder.build()?)))
    }

    async fn read_entry(&self, meta: &ObjectMeta) -> StoreResult<Option<(MetadataId, Document)>> {
        let key: &str = meta.location.as_ref();
        let Some(id) = id_from_key(key) else {
            return Ok(None);
        };
        let bytes = self.inner.get(&meta.location).await?.bytes().await?;
        let document = Document::from_json_bytes(&bytes)?;
        Ok(Some((id, document)))
    }
}

#[async_trait]
impl DocumentStore for ObjectStoreBackend {
    async fn store(&self, id: &MetadataId, document: Document) -> StoreResult<Document> {
        let key = storage_key(id)?;
        let document = document.with_id(id);
        let payload = PutPayload::from(document.to_json_bytes()?);

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, JSON_CONTENT_TYPE.into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.inner
            .put_opts(&ObjectPath::from(key.as_str()), payload, opts)
            .await?;

        tracing::debug!(%id, key = %key, "stored document");
        Ok(document)
    }

    async fn retrieve(&self, id: &MetadataId) -> StoreResult<Document> {
        let key = storage_key(id)?;

        let result = match self.inner.get(&ObjectPath::from(key.as_str())).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;

        Ok(Document::from_json_bytes(&bytes)?.with_id(id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Document>> {
        let metas: Vec<ObjectMeta> = self.inner.list(None).try_collect().await?;

        let mut entries = Vec::new();
        for meta in metas.iter().filter(|m| {
            let key: &str = m.location.as_ref();
            key.ends_with(DOCUMENT_EXTENSION)
        }) {
            match self.read_entry(meta).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {
                    tracing::warn!("skipping object without identifier: {}", meta.location);
                }
                Err(e) => {
                    tracing::warn!("skipping unreadable object {}: {}", meta.location, e);
                }
            }
        }

        Ok(newest_first(entries))
    }

    fn backend_name(&self) -> &'static str {
        "object"
    }
}
