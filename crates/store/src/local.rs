//! Local filesystem backend
//!
//! Stores each document as a pretty-printed UTF-8 JSON file at
//! `<root>/<YYYY>/<MM>/<DD>/<id>.json`.
//!
//! # Implementation Notes
//!
//! - Partition directories are created on demand with `create_dir_all`, which is idempotent
//!   and safe under concurrent writers.
//! - Files are written in place. There is no temp-file-and-rename step, so a crash mid-write
//!   may leave a truncated file; [`LocalStore::list_all`](crate::DocumentStore::list_all)
//!   skips it.
//! - Listing walks the tree iteratively with an explicit stack of directories.

use crate::keys::{id_from_key, newest_first, storage_key, DOCUMENT_EXTENSION};
use crate::{Document, DocumentStore, StoreError, StoreResult};
use async_trait::async_trait;
use paymeta_id::MetadataId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Document store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Root directory containing the date partitions
    root_directory: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at `root_directory`, creating the directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRootDirectory`] if the path exists but is not a directory
    /// or cannot be created.
    pub fn new(root_directory: impl Into<PathBuf>) -> StoreResult<Self> {
        let root_directory = root_directory.into();

        if root_directory.exists() && !root_directory.is_dir() {
            return Err(StoreError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root_directory.display()
            )));
        }

        std::fs::create_dir_all(&root_directory).map_err(|e| {
            StoreError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        Ok(Self { root_directory })
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// Absolute path of the file holding `id`.
    pub fn document_path(&self, id: &MetadataId) -> StoreResult<PathBuf> {
        let key = storage_key(id)?;
        Ok(key
            .split('/')
            .fold(self.root_directory.clone(), |path, segment| path.join(segment)))
    }

    async fn read_entry(path: &Path) -> StoreResult<Option<(MetadataId, Document)>> {
        let Some(id) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(id_from_key)
        else {
            return Ok(None);
        };
        let bytes = fs::read(path).await?;
        let document = Document::from_json_bytes(&bytes)?;
        Ok(Some((id, document)))
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    async fn store(&self, id: &MetadataId, document: Document) -> StoreResult<Document> {
        let path = self.document_path(id)?;
        let document = document.with_id(id);
        let bytes = document.to_json_bytes()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create partition {}: {}", parent.display(), e),
                ))
            })?;
        }

        fs::write(&path, &bytes).await.map_err(|e| {
            StoreError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write document to {}: {}", path.display(), e),
            ))
        })?;

        tracing::debug!(%id, path = %path.display(), "stored document");
        Ok(document)
    }

    async fn retrieve(&self, id: &MetadataId) -> StoreResult<Document> {
        let path = self.document_path(id)?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() });
            }
            Err(e) => {
                return Err(StoreError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read document from {}: {}", path.display(), e),
                )));
            }
        };

        Ok(Document::from_json_bytes(&bytes)?.with_id(id))
    }

    async fn list_all(&self) -> StoreResult<Vec<Document>> {
        let mut entries = Vec::new();
        let mut pending = vec![self.root_directory.clone()];

        while let Some(dir) = pending.pop() {
            let mut read_dir = match fs::read_dir(&dir).await {
                Ok(it) => it,
                Err(e) => {
                    tracing::warn!("skipping unreadable directory {}: {}", dir.display(), e);
                    continue;
                }
            };

            loop {
                let entry = match read_dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("failed to read entry in {}: {}", dir.display(), e);
                        break;
                    }
                };
                let path = entry.path();
                let file_type = match entry.file_type().await {
                    Ok(ft) => ft,
                    Err(_) => continue,
                };

                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }

                let is_document = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(DOCUMENT_EXTENSION));
                if !file_type.is_file() || !is_document {
                    continue;
                }

                match Self::read_entry(&path).await {
                    Ok(Some(entry)) => entries.push(entry),
                    Ok(None) => {
                        tracing::warn!("skipping file without identifier: {}", path.display());
                    }
                    Err(e) => {
                        tracing::warn!("skipping unreadable document {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(newest_first(entries))
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample_document() -> Document {
        Document::try_from(json!({
            "podcast": "Example Cast",
            "episode": "42",
            "amount_msat": 21000,
        }))
        .unwrap()
    }

    fn new_store(temp: &TempDir) -> LocalStore {
        LocalStore::new(temp.path().join("metadata")).unwrap()
    }

    async fn ids_in_order(count: usize) -> Vec<MetadataId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(MetadataId::new());
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        ids
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("a").join("b");

        let store = LocalStore::new(&root).unwrap();

        assert!(root.is_dir());
        assert_eq!(store.root_directory(), root.as_path());
    }

    #[test]
    fn test_new_rejects_file_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("file.txt");
        std::fs::write(&root, "not a directory").unwrap();

        let result = LocalStore::new(&root);

        assert!(matches!(result, Err(StoreError::InvalidRootDirectory(_))));
    }

    #[test]
    fn test_document_path_layout() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::parse("01HF7YAT00FAY828T5CY4TQKFF").unwrap();

        let path = store.document_path(&id).unwrap();

        assert_eq!(
            path,
            store
                .root_directory()
                .join("2023")
                .join("11")
                .join("14")
                .join("01HF7YAT00FAY828T5CY4TQKFF.json")
        );
    }

    #[tokio::test]
    async fn test_store_then_retrieve() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();

        let stored = store.store(&id, sample_document()).await.unwrap();
        let retrieved = store.retrieve(&id).await.unwrap();

        assert_eq!(retrieved, stored);
        assert_eq!(retrieved.id(), Some(id.to_string().as_str()));
        assert_eq!(retrieved.get("amount_msat"), Some(&json!(21000)));
    }

    #[tokio::test]
    async fn test_store_writes_partition_file() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();

        store.store(&id, sample_document()).await.unwrap();

        let path = store.document_path(&id).unwrap();
        assert!(path.is_file());
        let on_disk: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk["id"], json!(id.to_string()));
    }

    #[tokio::test]
    async fn test_store_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();

        store.store(&id, sample_document()).await.unwrap();
        let mut replacement = Document::new();
        replacement.insert("podcast", "Replaced");
        store.store(&id, replacement).await.unwrap();

        let retrieved = store.retrieve(&id).await.unwrap();
        assert_eq!(retrieved.get_str("podcast"), Some("Replaced"));
        assert_eq!(retrieved.get("episode"), None);
    }

    #[tokio::test]
    async fn test_retrieve_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);

        let result = store.retrieve(&MetadataId::new()).await;

        match result {
            Err(e) => assert!(e.is_not_found(), "expected NotFound, got {e:?}"),
            Ok(_) => panic!("expected NotFound"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_corrupt_file_is_not_not_found() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();
        let path = store.document_path(&id).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ truncated").unwrap();

        let result = store.retrieve(&id).await;

        assert!(matches!(result, Err(StoreError::Deserialization(_))));
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let ids = ids_in_order(3).await;

        // Store out of order to make sure sorting does the work.
        for id in [&ids[1], &ids[0], &ids[2]] {
            store.store(id, sample_document()).await.unwrap();
        }

        let listed = store.list_all().await.unwrap();
        let listed_ids: Vec<String> = listed
            .iter()
            .filter_map(|d| d.id().map(str::to_owned))
            .collect();
        let expected: Vec<String> = ids.iter().rev().map(ToString::to_string).collect();

        assert_eq!(listed_ids, expected);
    }

    #[tokio::test]
    async fn test_list_all_skips_bad_entries() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();
        store.store(&id, sample_document()).await.unwrap();

        let partition = store.document_path(&id).unwrap();
        let partition = partition.parent().unwrap();
        let broken = MetadataId::new();
        std::fs::write(partition.join(format!("{broken}.json")), "{ truncated").unwrap();
        std::fs::write(partition.join("notes.json"), "{}").unwrap();
        std::fs::write(partition.join("README.txt"), "ignored").unwrap();

        let listed = store.list_all().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), Some(id.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_list_all_uses_key_not_content_id() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);
        let id = MetadataId::new();
        let path = store.document_path(&id).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"id": "ZZZZZZZZZZZZZZZZZZZZZZZZZZ"}"#).unwrap();

        let listed = store.list_all().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id(), Some(id.to_string().as_str()));
    }

    #[tokio::test]
    async fn test_list_all_empty_root() {
        let temp = TempDir::new().unwrap();
        let store = new_store(&temp);

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_stores_distinct_ids() {
        let temp = TempDir::new().unwrap();
        let store = Arc::new(new_store(&temp));

        let mut handles = Vec::new();
        for n in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let id = MetadataId::new();
                let mut doc = Document::new();
                doc.insert("n", n);
                store.store(&id, doc).await.unwrap();
                (id, n)
            }));
        }

        for handle in handles {
            let (id, n) = handle.await.unwrap();
            let doc = store.retrieve(&id).await.unwrap();
            assert_eq!(doc.get("n"), Some(&json!(n)));
        }
        assert_eq!(store.list_all().await.unwrap().len(), 16);
    }
}
