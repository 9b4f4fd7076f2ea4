//! Storage key derivation shared by both backends.

use crate::{Document, StoreResult};
use paymeta_id::MetadataId;

/// File extension for stored documents.
pub const DOCUMENT_EXTENSION: &str = ".json";

/// Field every stored document is tagged with.
pub const ID_FIELD: &str = "id";

/// Content type attached to objects in the object store.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Returns `YYYY/MM/DD/<id>.json` for `id`.
///
/// The date is the UTC day of the identifier's embedded timestamp. The same string is used as
/// a relative path by [`crate::LocalStore`] and as the object key by
/// [`crate::ObjectStoreBackend`].
pub fn storage_key(id: &MetadataId) -> StoreResult<String> {
    Ok(format!(
        "{}/{}{}",
        id.date_partition()?,
        id,
        DOCUMENT_EXTENSION
    ))
}

/// Recovers the identifier from a storage key or bare file name.
///
/// Returns `None` unless the last path segment is `<canonical id>.json`.
pub fn id_from_key(key: &str) -> Option<MetadataId> {
    let file_name = key.rsplit('/').next()?;
    let stem = file_name.strip_suffix(DOCUMENT_EXTENSION)?;
    MetadataId::parse(stem).ok()
}

/// Orders listed entries newest first by their key-derived identifier.
///
/// The key is authoritative: each document's `id` field is re-tagged from it, so content that
/// disagrees with its location cannot affect ordering or lookups.
pub(crate) fn newest_first(mut entries: Vec<(MetadataId, Document)>) -> Vec<Document> {
    entries.sort_by(|a, b| b.0.cmp(&a.0));
    entries
        .into_iter()
        .map(|(id, document)| document.with_id(&id))
        .collect()
}
