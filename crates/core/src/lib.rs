//! # Paymeta Core
//!
//! Core business logic for the payment-metadata service.
//!
//! This crate ties the identifier codec and document storage together:
//! - Runtime configuration resolved once at startup ([`CoreConfig`])
//! - Backend selection ([`open_store`])
//! - Submission, lookup and listing ([`MetadataService`])
//! - Bounded payment descriptions ([`format_description`])
//!
//! **No API concerns**: HTTP routing, authentication and request parsing belong in the
//! binaries.

pub mod config;
pub mod constants;
pub mod description;
mod error;
mod service;

pub use config::{
    open_store, storage_kind_from_env_value, CoreConfig, StorageKind, StorageSettings,
};
pub use constants::DEFAULT_DATA_DIR;
pub use description::format_description;
pub use error::{CoreError, CoreResult};
pub use service::{MetadataService, Submission};

pub use paymeta_id::MetadataId;
pub use paymeta_store::{Document, DocumentStore, S3Settings};
