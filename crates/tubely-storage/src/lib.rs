//! Tubely Storage Library
//!
//! This crate provides the storage abstraction uploads are written through and
//! its three implementations: embedded data URIs, the local filesystem, and S3.
//!
//! # Storage key format
//!
//! `{orientation}/{random}.{ext}` for videos, `{random}.{ext}` for thumbnails,
//! where `random` is 32 random bytes in unpadded URL-safe base64. Keys must not
//! contain `..` or a leading `/`. Key generation lives in the `keys` module so
//! every backend sees the same layout.

pub mod embedded;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use embedded::EmbeddedStorage;
pub use factory::create_storage;
pub use keys::KeyGenerator;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteSource, Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
