//! Tubely Core Library
//!
//! This crate provides the domain models, error taxonomy, and configuration
//! shared by every Tubely component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ServerConfig, StorageConfig, TubelyConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AssetKind, Orientation, Video};
pub use storage_types::StorageBackend;
