//! Package storage for pkgreg
//!
//! This crate provides the storage backend that owns every fetched package,
//! and the archive handling needed to turn downloaded `.tgz` bytes into a
//! `Package` (reading the dependency declaration from its package.json).

pub mod storage;
pub mod tarball;

// Re-export main types
pub use storage::{InMemoryStorage, PackageStorage, StorageStats};
pub use tarball::{
    create_package_tarball, create_tarball, extract_dependencies, package_from_tarball,
    read_manifest,
};

use pkgreg_core::error::RegistryError;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, RegistryError>;
