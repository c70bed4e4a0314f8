//! Package storage backend
//!
//! The durable cache of the registry. Storage is grow-only: packages are
//! written once after a successful fetch and never evicted.

use std::collections::HashSet;

use dashmap::DashMap;
use pkgreg_core::types::{core_tuple, Package, PackageId};
use tracing::debug;

/// Storage backend for fetched packages.
///
/// Implementations must be safe for concurrent reads and writes.
pub trait PackageStorage: Send + Sync {
    /// Get a package by its identity
    fn get(&self, id: &PackageId) -> Option<Package>;

    /// All stored versions of a package, in ascending version order
    fn all_versions(&self, name: &str) -> Vec<Package>;

    /// Create or replace a package
    fn put(&self, package: Package);

    /// Check if a package identity is stored
    fn exists(&self, id: &PackageId) -> bool;

    /// Storage statistics
    fn stats(&self) -> StorageStats;
}

/// In-memory package storage
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    packages: DashMap<PackageId, Package>,
}

impl InMemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            packages: DashMap::new(),
        }
    }
}

impl PackageStorage for InMemoryStorage {
    fn get(&self, id: &PackageId) -> Option<Package> {
        self.packages.get(id).map(|entry| entry.value().clone())
    }

    fn all_versions(&self, name: &str) -> Vec<Package> {
        let mut versions: Vec<Package> = self
            .packages
            .iter()
            .filter(|entry| entry.key().name == name)
            .map(|entry| entry.value().clone())
            .collect();

        versions.sort_by(|a, b| {
            (core_tuple(a.version()), a.is_stable(), a.version())
                .cmp(&(core_tuple(b.version()), b.is_stable(), b.version()))
        });
        versions
    }

    fn put(&self, package: Package) {
        debug!(package = %package.id(), "Storing package");
        self.packages.insert(package.id().clone(), package);
    }

    fn exists(&self, id: &PackageId) -> bool {
        self.packages.contains_key(id)
    }

    fn stats(&self) -> StorageStats {
        let names: HashSet<String> = self
            .packages
            .iter()
            .map(|entry| entry.key().name.clone())
            .collect();

        StorageStats {
            total_packages: self.packages.len(),
            distinct_names: names.len(),
        }
    }
}

/// Storage statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored package versions
    pub total_packages: usize,
    /// Number of distinct package names
    pub distinct_names: usize,
}
