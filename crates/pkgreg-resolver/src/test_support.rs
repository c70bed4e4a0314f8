//! Shared fixtures for resolver tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use pkgreg_core::error::RegistryError;
use pkgreg_core::{Package, PackageId};
use pkgreg_retriever::{PackageRetriever, RetrieverResult};
use pkgreg_store::create_package_tarball;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct Published {
    tarball: Vec<u8>,
    delay: Duration,
}

/// In-memory source registry with call counting and per-package latency
#[derive(Default)]
pub(crate) struct FakeRetriever {
    published: DashMap<PackageId, Published>,
    fetch_calls: DashMap<PackageId, usize>,
    list_calls: AtomicUsize,
    listing_fails: bool,
}

impl FakeRetriever {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A registry whose version listing always errors
    pub(crate) fn with_failing_listing() -> Self {
        Self {
            listing_fails: true,
            ..Self::default()
        }
    }

    pub(crate) fn publish(&self, name: &str, version: &str, dependencies: &[(&str, &str)]) {
        self.publish_with_delay(name, version, dependencies, Duration::ZERO);
    }

    pub(crate) fn publish_with_delay(
        &self,
        name: &str,
        version: &str,
        dependencies: &[(&str, &str)],
        delay: Duration,
    ) {
        let dependencies: HashMap<&str, &str> = dependencies.iter().copied().collect();
        let manifest = serde_json::json!({
            "name": name,
            "version": version,
            "dependencies": dependencies,
        });
        let tarball = create_package_tarball(&manifest).unwrap();
        self.published
            .insert(PackageId::new(name, version), Published { tarball, delay });
    }

    /// Publish raw bytes that are not a valid package archive
    pub(crate) fn publish_corrupt(&self, name: &str, version: &str) {
        self.published.insert(
            PackageId::new(name, version),
            Published {
                tarball: b"not a tarball".to_vec(),
                delay: Duration::ZERO,
            },
        );
    }

    pub(crate) fn fetch_count(&self, id: &PackageId) -> usize {
        self.fetch_calls.get(id).map(|count| *count).unwrap_or(0)
    }

    pub(crate) fn total_fetches(&self) -> usize {
        self.fetch_calls.iter().map(|entry| *entry.value()).sum()
    }

    pub(crate) fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageRetriever for FakeRetriever {
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.listing_fails {
            return Err(RegistryError::Network {
                message: "source registry unavailable".to_string(),
                source: None,
            });
        }

        Ok(self
            .published
            .iter()
            .filter(|entry| entry.key().name == name)
            .map(|entry| entry.key().version.clone())
            .collect())
    }

    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>> {
        *self.fetch_calls.entry(id.clone()).or_insert(0) += 1;

        let (tarball, delay) = match self.published.get(id) {
            Some(published) => (published.tarball.clone(), published.delay),
            None => return Ok(None),
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Some(tarball))
    }
}

/// A package built directly, bypassing the archive format
pub(crate) fn package(name: &str, version: &str) -> Package {
    package_at(name, version, Utc::now())
}

pub(crate) fn package_at(name: &str, version: &str, downloaded_at: DateTime<Utc>) -> Package {
    Package::new(PackageId::new(name, version), downloaded_at, vec![0u8], None).unwrap()
}

pub(crate) fn package_with_deps(name: &str, version: &str, dependencies: &[(&str, &str)]) -> Package {
    let dependencies = dependencies
        .iter()
        .map(|(n, r)| (n.to_string(), r.to_string()))
        .collect();
    Package::new(PackageId::new(name, version), Utc::now(), vec![0u8], Some(dependencies)).unwrap()
}
