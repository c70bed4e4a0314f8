//! Read path of the registry

use pkgreg_core::{Package, PackageId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::aggregate::VersionAggregate;
use crate::load::LoadManager;
use crate::ResolverResult;

/// Cache-or-fetch lookups and package overviews
#[derive(Clone)]
pub struct QueryService {
    loader: LoadManager,
}

impl QueryService {
    pub fn new(loader: LoadManager) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &LoadManager {
        &self.loader
    }

    /// Return the stored package, fetching it (and its dependencies) on a miss
    pub async fn get_package(&self, id: &PackageId) -> ResolverResult<Package> {
        if let Some(package) = self.loader.storage().get(id) {
            debug!(package = %id, "Package found in the registry");
            return Ok(package);
        }

        info!(package = %id, "Package not in the registry, loading");
        self.loader.load(id.clone()).await
    }

    /// All stored versions of `name`, or `None` if nothing is stored.
    ///
    /// Never contacts the source registry.
    pub fn get_overview(&self, name: &str) -> ResolverResult<Option<VersionAggregate>> {
        let versions = self.loader.storage().all_versions(name);
        if versions.is_empty() {
            debug!(package = name, "No stored versions");
            return Ok(None);
        }

        let mut resolved: HashMap<String, HashSet<PackageId>> = HashMap::new();
        if self.loader.follows_dependencies() {
            for package in &versions {
                let deps = self.loader.resolver().expand_raw_dependencies(package);
                resolved.insert(package.version().to_string(), deps);
            }
        }

        VersionAggregate::new(name, versions, resolved).map(Some)
    }
}
