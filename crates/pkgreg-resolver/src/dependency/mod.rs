//! Dependency resolution against the source registry and local storage

use pkgreg_core::types::is_wildcard_patch;
use pkgreg_core::{Package, PackageId};
use pkgreg_retriever::PackageRetriever;
use pkgreg_store::PackageStorage;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::semver::best_match;

/// Turns raw dependency declarations (`name` + range) into concrete identities
#[derive(Clone)]
pub struct DependencyResolver {
    storage: Arc<dyn PackageStorage>,
    retriever: Arc<dyn PackageRetriever>,
}

impl DependencyResolver {
    pub fn new(storage: Arc<dyn PackageStorage>, retriever: Arc<dyn PackageRetriever>) -> Self {
        Self { storage, retriever }
    }

    /// Best match for `raw.version` among the versions the source registry lists.
    ///
    /// A failed listing is logged and treated as "no match" so the caller can
    /// fall back to local storage.
    pub async fn resolve_against_remote(&self, raw: &PackageId) -> Option<PackageId> {
        info!(dependency = %raw, "Resolving dependency from remote");

        let versions = match self.retriever.list_versions(&raw.name).await {
            Ok(versions) => versions,
            Err(e) => {
                warn!(dependency = %raw, error = %e, "Listing remote versions failed");
                return None;
            },
        };

        best_match(&raw.version, versions.iter().map(String::as_str))
            .map(|version| PackageId::new(raw.name.clone(), version))
    }

    /// Best match for `raw.version` among the stored versions of `raw.name`
    pub fn resolve_against_local(&self, raw: &PackageId) -> Option<PackageId> {
        info!(dependency = %raw, "Resolving dependency locally");

        let stored = self.storage.all_versions(&raw.name);
        best_match(&raw.version, stored.iter().map(Package::version))
            .map(|version| PackageId::new(raw.name.clone(), version))
    }

    /// Dependencies of `package` that are currently satisfied by local storage.
    ///
    /// Wildcard edges resolve against stored versions, exact edges count only
    /// when that identity is stored. Unsatisfied edges are dropped silently;
    /// the result is informational and only feeds overviews.
    pub fn expand_raw_dependencies(&self, package: &Package) -> HashSet<PackageId> {
        package
            .raw_dependencies()
            .iter()
            .filter_map(|(name, range)| {
                let raw = PackageId::new(name.clone(), range.clone());
                if is_wildcard_patch(range) {
                    return self.resolve_against_local(&raw);
                }
                if self.storage.exists(&raw) {
                    Some(raw)
                } else {
                    debug!(package = %package.id(), dependency = %raw, "Dependency not stored");
                    None
                }
            })
            .collect()
    }
}
