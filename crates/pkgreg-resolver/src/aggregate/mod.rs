//! All known versions of one package name
//!
//! The aggregate is a read-time view: it is rebuilt from storage for every
//! overview request and never persisted.

use pkgreg_core::error::RegistryError;
use pkgreg_core::{Package, PackageId};
use pkgreg_retriever::{DistInfo, PackageOverview, VersionEntry};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ResolverResult;

/// Immutable view over the stored versions of a package
#[derive(Debug, Clone)]
pub struct VersionAggregate {
    package_name: String,
    /// Ascending by identity, without duplicates
    versions: Vec<Package>,
    /// Version string to the dependency identities satisfied locally
    resolved_dependencies: HashMap<String, HashSet<PackageId>>,
}

impl VersionAggregate {
    pub fn new(
        package_name: impl Into<String>,
        versions: impl IntoIterator<Item = Package>,
        resolved_dependencies: HashMap<String, HashSet<PackageId>>,
    ) -> ResolverResult<Self> {
        let package_name = package_name.into();

        let mut versions: Vec<Package> = versions.into_iter().collect();
        if versions.is_empty() {
            return Err(RegistryError::EmptyAggregate { name: package_name });
        }
        if let Some(stray) = versions.iter().find(|p| p.name() != package_name) {
            return Err(RegistryError::NameMismatch {
                expected: package_name,
                found: stray.name().to_string(),
            });
        }

        versions.sort_by(|a, b| a.id().cmp(b.id()));
        versions.dedup_by(|a, b| a.id() == b.id());

        Ok(Self {
            package_name,
            versions,
            resolved_dependencies,
        })
    }

    pub fn name(&self) -> &str {
        &self.package_name
    }

    pub fn versions(&self) -> &[Package] {
        &self.versions
    }

    /// Dependencies recorded for `version`, empty when none were resolved
    pub fn resolved_dependencies(&self, version: &str) -> impl Iterator<Item = &PackageId> {
        self.resolved_dependencies
            .get(version)
            .into_iter()
            .flat_map(|deps| deps.iter())
    }

    /// The version advertised as `latest`.
    ///
    /// The greatest stable version wins when one exists. Among prereleases
    /// only `(major, minor, patch)` is compared; equal cores are ordered by
    /// download time, most recent first. Labels are never compared.
    pub fn latest_version(&self) -> &str {
        let stable = self
            .versions
            .iter()
            .filter(|p| p.is_stable())
            .max_by_key(|p| p.core_tuple());

        let latest = match stable {
            Some(package) => Some(package),
            None => self
                .versions
                .iter()
                .max_by_key(|p| (p.core_tuple(), p.downloaded_at())),
        };

        // Construction guarantees at least one version
        latest.map_or("", Package::version)
    }

    /// Registry overview document; tarball URLs are `{base_url}{version}`
    pub fn to_overview(&self, base_url: &str) -> PackageOverview {
        let versions = self
            .versions
            .iter()
            .map(|package| {
                let dependencies: BTreeMap<String, String> = self
                    .resolved_dependencies(package.version())
                    .map(|dep| (dep.name.clone(), dep.version.clone()))
                    .collect();

                let entry = VersionEntry {
                    name: self.package_name.clone(),
                    version: package.version().to_string(),
                    dist: Some(DistInfo {
                        tarball: format!("{}{}", base_url, package.version()),
                    }),
                    dependencies: (!dependencies.is_empty()).then_some(dependencies),
                };
                (package.version().to_string(), entry)
            })
            .collect();

        let mut dist_tags = BTreeMap::new();
        dist_tags.insert("latest".to_string(), self.latest_version().to_string());

        PackageOverview {
            id: self.package_name.clone(),
            name: self.package_name.clone(),
            dist_tags,
            versions,
        }
    }
}
