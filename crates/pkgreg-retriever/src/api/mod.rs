//! NPM registry package overview document
//!
//! The same shape is read from the source registry (to list versions and
//! locate tarballs) and produced for the registry's own overview endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package overview (`GET /{name}` on an NPM-style registry)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PackageOverview {
    #[serde(rename = "_id", default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Tag name to version, at least `latest` when produced locally
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: BTreeMap<String, String>,

    #[serde(default)]
    pub versions: BTreeMap<String, VersionEntry>,
}

/// One entry of the `versions` object
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct VersionEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<DistInfo>,

    /// Resolved dependencies (name -> concrete version)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, String>>,
}

/// Distribution information for a package tarball
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DistInfo {
    /// Tarball download URL
    pub tarball: String,
}

impl PackageOverview {
    /// Tarball URL advertised for `version`, if any
    pub fn tarball_url(&self, version: &str) -> Option<&str> {
        self.versions
            .get(version)
            .and_then(|entry| entry.dist.as_ref())
            .map(|dist| dist.tarball.as_str())
    }
}
