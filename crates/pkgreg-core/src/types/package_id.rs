//! Package identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of one package artifact: name plus version string.
///
/// For dependency edges the version may still be a raw range such as
/// `1.0.x` until it has been resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    /// Package name (e.g. "de.basisprofil.r4")
    pub name: String,
    /// Version string
    pub version: String,
}

impl PackageId {
    /// Create a new package ID
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// File name used when serving the package archive
    pub fn archive_file_name(&self) -> String {
        format!("{}-{}.tgz", self.name, self.version)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
