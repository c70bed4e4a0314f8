//! The package entity.
//!
//! One fetched package version: identity, archive bytes, the dependencies
//! declared in its manifest and the time it was downloaded.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::version;
use super::PackageId;
use crate::error::{RegistryError, RegistryResult};

/// An immutable, fetched package version
#[derive(Clone, PartialEq, Eq)]
pub struct Package {
    id: PackageId,
    downloaded_at: DateTime<Utc>,
    /// The archive bytes, shared read-only between clones
    payload: Arc<[u8]>,
    /// Raw dependencies as declared in package.json (name -> range)
    raw_dependencies: HashMap<String, String>,
}

impl Package {
    /// Create a package, validating the version shape.
    ///
    /// Each numeric component must also fit in a `u64`.
    pub fn new(
        id: PackageId,
        downloaded_at: DateTime<Utc>,
        payload: impl Into<Arc<[u8]>>,
        raw_dependencies: Option<HashMap<String, String>>,
    ) -> RegistryResult<Self> {
        if !version::is_valid_package_version(&id.version)
            || version::core_tuple(&id.version).is_none()
        {
            return Err(RegistryError::InvalidVersion {
                name: id.name,
                version: id.version,
            });
        }

        Ok(Self {
            id,
            downloaded_at,
            payload: payload.into(),
            raw_dependencies: raw_dependencies.unwrap_or_default(),
        })
    }

    pub fn id(&self) -> &PackageId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn version(&self) -> &str {
        &self.id.version
    }

    pub fn downloaded_at(&self) -> DateTime<Utc> {
        self.downloaded_at
    }

    /// Read-only view of the archive bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Owned copy of the archive bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.payload.to_vec()
    }

    pub fn raw_dependencies(&self) -> &HashMap<String, String> {
        &self.raw_dependencies
    }

    /// Version without prerelease label
    pub fn core_version(&self) -> &str {
        version::core_version(&self.id.version)
    }

    /// `(major, minor, patch)` of this package's version
    pub fn core_tuple(&self) -> (u64, u64, u64) {
        // Construction guarantees three numeric components that fit in u64
        version::core_tuple(&self.id.version).unwrap_or_default()
    }

    pub fn is_stable(&self) -> bool {
        version::is_stable_version(&self.id.version)
    }

    pub fn is_prerelease(&self) -> bool {
        version::is_prerelease_version(&self.id.version)
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Package")
            .field("id", &self.id)
            .field("downloaded_at", &self.downloaded_at)
            .field("payload_len", &self.payload.len())
            .field("dependencies", &self.raw_dependencies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(version: &str) -> RegistryResult<Package> {
        Package::new(
            PackageId::new("test.package", version),
            Utc::now(),
            vec![1u8, 2, 3],
            None,
        )
    }

    #[test]
    fn test_valid_versions() {
        for version in ["1.0.0", "2.3.4-alpha", "1.2.3-beta.1"] {
            assert!(package(version).is_ok(), "{version} should be accepted");
        }
    }

    #[test]
    fn test_invalid_versions() {
        for version in ["1.0", "1.0.x", "foo", "1.0.0-", "1..0.0"] {
            match package(version) {
                Err(RegistryError::InvalidVersion { name, version: rejected }) => {
                    assert_eq!(name, "test.package");
                    assert_eq!(rejected, version);
                },
                other => panic!("Expected InvalidVersion for {version}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_oversized_components_rejected() {
        for version in [
            "18446744073709551616.0.0",
            "1.99999999999999999999.0",
            "1.0.99999999999999999999-alpha",
        ] {
            assert!(version::is_valid_package_version(version));
            assert!(
                matches!(package(version), Err(RegistryError::InvalidVersion { .. })),
                "{version} should be rejected"
            );
        }

        let largest = package("18446744073709551615.0.0").unwrap();
        assert_eq!(largest.core_tuple(), (u64::MAX, 0, 0));
    }

    #[test]
    fn test_dependencies_default_to_empty() {
        let pkg = package("1.0.0").unwrap();
        assert!(pkg.raw_dependencies().is_empty());

        let mut deps = HashMap::new();
        deps.insert("bar".to_string(), "1.0.x".to_string());
        let pkg = Package::new(PackageId::new("foo", "1.0.0"), Utc::now(), Vec::<u8>::new(), Some(deps))
            .unwrap();
        assert_eq!(pkg.raw_dependencies().get("bar"), Some(&"1.0.x".to_string()));
    }

    #[test]
    fn test_payload_copies_are_detached() {
        let pkg = package("1.0.0").unwrap();
        let mut copy = pkg.to_bytes();
        copy[0] = 42;

        assert_eq!(pkg.payload(), &[1, 2, 3]);
        assert_eq!(pkg.clone().payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_stability() {
        let stable = package("1.2.3").unwrap();
        assert!(stable.is_stable());
        assert!(!stable.is_prerelease());
        assert_eq!(stable.core_tuple(), (1, 2, 3));

        let pre = package("1.2.3-ballot.2").unwrap();
        assert!(!pre.is_stable());
        assert!(pre.is_prerelease());
        assert_eq!(pre.core_version(), "1.2.3");
    }

    #[test]
    fn test_debug_omits_payload() {
        let pkg = package("1.0.0").unwrap();
        let debug = format!("{:?}", pkg);
        assert!(debug.contains("payload_len: 3"));
    }
}
