//! Version string shapes accepted by the registry.
//!
//! Package versions are plain strings; this module only classifies them.
//! Range matching and semantic ordering live in the resolver crate.

use once_cell::sync::Lazy;
use regex::Regex;

static STABLE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)$").expect("valid stable version pattern")
});

static PRERELEASE_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+\.\d+\.\d+-[A-Za-z0-9._-]+$").expect("valid prerelease version pattern")
});

static WILDCARD_PATCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.x$").expect("valid wildcard pattern")
});

/// `MAJOR.MINOR.PATCH` without leading zeros
pub fn is_stable_version(version: &str) -> bool {
    STABLE_VERSION.is_match(version)
}

/// `MAJOR.MINOR.PATCH-LABEL`
pub fn is_prerelease_version(version: &str) -> bool {
    PRERELEASE_VERSION.is_match(version)
}

/// Check if a version string may identify a package
pub fn is_valid_package_version(version: &str) -> bool {
    is_stable_version(version) || is_prerelease_version(version)
}

/// `MAJOR.MINOR.x` dependency ranges
pub fn is_wildcard_patch(range: &str) -> bool {
    WILDCARD_PATCH.is_match(range)
}

/// The `MAJOR.MINOR.PATCH` part of a version, dropping any prerelease label
pub fn core_version(version: &str) -> &str {
    version.split_once('-').map_or(version, |(core, _)| core)
}

/// Numeric `(major, minor, patch)` of a version string.
///
/// Returns `None` when the core part is not three unsigned integers.
pub fn core_tuple(version: &str) -> Option<(u64, u64, u64)> {
    let mut parts = core_version(version).split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch))
}
