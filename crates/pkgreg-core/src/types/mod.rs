//! Core data types for the registry.
//!
//! This module provides the fundamental types shared by every crate:
//! - Package identities
//! - The immutable package entity
//! - Version string classification

pub mod package;
pub mod package_id;
pub mod version;

// Re-export all public types
pub use package::Package;
pub use package_id::PackageId;
pub use version::{
    core_tuple, core_version, is_prerelease_version, is_stable_version, is_valid_package_version,
    is_wildcard_patch,
};
