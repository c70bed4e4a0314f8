//! # pkgreg-core
//!
//! Core types shared across all pkgreg crates.
//!
//! This crate provides:
//! - `PackageId` and `Package`, the identity and entity of a cached package
//! - Version string classification (stable, prerelease, wildcard-patch)
//! - `RegistryError`, the unified error type, and its result alias
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{RegistryError, RegistryResult};
pub use types::{Package, PackageId};

/// Media type of served package archives
pub const PACKAGE_MEDIA_TYPE: &str = "application/fhir+npmpackage";
