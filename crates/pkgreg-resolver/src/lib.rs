//! Resolve-fetch-cache pipeline for pkgreg
//!
//! This crate holds the registry core: version range matching, dependency
//! resolution against the source registry and local storage, the
//! single-flight load manager that fetches packages and their dependencies
//! in parallel, the version aggregate behind package overviews, and the
//! query service tying the read path together.

pub mod aggregate;
pub mod dependency;
pub mod load;
pub mod query;
pub mod semver;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export main types
pub use aggregate::VersionAggregate;
pub use dependency::DependencyResolver;
pub use load::{join_all_or_fail_fast, LoadHandle, LoadManager};
pub use query::QueryService;
pub use crate::semver::{best_match, is_wildcard_patch};

use pkgreg_core::error::RegistryError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, RegistryError>;
