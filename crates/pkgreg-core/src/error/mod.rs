//! Error types and result aliases for registry operations.
//!
//! Provides a unified error type that covers every failure the resolve, fetch
//! and cache pipeline can produce. The type is `Clone` because a single
//! in-flight load hands the same outcome to every concurrent waiter.

use std::sync::Arc;
use thiserror::Error;

use crate::types::PackageId;

/// Boxed error source that can be shared between waiters
pub type SharedSource = Arc<dyn std::error::Error + Send + Sync>;

/// Unified error type for all registry operations
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    // Lookup errors
    #[error("Package {id} not found")]
    PackageNotFound { id: PackageId },

    #[error(
        "Could not resolve dependency {name}@{range} for package {parent}, no matching version found remotely or locally"
    )]
    DependencyUnresolved {
        name: String,
        range: String,
        parent: PackageId,
    },

    // Integrity errors
    #[error("Invalid version: {name}@{version}")]
    InvalidVersion { name: String, version: String },

    #[error("A version aggregate for '{name}' must contain at least one package")]
    EmptyAggregate { name: String },

    #[error("All packages must match the aggregate name '{expected}', found '{found}'")]
    NameMismatch { expected: String, found: String },

    #[error("Malformed package {id}: {message}")]
    PackageFormat {
        id: PackageId,
        message: String,
        #[source]
        source: Option<SharedSource>,
    },

    // Transport errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<SharedSource>,
    },

    #[error("Verification failed for {id}: {reason}")]
    Verification { id: PackageId, reason: String },

    // Config errors
    #[error("Failed to parse configuration: {message} at line {line}, column {column}")]
    ConfigParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Background task for {id} failed: {message}")]
    TaskFailed { id: PackageId, message: String },
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    /// Create a network error from any error type
    pub fn network<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message,
            source: Some(Arc::new(source)),
        }
    }

    /// Create a package format error from any error type
    pub fn package_format<E>(id: &PackageId, message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::PackageFormat {
            id: id.clone(),
            message,
            source: Some(Arc::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io {
            message,
            source: Arc::new(source),
        }
    }

    /// Whether this error belongs to the not-found class (404 at a boundary)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RegistryError::PackageNotFound { .. } | RegistryError::DependencyUnresolved { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            RegistryError::PackageNotFound { .. } => {
                Some("Check the package name and version against the source registry")
            },
            RegistryError::DependencyUnresolved { .. } => {
                Some("Publish a matching version to the source registry or preload one locally")
            },
            RegistryError::Network { .. } => {
                Some("Check the source registry URL and your network connection")
            },
            RegistryError::Verification { .. } => {
                Some("Make sure the package was signed by the configured signer")
            },
            RegistryError::ConfigParse { .. } | RegistryError::ConfigValidation { .. } => {
                Some("Fix the configuration file and restart")
            },
            _ => None,
        }
    }
}
