//! Configuration parsing for pkgreg
//!
//! This crate handles parsing and validation of pkgreg.toml, the file that
//! selects the source registry, toggles dependency loading and supply-chain
//! verification, and lists the packages preloaded at startup.

pub mod loader;
pub mod schema;

// Re-export main types
pub use loader::{ConfigLoader, ConfigSource, ENV_DEPENDENCY_LOADING, ENV_SOURCE_URL};
pub use schema::{
    parse_config, validate_config, InitialPackage, RegistryConfig, RegistryType, RetrieverConfig,
    SourceRegistryConfig, SupplyChainVerificationConfig,
};

use pkgreg_core::error::RegistryError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, RegistryError>;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "pkgreg.toml";
