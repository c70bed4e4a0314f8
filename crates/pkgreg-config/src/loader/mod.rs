//! Configuration loading and environment overrides

use camino::{Utf8Path, Utf8PathBuf};
use pkgreg_core::error::RegistryError;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::schema::{parse_config, validate_config, RegistryConfig};
use crate::ConfigResult;

/// Overrides `retriever.source-registry.url`
pub const ENV_SOURCE_URL: &str = "PKGREG_SOURCE_URL";

/// Overrides `retriever.dependency-loading-enabled`
pub const ENV_DEPENDENCY_LOADING: &str = "PKGREG_DEPENDENCY_LOADING_ENABLED";

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Configuration file
    File(Utf8PathBuf),
    /// Environment variable
    Environment(String),
}

/// Loads pkgreg.toml and layers environment overrides on top
pub struct ConfigLoader {
    path: Utf8PathBuf,
    env_overrides: HashMap<String, String>,
}

impl ConfigLoader {
    /// Loader for the given file, reading overrides from the process environment
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            env_overrides: Self::collect_env_overrides(),
        }
    }

    /// Replace the environment overrides (used by tests and embedding)
    pub fn with_overrides(mut self, overrides: HashMap<String, String>) -> Self {
        self.env_overrides = overrides;
        self
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Read, parse, override and re-validate the configuration
    pub async fn load(&self) -> ConfigResult<(RegistryConfig, Vec<ConfigSource>)> {
        let mut config = load_from_file(&self.path).await?;
        let mut sources = vec![ConfigSource::File(self.path.clone())];

        sources.extend(apply_env_overrides(&mut config, &self.env_overrides)?);
        validate_config(&config)?;

        info!(
            path = %self.path,
            registry = config.retriever.source_registry.registry_type.as_str(),
            dependency_loading = config.retriever.dependency_loading_enabled,
            initial_packages = config.initial_packages.len(),
            "Loaded configuration"
        );

        Ok((config, sources))
    }

    /// Collect the PKGREG_* variables from the process environment
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("PKGREG_"))
            .collect()
    }
}

/// Load and parse pkgreg.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<RegistryConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RegistryError::io(format!("Failed to read {}", path), e))?;

    parse_config(&content).map_err(|e| match e {
        RegistryError::ConfigParse {
            message,
            line,
            column,
        } => RegistryError::ConfigParse {
            message: format!("In file {}: {}", path, message),
            line,
            column,
        },
        RegistryError::ConfigValidation { field, reason } => RegistryError::ConfigValidation {
            field,
            reason: format!("In file {}: {}", path, reason),
        },
        other => other,
    })
}

/// Apply environment variable overrides, returning the ones that took effect
pub fn apply_env_overrides(
    config: &mut RegistryConfig,
    overrides: &HashMap<String, String>,
) -> ConfigResult<Vec<ConfigSource>> {
    let mut applied = Vec::new();

    for (key, value) in overrides {
        match key.as_str() {
            ENV_SOURCE_URL => {
                config.retriever.source_registry.url = value.clone();
            },
            ENV_DEPENDENCY_LOADING => {
                config.retriever.dependency_loading_enabled =
                    parse_bool(value).ok_or_else(|| RegistryError::ConfigValidation {
                        field: ENV_DEPENDENCY_LOADING.to_string(),
                        reason: format!("Expected true or false, got '{}'", value),
                    })?;
            },
            _ => {
                // Unknown environment variable, ignore
                continue;
            },
        }
        debug!(variable = %key, "Applied environment override");
        applied.push(ConfigSource::Environment(key.clone()));
    }

    Ok(applied)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
