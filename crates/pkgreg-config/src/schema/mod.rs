//! pkgreg.toml configuration schema, parsing and validation

use camino::Utf8PathBuf;
use pkgreg_core::error::RegistryError;
use pkgreg_core::PackageId;
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Complete pkgreg.toml configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// How packages are fetched from the source registry
    pub retriever: RetrieverConfig,

    /// Packages loaded at startup
    #[serde(default)]
    pub initial_packages: Vec<InitialPackage>,
}

/// `[retriever]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetrieverConfig {
    /// Recursively load the dependencies of every fetched package
    #[serde(default)]
    pub dependency_loading_enabled: bool,

    pub source_registry: SourceRegistryConfig,

    #[serde(default)]
    pub supply_chain_verification: SupplyChainVerificationConfig,
}

/// Kind of upstream registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistryType {
    /// Generic public NPM-style registry (tarball URL taken from the overview)
    Public,
    /// Artifact registry without credentials
    ArtifactRegistry,
    /// Artifact registry requiring a bearer token
    ArtifactRegistryAuthenticated,
}

impl RegistryType {
    pub fn is_artifact_registry(&self) -> bool {
        matches!(
            self,
            RegistryType::ArtifactRegistry | RegistryType::ArtifactRegistryAuthenticated
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryType::Public => "public",
            RegistryType::ArtifactRegistry => "artifact-registry",
            RegistryType::ArtifactRegistryAuthenticated => "artifact-registry-authenticated",
        }
    }
}

/// `[retriever.source-registry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceRegistryConfig {
    #[serde(rename = "type")]
    pub registry_type: RegistryType,

    /// Base URL of the source registry
    pub url: String,

    /// File holding the bearer token (authenticated registries only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<Utf8PathBuf>,
}

/// `[retriever.supply-chain-verification]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SupplyChainVerificationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Subject alternative name of the signing certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_san: Option<String>,

    /// Subject alternative name of the stage attestation signer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation_san: Option<String>,
}

impl SupplyChainVerificationConfig {
    /// Stage encoded in the attestation signer name.
    ///
    /// `attestor-prod@example.iam.gserviceaccount.com` yields `prod`: the text
    /// after the last `-` of the account part before `@`.
    pub fn attestation_stage(&self) -> Option<&str> {
        let san = self.attestation_san.as_deref()?;
        let account = san.split('@').next().unwrap_or(san);
        Some(account.rsplit('-').next().unwrap_or(account))
    }
}

/// One `[[initial-packages]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialPackage {
    pub name: String,
    pub versions: Vec<String>,
}

impl InitialPackage {
    /// Expand into one id per listed version
    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.versions
            .iter()
            .map(move |version| PackageId::new(self.name.clone(), version.clone()))
    }
}

impl RegistryConfig {
    /// Configuration with a public source registry and nothing to preload
    pub fn with_public_registry(url: impl Into<String>) -> Self {
        Self {
            retriever: RetrieverConfig {
                dependency_loading_enabled: false,
                source_registry: SourceRegistryConfig {
                    registry_type: RegistryType::Public,
                    url: url.into(),
                    token_file: None,
                },
                supply_chain_verification: SupplyChainVerificationConfig::default(),
            },
            initial_packages: Vec::new(),
        }
    }

    /// All preload targets in file order
    pub fn preload_targets(&self) -> Vec<PackageId> {
        self.initial_packages
            .iter()
            .flat_map(InitialPackage::package_ids)
            .collect()
    }
}

/// Parse and validate a pkgreg.toml document
pub fn parse_config(content: &str) -> ConfigResult<RegistryConfig> {
    let config: RegistryConfig = toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_and_column(content, span.start))
            .unwrap_or((0, 0));
        RegistryError::ConfigParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate cross-field constraints serde cannot express
pub fn validate_config(config: &RegistryConfig) -> ConfigResult<()> {
    let source = &config.retriever.source_registry;

    if source.url.trim().is_empty() {
        return Err(invalid(
            "retriever.source-registry.url",
            "Source registry URL must not be blank",
        ));
    }

    if source.registry_type == RegistryType::ArtifactRegistryAuthenticated
        && source.token_file.is_none()
    {
        return Err(invalid(
            "retriever.source-registry.token-file",
            "A token file is required for registry of type artifact-registry-authenticated",
        ));
    }

    let verification = &config.retriever.supply_chain_verification;
    if verification.enabled {
        if is_blank(&verification.signature_san) {
            return Err(invalid(
                "retriever.supply-chain-verification.signature-san",
                "If supply chain verification is enabled, signature signer name must be provided",
            ));
        }
        if source.registry_type == RegistryType::ArtifactRegistryAuthenticated
            && is_blank(&verification.attestation_san)
        {
            return Err(invalid(
                "retriever.supply-chain-verification.attestation-san",
                "If supply chain verification is enabled on an authenticated registry, attestation signer name must be provided",
            ));
        }
    }

    for (index, package) in config.initial_packages.iter().enumerate() {
        if package.name.trim().is_empty() {
            return Err(invalid(
                &format!("initial-packages[{}].name", index),
                "Package name must not be blank",
            ));
        }
        if package.versions.is_empty() {
            return Err(invalid(
                &format!("initial-packages[{}].versions", index),
                &format!("Package '{}' must list at least one version", package.name),
            ));
        }
    }

    Ok(())
}

fn invalid(field: &str, reason: &str) -> RegistryError {
    RegistryError::ConfigValidation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// 1-based line and column of a byte offset
fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
    let prefix = &content[..offset.min(content.len())];
    let line = prefix.matches('\n').count() + 1;
    let column = prefix.rfind('\n').map_or(prefix.len(), |nl| prefix.len() - nl - 1) + 1;
    (line, column)
}

#[cfg(test)]
mod tests;
