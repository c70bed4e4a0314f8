//! Retriever construction from configuration

use pkgreg_config::{RegistryType, RetrieverConfig};
use pkgreg_core::error::RegistryError;
use std::sync::Arc;
use tracing::info;

use crate::client::RegistryClient;
use crate::retriever::{
    ArtifactRegistryRetriever, FileTokenProvider, PackageRetriever, PublicRetriever, TokenProvider,
};
use crate::verify::{SupplyChainVerifier, VerifyingRetriever};
use crate::RetrieverResult;

/// Build the retriever selected by `config`.
///
/// Artifact registries support verification; the stage attestation is only
/// checked for the authenticated variant. Public registries are never
/// verified, even when verification is enabled.
pub fn build_retriever(
    config: &RetrieverConfig,
    client: RegistryClient,
    verifier: Option<Arc<dyn SupplyChainVerifier>>,
) -> RetrieverResult<Arc<dyn PackageRetriever>> {
    let source = &config.source_registry;
    info!(registry = source.registry_type.as_str(), url = %source.url, "Creating package retriever");

    let base: Arc<dyn PackageRetriever> = match source.registry_type {
        RegistryType::Public => Arc::new(PublicRetriever::new(client, &source.url)?),
        RegistryType::ArtifactRegistry => {
            Arc::new(ArtifactRegistryRetriever::new(client, &source.url, None)?)
        },
        RegistryType::ArtifactRegistryAuthenticated => {
            let token_file = source.token_file.clone().ok_or_else(|| RegistryError::ConfigValidation {
                field: "retriever.source-registry.token-file".to_string(),
                reason: "A token file is required for registry of type artifact-registry-authenticated"
                    .to_string(),
            })?;
            let provider: Arc<dyn TokenProvider> = Arc::new(FileTokenProvider::new(token_file));
            Arc::new(ArtifactRegistryRetriever::new(client, &source.url, Some(provider))?)
        },
    };

    let verification = &config.supply_chain_verification;
    if !verification.enabled || !source.registry_type.is_artifact_registry() {
        info!("Supply chain verification is disabled or not applicable for this registry type");
        return Ok(base);
    }

    let verifier = verifier.ok_or_else(|| RegistryError::ConfigValidation {
        field: "retriever.supply-chain-verification.enabled".to_string(),
        reason: "Supply chain verification is enabled but no verifier is available".to_string(),
    })?;

    let check_stage_attestation =
        source.registry_type == RegistryType::ArtifactRegistryAuthenticated;
    info!(
        stage = verification.attestation_stage().unwrap_or("none"),
        check_stage_attestation,
        "Supply chain verification is enabled"
    );

    Ok(Arc::new(VerifyingRetriever::new(base, verifier, check_stage_attestation)))
}
