//! Supply-chain verification of downloaded archives

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use pkgreg_core::PackageId;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::retriever::PackageRetriever;
use crate::RetrieverResult;

/// Checks provenance of a downloaded archive.
///
/// Implementations return `RegistryError::Verification` when a check fails.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SupplyChainVerifier: Send + Sync {
    /// Verify the archive's signature against the configured signer
    async fn verify_signature(&self, id: &PackageId, tarball: &[u8]) -> RetrieverResult<()>;

    /// Verify that the archive was attested for the configured stage
    async fn verify_stage_attestation(&self, id: &PackageId, tarball: &[u8]) -> RetrieverResult<()>;
}

/// Retriever decorator that verifies every archive before handing it out
pub struct VerifyingRetriever<R> {
    inner: R,
    verifier: std::sync::Arc<dyn SupplyChainVerifier>,
    check_stage_attestation: bool,
}

impl<R> VerifyingRetriever<R> {
    pub fn new(
        inner: R,
        verifier: std::sync::Arc<dyn SupplyChainVerifier>,
        check_stage_attestation: bool,
    ) -> Self {
        Self {
            inner,
            verifier,
            check_stage_attestation,
        }
    }

    pub fn checks_stage_attestation(&self) -> bool {
        self.check_stage_attestation
    }
}

#[async_trait]
impl<R> PackageRetriever for VerifyingRetriever<R>
where
    R: PackageRetriever,
{
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>> {
        self.inner.list_versions(name).await
    }

    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>> {
        let tarball = match self.inner.fetch_tarball(id).await? {
            Some(tarball) => tarball,
            None => return Ok(None),
        };

        if let Err(e) = self.verifier.verify_signature(id, &tarball).await {
            warn!(package = %id, error = %e, "Signature verification failed");
            return Err(e);
        }
        if self.check_stage_attestation {
            if let Err(e) = self.verifier.verify_stage_attestation(id, &tarball).await {
                warn!(package = %id, error = %e, "Stage attestation failed");
                return Err(e);
            }
        }

        debug!(package = %id, "Package passed supply chain verification");
        Ok(Some(tarball))
    }
}
