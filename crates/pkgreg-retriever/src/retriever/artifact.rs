//! Artifact registry (fixed tarball URL layout, optional bearer auth)

use async_trait::async_trait;
use pkgreg_core::PackageId;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use url::Url;

use super::{fetch_overview, join_segments, overview_versions, parse_base_url, PackageRetriever, TokenProvider};
use crate::client::RegistryClient;
use crate::RetrieverResult;

/// Retrieves packages from an artifact registry hosting an NPM repository.
///
/// Tarballs live at `{url}/{name}/-/{name}-{version}.tgz`. When a token
/// provider is configured every request carries a bearer token.
#[derive(Clone)]
pub struct ArtifactRegistryRetriever {
    client: RegistryClient,
    base_url: Url,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl ArtifactRegistryRetriever {
    pub fn new(
        client: RegistryClient,
        base_url: &str,
        token_provider: Option<Arc<dyn TokenProvider>>,
    ) -> RetrieverResult<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            token_provider,
        })
    }

    /// Download location of one package version
    pub fn tarball_url(&self, id: &PackageId) -> Url {
        let file_name = id.archive_file_name();
        join_segments(&self.base_url, &[&id.name, "-", &file_name])
    }

    async fn bearer_token(&self) -> RetrieverResult<Option<String>> {
        match &self.token_provider {
            Some(provider) => provider.token().await.map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ArtifactRegistryRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactRegistryRetriever")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token_provider.is_some())
            .finish()
    }
}

#[async_trait]
impl PackageRetriever for ArtifactRegistryRetriever {
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>> {
        let token = self.bearer_token().await?;
        let overview = fetch_overview(&self.client, &self.base_url, name, token.as_deref()).await?;
        Ok(overview_versions(overview))
    }

    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>> {
        info!(package = %id, "Requesting package from remote source registry");

        let token = self.bearer_token().await?;
        let url = self.tarball_url(id);
        self.client.get_bytes(url.as_str(), token.as_deref()).await
    }
}
