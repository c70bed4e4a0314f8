//! Generic public NPM registry

use async_trait::async_trait;
use pkgreg_core::PackageId;
use std::collections::HashSet;
use tracing::{debug, info};
use url::Url;

use super::{fetch_overview, overview_versions, parse_base_url, PackageRetriever};
use crate::client::RegistryClient;
use crate::RetrieverResult;

/// Retrieves packages from any public NPM-style registry.
///
/// Makes no assumption about the tarball URL layout: the download location is
/// read from `versions[version].dist.tarball` of the package overview.
/// No credentials are sent and no verification is applied.
#[derive(Debug, Clone)]
pub struct PublicRetriever {
    client: RegistryClient,
    base_url: Url,
}

impl PublicRetriever {
    pub fn new(client: RegistryClient, base_url: &str) -> RetrieverResult<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl PackageRetriever for PublicRetriever {
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>> {
        let overview = fetch_overview(&self.client, &self.base_url, name, None).await?;
        Ok(overview_versions(overview))
    }

    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>> {
        info!(package = %id, "Requesting package from remote source registry");

        let overview = fetch_overview(&self.client, &self.base_url, &id.name, None).await?;
        let tarball_url = match overview.as_ref().and_then(|o| o.tarball_url(&id.version)) {
            Some(url) => url.to_string(),
            None => {
                debug!(package = %id, "Version not advertised by source registry");
                return Ok(None);
            },
        };

        self.client.get_bytes(&tarball_url, None).await
    }
}
