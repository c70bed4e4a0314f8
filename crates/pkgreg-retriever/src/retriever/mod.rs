//! Retriever port and its implementations

mod artifact;
mod public;
mod token;

pub use artifact::ArtifactRegistryRetriever;
pub use public::PublicRetriever;
pub use token::{FileTokenProvider, TokenProvider};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use pkgreg_core::error::RegistryError;
use pkgreg_core::PackageId;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

use crate::api::PackageOverview;
use crate::client::RegistryClient;
use crate::RetrieverResult;

/// Access to the upstream source registry
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PackageRetriever: Send + Sync {
    /// All versions published for `name`; empty when the package is unknown
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>>;

    /// The `.tgz` bytes of one package version; `None` when not published
    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>>;
}

#[async_trait]
impl<R> PackageRetriever for Arc<R>
where
    R: PackageRetriever + ?Sized,
{
    async fn list_versions(&self, name: &str) -> RetrieverResult<HashSet<String>> {
        (**self).list_versions(name).await
    }

    async fn fetch_tarball(&self, id: &PackageId) -> RetrieverResult<Option<Vec<u8>>> {
        (**self).fetch_tarball(id).await
    }
}

/// Parse a configured registry URL into a base that accepts path segments
pub(crate) fn parse_base_url(url: &str) -> RetrieverResult<Url> {
    let base = Url::parse(url.trim()).map_err(|e| RegistryError::ConfigValidation {
        field: "retriever.source-registry.url".to_string(),
        reason: format!("Invalid URL '{}': {}", url, e),
    })?;

    if base.cannot_be_a_base() {
        return Err(RegistryError::ConfigValidation {
            field: "retriever.source-registry.url".to_string(),
            reason: format!("URL '{}' cannot hold package paths", url),
        });
    }

    Ok(base)
}

/// `base` with the given segments appended, each percent-encoded as a single segment
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Fetch the package overview document, `None` when the package is unknown
pub(crate) async fn fetch_overview(
    client: &RegistryClient,
    base: &Url,
    name: &str,
    bearer_token: Option<&str>,
) -> RetrieverResult<Option<PackageOverview>> {
    let url = join_segments(base, &[name]);
    client.get_json(url.as_str(), bearer_token).await
}

/// Version keys of an optional overview
pub(crate) fn overview_versions(overview: Option<PackageOverview>) -> HashSet<String> {
    overview
        .map(|overview| overview.versions.into_keys().collect())
        .unwrap_or_default()
}
