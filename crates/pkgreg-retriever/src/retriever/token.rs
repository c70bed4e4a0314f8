//! Bearer token sources for authenticated registries

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use pkgreg_core::error::RegistryError;
use std::io;

use crate::RetrieverResult;

/// Supplies the bearer token sent to the source registry
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> RetrieverResult<String>;
}

/// Reads the token from a file on every request.
///
/// Credential rotation happens outside the process (a sidecar or a mounted
/// secret rewrites the file), so the content is never cached.
#[derive(Debug, Clone)]
pub struct FileTokenProvider {
    path: Utf8PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

#[async_trait]
impl TokenProvider for FileTokenProvider {
    async fn token(&self) -> RetrieverResult<String> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| RegistryError::io(format!("Failed to read token file {}", self.path), e))?;

        let token = content.trim();
        if token.is_empty() {
            return Err(RegistryError::io(
                format!("Token file {} is empty", self.path),
                io::Error::new(io::ErrorKind::InvalidData, "empty token"),
            ));
        }

        Ok(token.to_string())
    }
}
