//! Tarball creation functionality
//!
//! Builds NPM-compatible gzip tarballs from in-memory entries. Used to
//! assemble package fixtures and by tooling that publishes test packages.

use flate2::write::GzEncoder;
use flate2::Compression;
use pkgreg_core::error::RegistryError;
use tar::{Builder, Header};

use crate::StoreResult;

/// Create a gzip tarball from `(path, content)` entries
pub fn create_tarball(entries: &[(&str, &[u8])]) -> StoreResult<Vec<u8>> {
    let gz_encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar_builder = Builder::new(gz_encoder);

    for (path, content) in entries {
        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();

        tar_builder
            .append_data(&mut header, path, *content)
            .map_err(|e| RegistryError::io(format!("Failed to add {} to archive", path), e))?;
    }

    let gz_encoder = tar_builder
        .into_inner()
        .map_err(|e| RegistryError::io("Failed to finish archive".to_string(), e))?;

    gz_encoder
        .finish()
        .map_err(|e| RegistryError::io("Failed to compress archive".to_string(), e))
}

/// Create a package archive holding only `package/package.json`
pub fn create_package_tarball(manifest: &serde_json::Value) -> StoreResult<Vec<u8>> {
    let manifest = manifest.to_string();
    create_tarball(&[("package/package.json", manifest.as_bytes())])
}
