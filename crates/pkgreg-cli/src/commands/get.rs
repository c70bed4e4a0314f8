//! `pkgreg get`: fetch one package version and write its archive

use camino::{Utf8Path, Utf8PathBuf};
use pkgreg_core::{PackageId, RegistryError, RegistryResult, PACKAGE_MEDIA_TYPE};

use super::CommandContext;

/// Returns the path of the written archive
pub async fn execute(
    name: String,
    version: String,
    output_dir: &Utf8Path,
    ctx: &CommandContext,
) -> RegistryResult<Utf8PathBuf> {
    ctx.preload().await?;

    let id = PackageId::new(name, version);
    let package = ctx.query.get_package(&id).await?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| RegistryError::io(format!("Failed to create directory {}", output_dir), e))?;

    let path = output_dir.join(id.archive_file_name());
    tokio::fs::write(&path, package.payload())
        .await
        .map_err(|e| RegistryError::io(format!("Failed to write {}", path), e))?;

    ctx.output.success(&format!("Wrote {}", path));
    ctx.output.info(&format!("{} bytes, {}", package.payload().len(), PACKAGE_MEDIA_TYPE));
    Ok(path)
}
