//! `pkgreg overview`: the overview document of the stored versions

use pkgreg_core::{PackageId, RegistryError, RegistryResult};

use super::CommandContext;

/// Tarball URLs are `{base_url}/{name}/{version}`
pub async fn execute(name: String, base_url: &str, ctx: &CommandContext) -> RegistryResult<()> {
    ctx.preload().await?;

    let json = render(&name, base_url, ctx)?;
    println!("{}", json);
    Ok(())
}

pub(crate) fn render(name: &str, base_url: &str, ctx: &CommandContext) -> RegistryResult<String> {
    let aggregate = ctx
        .query
        .get_overview(name)?
        .ok_or_else(|| RegistryError::PackageNotFound {
            id: PackageId::new(name, "*"),
        })?;

    let prefix = format!("{}/{}/", base_url.trim_end_matches('/'), name);
    let overview = aggregate.to_overview(&prefix);

    serde_json::to_string_pretty(&overview)
        .map_err(|e| RegistryError::io(format!("Failed to serialize overview of {}", name), e.into()))
}
