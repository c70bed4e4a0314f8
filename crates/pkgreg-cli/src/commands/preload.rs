//! `pkgreg preload`

use pkgreg_core::RegistryResult;

use super::CommandContext;

pub async fn execute(ctx: &CommandContext) -> RegistryResult<()> {
    let loaded = ctx.preload().await?;
    let stats = ctx.query.loader().storage().stats();

    ctx.output.success(&format!("Preloaded {} packages", loaded));
    ctx.output.info(&format!(
        "{} versions of {} packages stored",
        stats.total_packages, stats.distinct_names
    ));
    Ok(())
}
