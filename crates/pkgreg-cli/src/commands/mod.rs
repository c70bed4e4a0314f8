//! Command implementations and dispatch logic.
//!
//! Every command starts from a `CommandContext` built from the configuration
//! file and runs the startup preload before doing its own work.

use camino::Utf8Path;
use pkgreg_config::{ConfigLoader, RegistryConfig};
use pkgreg_core::RegistryResult;
use pkgreg_resolver::{LoadManager, QueryService};
use pkgreg_retriever::{build_retriever, RegistryClient};
use pkgreg_store::{InMemoryStorage, PackageStorage};
use std::sync::Arc;
use tracing::{debug, info};

pub mod get;
pub mod overview;
pub mod preload;


use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub config: RegistryConfig,
    pub query: QueryService,
    pub output: OutputHandler,
}

impl CommandContext {
    /// Load the configuration at `path` and wire the registry from it
    pub async fn load(path: &Utf8Path) -> RegistryResult<Self> {
        let (config, sources) = ConfigLoader::new(path).load().await?;
        debug!(?sources, "Configuration sources");
        Self::from_config(config)
    }

    /// Wire storage, retriever and loader for an already validated configuration
    pub fn from_config(config: RegistryConfig) -> RegistryResult<Self> {
        let client = RegistryClient::new()?;
        let retriever = build_retriever(&config.retriever, client, None)?;
        let storage: Arc<dyn PackageStorage> = Arc::new(InMemoryStorage::new());
        let loader = LoadManager::new(storage, retriever, config.retriever.dependency_loading_enabled);

        Ok(Self {
            config,
            query: QueryService::new(loader),
            output: OutputHandler::new(),
        })
    }

    /// Load the configured initial packages, returning how many were fetched
    pub async fn preload(&self) -> RegistryResult<usize> {
        let targets = self.config.preload_targets();
        info!(packages = targets.len(), "Starting preload of initial packages");
        self.query.loader().preload(targets).await
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> RegistryResult<()> {
    match command {
        Commands::Preload => {
            info!("Preloading initial packages");
            preload::execute(ctx).await
        },
        Commands::Get { name, version, output } => {
            info!("Fetching package: {}@{}", name, version);
            get::execute(name, version, &output, ctx).await.map(|_| ())
        },
        Commands::Overview { name, base_url } => {
            info!("Building overview for: {}", name);
            overview::execute(name, &base_url, ctx).await
        },
    }
}
