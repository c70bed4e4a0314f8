//! Single-flight package loading
//!
//! The load manager is the write path of the registry. Every package
//! identity has at most one fetch in progress at a time: the first caller
//! registers an in-flight handle, later callers join it and observe the same
//! outcome. A fetch downloads the archive, loads its dependencies in parallel
//! (when enabled), persists the package and finally removes the in-flight
//! marker, whether it succeeded or not. Failures are never cached.
//!
//! Fetches that wait on their dependencies record waits-for edges; a
//! dependency that would close a cycle of waiting fetches is not joined.

pub mod fail_fast;
mod wait_graph;

pub use fail_fast::join_all_or_fail_fast;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use pkgreg_core::error::RegistryError;
use pkgreg_core::types::is_wildcard_patch;
use pkgreg_core::{Package, PackageId};
use pkgreg_retriever::PackageRetriever;
use pkgreg_store::{package_from_tarball, PackageStorage};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::dependency::DependencyResolver;
use crate::ResolverResult;
use wait_graph::WaitGraph;

/// Shared outcome of one in-flight fetch
pub type LoadHandle = Shared<BoxFuture<'static, ResolverResult<Package>>>;

/// Deduplicating, recursive package loader
#[derive(Clone)]
pub struct LoadManager {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn PackageStorage>,
    retriever: Arc<dyn PackageRetriever>,
    resolver: DependencyResolver,
    in_flight: DashMap<PackageId, LoadHandle>,
    waits: WaitGraph,
    follow_dependencies: bool,
}

impl LoadManager {
    pub fn new(
        storage: Arc<dyn PackageStorage>,
        retriever: Arc<dyn PackageRetriever>,
        follow_dependencies: bool,
    ) -> Self {
        let resolver = DependencyResolver::new(storage.clone(), retriever.clone());
        Self {
            inner: Arc::new(Inner {
                storage,
                retriever,
                resolver,
                in_flight: DashMap::new(),
                waits: WaitGraph::default(),
                follow_dependencies,
            }),
        }
    }

    pub fn storage(&self) -> &Arc<dyn PackageStorage> {
        &self.inner.storage
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.inner.resolver
    }

    pub fn follows_dependencies(&self) -> bool {
        self.inner.follow_dependencies
    }

    /// Number of fetches currently in progress
    pub fn in_flight_count(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Start fetching `id`, or join the fetch already in progress.
    ///
    /// The work runs on a spawned task, so it completes even if every handle
    /// is dropped. Must be called from within a Tokio runtime.
    pub fn fetch(&self, id: PackageId) -> LoadHandle {
        match self.inner.in_flight.entry(id) {
            Entry::Occupied(entry) => {
                debug!(package = %entry.key(), "Joining in-flight fetch");
                entry.get().clone()
            },
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                info!(package = %id, "Setting loading flag");

                let manager = self.clone();
                let task_id = id.clone();
                let task = tokio::spawn(async move {
                    let result = manager.retrieve_and_register(&task_id).await;
                    manager.remove_loading_flag(&task_id);
                    result
                });

                let handle = task
                    .map(move |joined| {
                        joined.unwrap_or_else(|e| {
                            Err(RegistryError::TaskFailed {
                                id,
                                message: e.to_string(),
                            })
                        })
                    })
                    .boxed()
                    .shared();

                entry.insert(handle.clone());
                handle
            },
        }
    }

    /// Fetch `id` and wait for the outcome
    pub async fn load(&self, id: PackageId) -> ResolverResult<Package> {
        self.fetch(id).await
    }

    /// Load every target not yet stored, failing on the first error.
    ///
    /// Returns the number of packages that were fetched.
    pub async fn preload<I>(&self, targets: I) -> ResolverResult<usize>
    where
        I: IntoIterator<Item = PackageId>,
    {
        let handles: Vec<LoadHandle> = targets
            .into_iter()
            .filter(|id| !self.inner.storage.exists(id))
            .map(|id| self.fetch(id))
            .collect();

        if handles.is_empty() {
            debug!("Nothing to preload");
            return Ok(0);
        }

        info!(packages = handles.len(), "Preloading packages in the registry");
        let loaded = join_all_or_fail_fast(handles).await?;
        Ok(loaded.len())
    }

    async fn retrieve_and_register(&self, id: &PackageId) -> ResolverResult<Package> {
        // Stored between the caller's lookup and the in-flight insert
        if let Some(package) = self.inner.storage.get(id) {
            debug!(package = %id, "Package already in the registry");
            return Ok(package);
        }

        info!(package = %id, "Searching for package in remote source registry");

        let tarball = self
            .inner
            .retriever
            .fetch_tarball(id)
            .await?
            .ok_or_else(|| RegistryError::PackageNotFound { id: id.clone() })?;

        let package = package_from_tarball(id.clone(), tarball)?;

        if self.inner.follow_dependencies {
            self.load_dependencies(&package).await?;
        }

        self.inner.storage.put(package.clone());
        info!(package = %id, "Package added in the registry");
        Ok(package)
    }

    /// Load all dependencies of `package` in parallel, failing fast
    async fn load_dependencies(&self, package: &Package) -> ResolverResult<()> {
        if package.raw_dependencies().is_empty() {
            return Ok(());
        }
        info!(package = %package.id(), "Resolving dependencies");

        let tasks = package.raw_dependencies().iter().map(|(name, range)| {
            let raw = PackageId::new(name.clone(), range.clone());
            let parent = package.id().clone();
            let manager = self.clone();
            let task_raw = raw.clone();

            tokio::spawn(async move { manager.load_dependency(parent, task_raw).await }).map(
                move |joined| {
                    joined.unwrap_or_else(|e| {
                        Err(RegistryError::TaskFailed {
                            id: raw,
                            message: e.to_string(),
                        })
                    })
                },
            )
        });

        join_all_or_fail_fast(tasks).await?;
        Ok(())
    }

    /// Resolve one raw dependency edge and fetch it unless already stored
    async fn load_dependency(&self, parent: PackageId, raw: PackageId) -> ResolverResult<()> {
        let id = if is_wildcard_patch(&raw.version) {
            let resolved = match self.inner.resolver.resolve_against_remote(&raw).await {
                Some(id) => Some(id),
                None => self.inner.resolver.resolve_against_local(&raw),
            };
            resolved.ok_or_else(|| RegistryError::DependencyUnresolved {
                name: raw.name.clone(),
                range: raw.version.clone(),
                parent: parent.clone(),
            })?
        } else {
            raw
        };

        if self.inner.storage.exists(&id) {
            debug!(package = %parent, dependency = %id, "Dependency already stored");
            return Ok(());
        }

        // A fetch that already waits on `parent` is stored once that wait is
        // released; joining it here would never complete
        let _waiting = match self.inner.waits.try_wait(&parent, &id) {
            Some(guard) => guard,
            None => {
                warn!(
                    package = %parent,
                    dependency = %id,
                    "Dependency cycle, not waiting on dependency"
                );
                return Ok(());
            },
        };

        self.fetch(id).await.map(|_| ())
    }

    fn remove_loading_flag(&self, id: &PackageId) {
        if self.inner.in_flight.remove(id).is_some() {
            info!(package = %id, "Loading flag removed");
        } else {
            warn!(package = %id, "Failed to remove loading flag");
        }
    }
}
