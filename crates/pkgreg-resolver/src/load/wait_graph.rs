//! Waits-for edges between in-flight fetches
//!
//! A fetch that waits on one of its dependencies records a `parent ->
//! dependency` edge for as long as it waits. Joining a dependency that can
//! already reach the parent through these edges would close a cycle of
//! fetches waiting on each other, none of which could ever finish.
//!
//! Edges are counted: a retried fetch may wait on the same dependency while
//! a task from the failed attempt still does.

use parking_lot::Mutex;
use pkgreg_core::PackageId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub(crate) struct WaitGraph {
    edges: Mutex<HashMap<PackageId, HashMap<PackageId, usize>>>,
}

impl WaitGraph {
    /// Record that `parent` waits on `dependency`.
    ///
    /// Returns `None` without recording anything when `dependency` already
    /// waits on `parent`, directly or transitively, or is `parent` itself.
    /// The check and the insert happen under one lock.
    pub(crate) fn try_wait(
        &self,
        parent: &PackageId,
        dependency: &PackageId,
    ) -> Option<WaitGuard<'_>> {
        let mut edges = self.edges.lock();
        if reaches(&edges, dependency, parent) {
            return None;
        }

        *edges
            .entry(parent.clone())
            .or_default()
            .entry(dependency.clone())
            .or_default() += 1;

        Some(WaitGuard {
            graph: self,
            parent: parent.clone(),
            dependency: dependency.clone(),
        })
    }

    /// Number of recorded edges
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.edges.lock().values().flat_map(HashMap::values).sum()
    }
}

/// Removes its edge when dropped
#[derive(Debug)]
pub(crate) struct WaitGuard<'a> {
    graph: &'a WaitGraph,
    parent: PackageId,
    dependency: PackageId,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        let mut edges = self.graph.edges.lock();
        let Some(dependencies) = edges.get_mut(&self.parent) else {
            return;
        };
        if let Some(count) = dependencies.get_mut(&self.dependency) {
            *count -= 1;
            if *count == 0 {
                dependencies.remove(&self.dependency);
            }
        }
        if dependencies.is_empty() {
            edges.remove(&self.parent);
        }
    }
}

fn reaches(
    edges: &HashMap<PackageId, HashMap<PackageId, usize>>,
    from: &PackageId,
    to: &PackageId,
) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();

    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = edges.get(node) {
            stack.extend(next.keys());
        }
    }
    false
}
