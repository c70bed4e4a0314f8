//! Fail-fast parallel wait

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Wait for every future to succeed, returning on the first failure.
///
/// The remaining futures are dropped, not driven to completion. Callers that
/// need them to finish anyway (dependency fetches must still land in
/// storage) pass handles to spawned tasks, which keep running when their
/// handle is dropped.
pub async fn join_all_or_fail_fast<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut pending: FuturesUnordered<F> = futures.into_iter().collect();
    let mut completed = Vec::with_capacity(pending.len());

    while let Some(result) = pending.next().await {
        completed.push(result?);
    }

    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_all_succeed() {
        let futures = (1..=3).map(|n| async move { Ok::<_, String>(n) });

        let mut results = join_all_or_fail_fast(futures).await.unwrap();
        results.sort();
        assert_eq!(results, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let futures: Vec<std::future::Ready<Result<u8, String>>> = Vec::new();
        assert!(join_all_or_fail_fast(futures).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_returns_first_failure_without_waiting() {
        let slow_finished = Arc::new(AtomicBool::new(false));

        let slow = {
            let slow_finished = slow_finished.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(500)).await;
                slow_finished.store(true, Ordering::SeqCst);
                Ok::<_, String>(())
            })
        };
        let failing = tokio::spawn(async { Err::<(), _>("boom".to_string()) });

        let handles = vec![slow, failing]
            .into_iter()
            .map(|handle| async move { handle.await.map_err(|e| e.to_string())? });

        let started = Instant::now();
        let result = join_all_or_fail_fast(handles).await;

        assert_eq!(result, Err("boom".to_string()));
        assert!(started.elapsed() < Duration::from_millis(400));
        assert!(!slow_finished.load(Ordering::SeqCst));

        // The spawned task is not cancelled by the early return
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(slow_finished.load(Ordering::SeqCst));
    }
}
