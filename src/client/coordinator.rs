use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const ERROR_TTL: Duration = Duration::from_millis(3000);

struct Inner<S> {
    value: S,
    error: Option<String>,
    error_epoch: u64,
}

/// Shared view state with optimistic updates: a mutation is applied locally
/// before the remote commit resolves; if the commit fails the snapshot taken
/// at apply time is restored and a transient error message is recorded. The
/// message clears after a fixed delay, or on the next successful mutation.
///
/// There is no mutation queue. Two overlapping updates on the same store
/// race, and the later completion wins against its own snapshot baseline.
pub struct OptimisticStore<S> {
    inner: Arc<Mutex<Inner<S>>>,
    error_ttl: Duration,
}

impl<S> Clone for OptimisticStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            error_ttl: self.error_ttl,
        }
    }
}

impl<S: Clone + Send + 'static> OptimisticStore<S> {
    pub fn new(value: S) -> Self {
        Self::with_error_ttl(value, ERROR_TTL)
    }

    pub fn with_error_ttl(value: S, error_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                error: None,
                error_epoch: 0,
            })),
            error_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.inner.lock().expect("optimistic store mutex poisoned")
    }

    pub fn snapshot(&self) -> S {
        self.lock().value.clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().value)
    }

    /// Replace the whole value, e.g. after a fresh load from the server.
    pub fn replace(&self, value: S) {
        self.lock().value = value;
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    /// Apply `apply` to the local value immediately, then await `commit`.
    /// On failure the pre-apply snapshot is restored and the error surfaced.
    pub async fn update<T, E, Fut>(&self, apply: impl FnOnce(&mut S), commit: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let snapshot;
        {
            let mut inner = self.lock();
            snapshot = inner.value.clone();
            apply(&mut inner.value);
        }

        match commit.await {
            Ok(value) => {
                self.lock().error = None;
                Ok(value)
            }
            Err(err) => {
                let epoch;
                {
                    let mut inner = self.lock();
                    inner.value = snapshot;
                    inner.error = Some(err.to_string());
                    inner.error_epoch += 1;
                    epoch = inner.error_epoch;
                }

                // Auto-clear, unless a newer error has taken over since.
                let store = self.clone();
                let ttl = self.error_ttl;
                tokio::spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let mut inner = store.lock();
                    if inner.error_epoch == epoch {
                        inner.error = None;
                    }
                });

                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn change_is_visible_before_the_commit_resolves() {
        let store = OptimisticStore::new(vec!["applied".to_string()]);
        let (tx, rx) = tokio::sync::oneshot::channel::<Result<(), String>>();

        let background = store.clone();
        let handle = tokio::spawn(async move {
            background
                .update(
                    |stages| stages[0] = "interview".to_string(),
                    async move { rx.await.expect("commit channel dropped") },
                )
                .await
        });

        // The commit is still pending, but the local state already moved.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(store.snapshot(), vec!["interview".to_string()]);

        tx.send(Ok(())).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(store.snapshot(), vec!["interview".to_string()]);
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_restores_the_snapshot_and_surfaces_an_error() {
        let store = OptimisticStore::new(vec!["applied".to_string()]);

        let result: Result<(), String> = store
            .update(
                |stages| stages[0] = "interview".to_string(),
                async { Err("Internal Server Error".to_string()) },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.snapshot(), vec!["applied".to_string()]);
        assert_eq!(store.last_error().as_deref(), Some("Internal Server Error"));
    }

    #[tokio::test(start_paused = true)]
    async fn error_auto_clears_after_the_ttl() {
        let store = OptimisticStore::new(0u32);

        let failed: Result<(), String> = store
            .update(|n| *n += 1, async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(store.last_error().is_some());

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn error_clears_on_the_next_successful_action() {
        let store = OptimisticStore::new(0u32);

        let failed: Result<(), String> = store
            .update(|n| *n += 1, async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert!(store.last_error().is_some());

        store
            .update(|n| *n += 1, async { Ok::<_, String>(()) })
            .await
            .unwrap();
        assert_eq!(store.last_error(), None);
        assert_eq!(store.snapshot(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn a_newer_error_is_not_cleared_by_an_older_timer() {
        let store = OptimisticStore::new(0u32);

        let first: Result<(), String> = store
            .update(|n| *n += 1, async { Err("first".to_string()) })
            .await;
        assert!(first.is_err());
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let second: Result<(), String> = store
            .update(|n| *n += 1, async { Err("second".to_string()) })
            .await;
        assert!(second.is_err());

        // The first timer fires here, but the second error is newer.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.last_error().as_deref(), Some("second"));

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(store.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_updates_race_last_write_wins() {
        let store = OptimisticStore::new(0u32);
        let (tx_a, rx_a) = tokio::sync::oneshot::channel::<Result<(), String>>();
        let (tx_b, rx_b) = tokio::sync::oneshot::channel::<Result<(), String>>();

        let store_a = store.clone();
        let a = tokio::spawn(async move {
            store_a
                .update(|n| *n = 1, async move { rx_a.await.unwrap() })
                .await
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let store_b = store.clone();
        let b = tokio::spawn(async move {
            store_b
                .update(|n| *n = 2, async move { rx_b.await.unwrap() })
                .await
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        // B fails after A applied: B's snapshot baseline (value 1) comes back,
        // discarding nothing of A's still-pending commit.
        tx_b.send(Err("boom".to_string())).unwrap();
        let _ = b.await.unwrap();
        assert_eq!(store.snapshot(), 1);

        tx_a.send(Ok(())).unwrap();
        a.await.unwrap().unwrap();
        assert_eq!(store.snapshot(), 1);
    }
}
