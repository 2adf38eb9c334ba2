//! Optimistic local state.
//!
//! The local copy is updated before the remote write so the operator sees the
//! result immediately. If the write fails the pre-change snapshot comes back;
//! if it succeeds the caller reconciles with a fresh fetch.

use std::future::Future;

use tokio::sync::RwLock;

/// A value that is changed locally ahead of the remote commit.
#[derive(Debug, Default)]
pub struct Optimistic<T> {
    value: RwLock<T>,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Current value (a clone).
    pub async fn get(&self) -> T {
        self.value.read().await.clone()
    }

    /// Run `f` against the current value without cloning it.
    pub async fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.read().await)
    }

    /// Replace the value outright.
    pub async fn set(&self, value: T) {
        *self.value.write().await = value;
    }

    /// Show `next` immediately, then run `commit`.
    ///
    /// If `commit` fails the value is restored to what it was before `next`
    /// was applied and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the error from `commit`.
    pub async fn apply<F, Fut, E>(&self, next: T, commit: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let snapshot = std::mem::replace(&mut *self.value.write().await, next);
        match commit().await {
            Ok(()) => Ok(()),
            Err(e) => {
                *self.value.write().await = snapshot;
                Err(e)
            }
        }
    }

    /// Replace the value with authoritative data from `fetch`.
    ///
    /// On error the current value is kept.
    ///
    /// # Errors
    ///
    /// Returns the error from `fetch`.
    pub async fn reconcile<F, Fut, E>(&self, fetch: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let fresh = fetch().await?;
        self.set(fresh).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_commit_restores_snapshot() {
        let state = Optimistic::new(vec![1, 2, 3]);

        let result: Result<(), &str> = state
            .apply(vec![3, 2, 1], || async {
                assert_eq!(state.get().await, vec![3, 2, 1]);
                Err("boom")
            })
            .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(state.get().await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_successful_commit_keeps_new_value() {
        let state = Optimistic::new("before".to_string());
        let result: Result<(), ()> = state.apply("after".to_string(), || async { Ok(()) }).await;
        assert!(result.is_ok());
        assert_eq!(state.get().await, "after");
    }

    #[tokio::test]
    async fn test_reconcile_replaces_or_keeps() {
        let state = Optimistic::new(1);

        let ok: Result<(), ()> = state.reconcile(|| async { Ok(7) }).await;
        assert!(ok.is_ok());
        assert_eq!(state.get().await, 7);

        let failed: Result<(), &str> = state.reconcile(|| async { Err("offline") }).await;
        assert_eq!(failed, Err("offline"));
        assert_eq!(state.get().await, 7);
    }

    #[tokio::test]
    async fn test_with_reads_in_place() {
        let state = Optimistic::new(vec!["a", "b"]);
        assert_eq!(state.with(Vec::len).await, 2);
    }
}
