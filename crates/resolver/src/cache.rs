//! Process-lifetime memo of fetched coordinates

use dashmap::DashMap;
use protoloc_errors::ResolutionError;
use protoloc_types::{CoordinateKey, ResolvedExecutable};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Coordinate key to resolved executable, never evicted
///
/// Each key owns a `OnceCell`. Concurrent callers for the same key wait on
/// the first initializer instead of fetching again. A failed initializer
/// leaves the cell empty, so the next caller retries. Entries only become
/// visible once the initializer returned successfully.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: DashMap<CoordinateKey, Arc<OnceCell<ResolvedExecutable>>>,
}

impl ResolutionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed entry for `key`, if any
    #[must_use]
    pub fn get(&self, key: &CoordinateKey) -> Option<ResolvedExecutable> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of completed entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the entry for `key`, running `init` only if no caller has
    /// completed it yet
    ///
    /// The boolean is `true` when the value came from the cache, i.e. this
    /// call did not run `init`.
    ///
    /// # Errors
    ///
    /// Returns the initializer's error; the entry stays empty.
    pub async fn get_or_try_init<F, Fut>(
        &self,
        key: &CoordinateKey,
        init: F,
    ) -> Result<(ResolvedExecutable, bool), ResolutionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolvedExecutable, ResolutionError>>,
    {
        // Clone the cell out so no map shard lock is held across the await
        let cell = Arc::clone(&self.entries.entry(key.clone()).or_default());

        let mut initialized_here = false;
        let value = cell
            .get_or_try_init(|| {
                initialized_here = true;
                init()
            })
            .await?;
        Ok((value.clone(), !initialized_here))
    }
}
