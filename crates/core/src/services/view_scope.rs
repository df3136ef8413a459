use std::future::Future;

use tokio::task::JoinSet;

/// Background fetches owned by one view.
///
/// Results are handed back only through [`ViewScope::next`] while the scope is
/// alive. Dropping the scope (or calling [`ViewScope::cancel_all`]) aborts every
/// pending fetch, so a torn-down view never receives stale results.
pub struct ViewScope<M> {
    tasks: JoinSet<M>,
    name: &'static str,
}

impl<M: Send + 'static> ViewScope<M> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            tasks: JoinSet::new(),
            name,
        }
    }

    /// Start a fetch on the current tokio runtime.
    pub fn spawn<F>(&mut self, fetch: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        self.tasks.spawn(fetch);
    }

    /// Number of fetches not yet collected.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next fetch to settle. `None` once nothing is pending.
    ///
    /// Aborted fetches are skipped; a fetch that panicked is logged and skipped.
    pub async fn next(&mut self) -> Option<M> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => return Some(result),
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    tracing::error!(scope = self.name, error = %e, "background fetch panicked");
                }
            }
        }
        None
    }

    /// Abort every pending fetch; their results are discarded.
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(scope = self.name, pending = self.tasks.len(), "cancelling fetches");
        }
        // Dropping the old set aborts its tasks and discards already-finished results.
        drop(std::mem::take(&mut self.tasks));
    }
}
