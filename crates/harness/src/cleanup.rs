use std::future::Future;
use std::pin::Pin;

use futures::future::join_all;
use tracing::{debug, warn};
use transit_error::Result;

type CleanupFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Deferred releases for resources a run creates.
///
/// Register an action at the point the resource is created; `run` executes
/// everything concurrently (actions are independent, distinct container
/// deletions) and best-effort — a failed action is logged at `warn` and must
/// not block the others or mask the run's primary error.
#[derive(Default)]
pub struct CleanupScope {
    actions: Vec<(String, CleanupFuture)>,
}

impl CleanupScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defer a release. `label` names the resource for the teardown log.
    pub fn defer<Fut>(&mut self, label: impl Into<String>, action: Fut)
    where
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.actions.push((label.into(), Box::pin(action)));
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Execute all deferred releases concurrently.
    pub async fn run(self) {
        if self.actions.is_empty() {
            return;
        }
        let (labels, futures): (Vec<_>, Vec<_>) = self.actions.into_iter().unzip();
        let outcomes = join_all(futures).await;
        for (label, outcome) in labels.into_iter().zip(outcomes) {
            match outcome {
                Ok(()) => debug!(resource = %label, "cleaned up"),
                Err(e) => warn!(resource = %label, error = %e, "cleanup failed"),
            }
        }
    }
}

impl std::fmt::Debug for CleanupScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupScope")
            .field("pending", &self.actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use transit_error::TransitError;

    #[tokio::test]
    async fn runs_every_action_despite_failures() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut scope = CleanupScope::new();

        let counter = ran.clone();
        scope.defer("first", async move {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        scope.defer("failing", async {
            Err(TransitError::assertion("deletion returned status 500", "container"))
        });
        let counter = ran.clone();
        scope.defer("last", async move {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        assert_eq!(scope.len(), 3);
        scope.run().await;

        assert_eq!(ran.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn empty_scope_is_a_no_op() {
        let scope = CleanupScope::new();
        assert!(scope.is_empty());
        scope.run().await;
    }
}
