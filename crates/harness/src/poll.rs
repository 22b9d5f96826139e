use std::future::Future;

use tokio::time::sleep;
use tracing::debug;
use transit_config::PollBudget;
use transit_error::Result;

/// Poll `probe` until it observes a value, the budget is exhausted, or it
/// fails.
///
/// Delay between attempts doubles from `base_delay` up to `max_delay`.
/// Semantics per probe outcome:
///
/// - `Ok(Some(value))` — observed; returns immediately.
/// - `Ok(None)` — nothing yet; sleep and try again while attempts remain.
/// - `Err(e)` — terminal; returned as-is with no further attempts. A non-200
///   listing response must surface immediately, not burn the budget.
///
/// Exhaustion returns `Ok(None)`; the caller decides what failure that is.
pub async fn poll_until<T, F, Fut>(budget: &PollBudget, mut probe: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut delay = budget.base_delay;

    for attempt in 1..=budget.max_attempts {
        if let Some(value) = probe().await? {
            debug!(attempt, "poll observed a value");
            return Ok(Some(value));
        }

        if attempt < budget.max_attempts {
            debug!(attempt, delay_ms = delay.as_millis() as u64, "nothing yet, backing off");
            sleep(delay).await;
            delay = std::cmp::min(delay * 2, budget.max_delay);
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use transit_error::TransitError;

    fn tight_budget(attempts: usize) -> PollBudget {
        PollBudget {
            max_attempts: attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[tokio::test]
    async fn returns_on_first_observation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_probe = calls.clone();

        let found = poll_until(&tight_budget(5), || {
            let calls = calls_probe.clone();
            async move {
                calls.fetch_add(1, Ordering::Relaxed);
                Ok(Some("dst-container"))
            }
        })
        .await
        .unwrap();

        assert_eq!(found, Some("dst-container"));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn keeps_polling_while_empty() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_probe = calls.clone();

        let found = poll_until(&tight_budget(5), || {
            let calls = calls_probe.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::Relaxed);
                Ok(if n >= 2 { Some(n) } else { None })
            }
        })
        .await
        .unwrap();

        assert_eq!(found, Some(2));
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn exhaustion_returns_none() {
        let found: Option<()> = poll_until(&tight_budget(3), || async { Ok(None) })
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn probe_error_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_probe = calls.clone();

        let err = poll_until::<(), _, _>(&tight_budget(5), || {
            let calls = calls_probe.clone();
            async move {
                calls.fetch_add(1, Ordering::Relaxed);
                Err(TransitError::assertion("listing returned status 500", "url"))
            }
        })
        .await
        .unwrap_err();

        assert!(err.is_assertion());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }
}
