//! State polling used by `check` commands and post-action waits.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::command::RunContext;
use crate::error::CommandError;

static POLL_INTERVAL_MS: AtomicU64 = AtomicU64::new(5_000);

/// Override the delay between two state fetches, process-wide.
pub fn set_poll_interval(interval: Duration) {
    POLL_INTERVAL_MS.store(interval.as_millis() as u64, Ordering::SeqCst);
}

pub fn poll_interval() -> Duration {
    Duration::from_millis(POLL_INTERVAL_MS.load(Ordering::SeqCst))
}

/// Read a `timeout=` parameter as whole seconds. Negative values are
/// rejected.
pub fn timeout_secs(value: i64) -> Result<u64, CommandError> {
    u64::try_from(value).map_err(|_| CommandError::InvalidParam {
        key: "timeout".into(),
        message: format!("expected a non-negative number of seconds, got {}", value),
    })
}

/// Fetch a state until it equals `expected` (ignoring case), the timeout
/// expires or the run is cancelled. Returns the last observed state.
///
/// A timeout too large to be represented as a deadline never expires.
pub async fn poll_until<F, Fut>(
    ctx: &RunContext,
    timeout_secs: u64,
    expected: &str,
    mut fetch: F,
) -> Result<String, CommandError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, CommandError>>,
{
    let deadline = Instant::now().checked_add(Duration::from_secs(timeout_secs));
    loop {
        if ctx.is_cancelled() {
            return Err(CommandError::Cancelled);
        }
        let state = fetch().await?;
        if state.eq_ignore_ascii_case(expected) {
            info!(state = %state, "check: expected state reached");
            return Ok(state);
        }
        let mut wait = poll_interval();
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Err(CommandError::Timeout(timeout_secs));
            }
            wait = wait.min(deadline - now);
        }
        debug!(state = %state, expected, "check: waiting");
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;

    fn fast() {
        set_poll_interval(Duration::from_millis(1));
    }

    #[tokio::test]
    async fn returns_once_state_matches() {
        fast();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let state = poll_until(&RunContext::default(), 5, "RUNNING", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(if n < 2 { "pending" } else { "running" }.to_string())
            }
        })
        .await
        .unwrap();
        assert_eq!(state, "running");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn times_out() {
        fast();
        let err = poll_until(&RunContext::default(), 0, "running", || async {
            Ok("pending".to_string())
        })
        .await
        .unwrap_err();
        assert_eq!(err, CommandError::Timeout(0));
        assert_eq!(err.to_string(), "timeout of 0s expired");
    }

    #[tokio::test]
    async fn stops_when_cancelled() {
        fast();
        let ctx = RunContext::default();
        ctx.cancel();
        let err = poll_until(&ctx, 5, "running", || async { Ok("pending".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::Cancelled);
    }

    #[tokio::test]
    async fn unrepresentable_timeout_never_expires() {
        fast();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let state = poll_until(&RunContext::default(), u64::MAX, "running", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(if n == 0 { "pending" } else { "running" }.to_string()) }
        })
        .await
        .unwrap();
        assert_eq!(state, "running");
    }

    #[test]
    fn negative_timeouts_are_rejected() {
        assert_eq!(timeout_secs(180), Ok(180));
        assert_eq!(timeout_secs(i64::MAX), Ok(i64::MAX as u64));
        assert!(matches!(
            timeout_secs(-1),
            Err(CommandError::InvalidParam { ref key, .. }) if key == "timeout"
        ));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let err = poll_until(&RunContext::default(), 5, "running", || async {
            Err(CommandError::Other("boom".into()))
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
