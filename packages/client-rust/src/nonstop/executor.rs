//! Bounded-wait execution of distributed operations under a resolved
//! non-stop policy.
//!
//! The registry decides *which* policy governs a call; this executor carries
//! out the wait: block the caller up to `timeout_millis` for the cluster's
//! answer, racing the transport's shutdown signal, and on expiry hand back
//! the policy's substituted behavior instead of an error. Shutdown and a
//! true timeout resolve through the same substitution path — the caller
//! never sees a different failure mode for cancellation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use gridkit_core::{NonStopPolicy, ReadTimeoutBehavior, WriteTimeoutBehavior};
use tracing::debug;

use crate::transport::ClusterStatus;

/// Result of running one operation under a non-stop policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T, B> {
    /// The cluster answered within the bounded wait.
    Completed(T),
    /// The wait expired (or shutdown intervened); the caller applies the
    /// substituted behavior — raise, return empty, or fall back locally.
    /// Executing the substitution belongs to the data-structure layer.
    Degraded(B),
}

impl<T, B> Outcome<T, B> {
    /// The completed value, if the operation finished in time.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Degraded(_) => None,
        }
    }
}

/// Outcome of a read operation.
pub type ReadOutcome<T> = Outcome<T, ReadTimeoutBehavior>;

/// Outcome of a write operation.
pub type WriteOutcome<T> = Outcome<T, WriteTimeoutBehavior>;

/// Runs operation futures under resolved non-stop policies.
///
/// Holds the transport's cluster status latch so pending waits resolve when
/// shutdown is triggered.
#[derive(Debug, Clone)]
pub struct NonStopExecutor {
    cluster: Arc<ClusterStatus>,
}

impl NonStopExecutor {
    /// Creates an executor bound to the transport's status latch.
    #[must_use]
    pub fn new(cluster: Arc<ClusterStatus>) -> Self {
        Self { cluster }
    }

    /// Awaits a read operation under `policy`.
    ///
    /// With non-stop disabled the call is an ordinary blocking await: no
    /// timeout, no substitution. Otherwise the wait is bounded by
    /// `timeout_millis` (zero when `immediate_timeout` is set — the
    /// operation is polled once but never waited on) and by the shutdown
    /// signal.
    pub async fn run_read<F, T>(&self, policy: &NonStopPolicy, operation: F) -> ReadOutcome<T>
    where
        F: Future<Output = T>,
    {
        match self.bounded(policy, operation).await {
            Some(value) => Outcome::Completed(value),
            None => {
                debug!(
                    timeout_millis = policy.timeout_millis,
                    behavior = %policy.read_behavior,
                    "read degraded by non-stop policy"
                );
                Outcome::Degraded(policy.read_behavior)
            }
        }
    }

    /// Awaits a write operation under `policy`. Same contract as
    /// [`NonStopExecutor::run_read`] with the write-side behavior.
    pub async fn run_write<F, T>(&self, policy: &NonStopPolicy, operation: F) -> WriteOutcome<T>
    where
        F: Future<Output = T>,
    {
        match self.bounded(policy, operation).await {
            Some(value) => Outcome::Completed(value),
            None => {
                debug!(
                    timeout_millis = policy.timeout_millis,
                    behavior = %policy.write_behavior,
                    "write degraded by non-stop policy"
                );
                Outcome::Degraded(policy.write_behavior)
            }
        }
    }

    async fn bounded<F, T>(&self, policy: &NonStopPolicy, operation: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        if !policy.enabled {
            // Non-stop semantics bypassed entirely: immediate-timeout and
            // behaviors do not apply, the call blocks like any other.
            return Some(operation.await);
        }
        if self.cluster.is_shut_down() {
            return None;
        }

        let wait = if policy.immediate_timeout {
            Duration::ZERO
        } else {
            Duration::from_millis(policy.timeout_millis)
        };
        let mut shutdown = self.cluster.shutdown_receiver();
        tokio::select! {
            result = tokio::time::timeout(wait, operation) => result.ok(),
            // A closed sender counts as shutdown: the transport is gone.
            _ = shutdown.changed() => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::future::pending;

    use super::*;

    fn executor() -> (NonStopExecutor, Arc<ClusterStatus>) {
        let cluster = Arc::new(ClusterStatus::new());
        (NonStopExecutor::new(Arc::clone(&cluster)), cluster)
    }

    fn enabled_policy(timeout_millis: u64) -> NonStopPolicy {
        NonStopPolicy::exception_bound(timeout_millis)
    }

    #[tokio::test(start_paused = true)]
    async fn completes_within_the_bounded_wait() {
        let (executor, _cluster) = executor();
        let outcome = executor.run_read(&enabled_policy(1_000), async { 5 }).await;
        assert_eq!(outcome, Outcome::Completed(5));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_substitutes_the_read_behavior() {
        let (executor, _cluster) = executor();
        let outcome = executor
            .run_read(&enabled_policy(50), pending::<i32>())
            .await;
        assert_eq!(outcome, Outcome::Degraded(ReadTimeoutBehavior::Exception));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_substitutes_the_write_behavior() {
        let (executor, _cluster) = executor();
        let policy = NonStopPolicy {
            write_behavior: WriteTimeoutBehavior::NoOp,
            ..enabled_policy(50)
        };
        let outcome = executor.run_write(&policy, pending::<()>()).await;
        assert_eq!(outcome, Outcome::Degraded(WriteTimeoutBehavior::NoOp));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_timeout_never_waits() {
        let (executor, _cluster) = executor();
        let policy = NonStopPolicy {
            immediate_timeout: true,
            ..enabled_policy(60_000)
        };

        let before = tokio::time::Instant::now();
        let outcome = executor.run_read(&policy, pending::<i32>()).await;
        assert_eq!(outcome, Outcome::Degraded(ReadTimeoutBehavior::Exception));
        assert_eq!(tokio::time::Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_timeout_still_accepts_a_ready_answer() {
        let (executor, _cluster) = executor();
        let policy = NonStopPolicy {
            immediate_timeout: true,
            ..enabled_policy(60_000)
        };
        let outcome = executor.run_read(&policy, async { 7 }).await;
        assert_eq!(outcome, Outcome::Completed(7));
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_policy_bypasses_nonstop_entirely() {
        let (executor, _cluster) = executor();
        let policy = NonStopPolicy {
            enabled: false,
            immediate_timeout: true,
            timeout_millis: 10,
            ..NonStopPolicy::default()
        };
        // Far beyond the configured timeout: with non-stop disabled the
        // call simply blocks until the operation finishes.
        let outcome = executor
            .run_read(&policy, async {
                tokio::time::sleep(Duration::from_secs(300)).await;
                42
            })
            .await;
        assert_eq!(outcome, Outcome::Completed(42));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_resolves_pending_waits_as_degraded() {
        let (executor, cluster) = executor();
        let trigger = tokio::spawn({
            let cluster = Arc::clone(&cluster);
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                cluster.trigger_shutdown();
            }
        });

        let outcome = executor
            .run_read(&enabled_policy(600_000), pending::<i32>())
            .await;
        assert_eq!(outcome, Outcome::Degraded(ReadTimeoutBehavior::Exception));
        trigger.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn already_shut_down_degrades_without_polling_the_clock() {
        let (executor, cluster) = executor();
        cluster.trigger_shutdown();
        let outcome = executor
            .run_write(&enabled_policy(600_000), pending::<()>())
            .await;
        assert_eq!(outcome, Outcome::Degraded(WriteTimeoutBehavior::Exception));
    }
}
