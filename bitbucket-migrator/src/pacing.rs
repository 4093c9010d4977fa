//! Fixed pacing between API calls.
//!
//! Both platforms enforce request quotas, so every mutating call is followed
//! by a fixed pause. All waits go through a [`Sleeper`] so tests can record
//! them instead of sleeping.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Pause after each mutating call to GitHub, and after each repository.
pub const MUTATION_DELAY: Duration = Duration::from_millis(500);

/// Pause between Bitbucket permission writes.
pub const PERMISSION_DELAY: Duration = Duration::from_millis(16);

/// Pause before each repository existence probe.
pub const PROBE_DELAY: Duration = Duration::from_millis(200);

/// Pause between unsuccessful existence probes.
pub const PROBE_BACKOFF: Duration = Duration::from_secs(1);

/// Number of existence probes before giving up on a new repository.
pub const PROBE_ATTEMPTS: u32 = 20;

/// Suspends the current task.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delays used by the pacer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingTimings {
    /// After each mutating call and each repository.
    pub mutation: Duration,
    /// Between permission writes.
    pub permission: Duration,
    /// Before each existence probe.
    pub probe: Duration,
    /// After an unsuccessful existence probe.
    pub probe_backoff: Duration,
    /// Probe budget.
    pub probe_attempts: u32,
}

impl Default for PacingTimings {
    fn default() -> Self {
        Self {
            mutation: MUTATION_DELAY,
            permission: PERMISSION_DELAY,
            probe: PROBE_DELAY,
            probe_backoff: PROBE_BACKOFF,
            probe_attempts: PROBE_ATTEMPTS,
        }
    }
}

/// Enforces the fixed delays between calls.
#[derive(Clone)]
pub struct Pacer {
    sleeper: Arc<dyn Sleeper>,
    timings: PacingTimings,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Arc::new(TokioSleeper), PacingTimings::default())
    }
}

impl Pacer {
    /// Creates a pacer with the given sleeper and delays.
    #[must_use]
    pub fn new(sleeper: Arc<dyn Sleeper>, timings: PacingTimings) -> Self {
        Self { sleeper, timings }
    }

    /// Returns the configured delays.
    #[must_use]
    pub fn timings(&self) -> &PacingTimings {
        &self.timings
    }

    /// Waits after a mutating call.
    pub async fn after_mutation(&self) {
        self.pause(self.timings.mutation).await;
    }

    /// Waits between two permission writes.
    pub async fn between_permission_writes(&self) {
        self.pause(self.timings.permission).await;
    }

    /// Waits before an existence probe.
    pub async fn before_probe(&self) {
        self.pause(self.timings.probe).await;
    }

    /// Waits after a probe that did not find the repository.
    pub async fn after_failed_probe(&self) {
        self.pause(self.timings.probe_backoff).await;
    }

    /// Waits between two repositories.
    pub async fn between_repositories(&self) {
        self.pause(self.timings.mutation).await;
    }

    async fn pause(&self, duration: Duration) {
        trace!(?duration, "Pacing");
        self.sleeper.sleep(duration).await;
    }
}
