//! Execution context for query execution.
//!
//! The context carries the cancellation signal, execution statistics and
//! runtime configuration. It is passed explicitly to every `consume()` call;
//! operators never reach for ambient state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Execution context for a query.
#[derive(Debug)]
pub struct ExecutionContext {
    /// Shared abort signal.
    cancellation: CancellationToken,
    /// Execution statistics.
    stats: ExecutionStats,
    /// Configuration options.
    config: ExecutionConfig,
}

impl ExecutionContext {
    /// Creates a new execution context with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            stats: ExecutionStats::new(),
            config: ExecutionConfig::default(),
        }
    }

    /// Sets the execution configuration.
    #[must_use]
    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Creates a context for another execution context of the same query.
    ///
    /// The fork shares the cancellation token and configuration but starts
    /// with fresh statistics.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            cancellation: self.cancellation.clone(),
            stats: ExecutionStats::new(),
            config: self.config.clone(),
        }
    }

    /// Cancels the query execution.
    #[inline]
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Checks if the query has been cancelled.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Returns a handle that can cancel this query from another thread.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Returns the execution statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Returns true if operators should time their consume calls.
    #[inline]
    #[must_use]
    pub fn profiling(&self) -> bool {
        self.config.profile
    }

    /// Records that records were produced at the plan root.
    #[inline]
    pub fn record_records_produced(&self, count: u64) {
        if self.config.collect_stats {
            self.stats.records_produced.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Records that execution stopped because of cancellation.
    #[inline]
    pub fn record_cancelled_consume(&self) {
        self.stats.cancelled_consumes.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution statistics collected during query execution.
#[derive(Debug)]
pub struct ExecutionStats {
    /// When execution started.
    start_time: Instant,
    /// Number of records produced at the plan root.
    records_produced: AtomicU64,
    /// Number of consume calls cut short by cancellation.
    cancelled_consumes: AtomicU64,
}

impl ExecutionStats {
    /// Creates new execution statistics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            records_produced: AtomicU64::new(0),
            cancelled_consumes: AtomicU64::new(0),
        }
    }

    /// Returns the number of records produced.
    #[inline]
    #[must_use]
    pub fn records_produced(&self) -> u64 {
        self.records_produced.load(Ordering::Relaxed)
    }

    /// Returns the number of consume calls that observed cancellation.
    #[inline]
    #[must_use]
    pub fn cancelled_consumes(&self) -> u64 {
        self.cancelled_consumes.load(Ordering::Relaxed)
    }

    /// Returns the elapsed execution time.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration options for query execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Whether operators accumulate wall-clock time spent in `consume`.
    pub profile: bool,
    /// Whether the executor counts produced records in [`ExecutionStats`].
    pub collect_stats: bool,
}

impl ExecutionConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub const fn new() -> Self {
        Self { profile: false, collect_stats: true }
    }

    /// Enables per-operator profiling.
    #[must_use]
    pub const fn with_profiling(mut self) -> Self {
        self.profile = true;
        self
    }

    /// Disables statistics collection.
    #[must_use]
    pub const fn without_stats(mut self) -> Self {
        self.collect_stats = false;
        self
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle for cancelling query execution.
///
/// Can be shared between threads to allow cancellation from outside
/// the query execution thread.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    /// Cancels the associated query.
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Checks if cancellation was requested.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
