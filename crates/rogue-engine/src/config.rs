//! Scheduler and server configuration, validation, and error types.
//!
//! [`SchedulerConfig`] sets the stepping cadence; [`ServerConfig`] wraps it
//! with the server's restart policy. Both check their invariants with
//! `validate()` before any thread is spawned.

use std::time::Duration;

use thiserror::Error;

// ── SchedulerConfig ────────────────────────────────────────────────

/// Cadence of the background step loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Target interval between two invocations. `Duration::ZERO` runs as
    /// fast as possible. Default: zero.
    pub period: Duration,
    /// The loop sleeps `period / grain_divisor` between checks when an
    /// invocation is not yet due, bounding drift to about one grain.
    /// Default: 1000.
    pub grain_divisor: u32,
    /// Name given to the background thread. Default: `rogue-scheduler`.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: Duration::ZERO,
            grain_divisor: 1000,
            thread_name: "rogue-scheduler".into(),
        }
    }
}

impl SchedulerConfig {
    /// Config with the given period and default grain.
    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    /// Config from a period in seconds.
    ///
    /// Rejects negative, NaN, and infinite values.
    pub fn from_secs_f64(secs: f64) -> Result<Self, ConfigError> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(ConfigError::InvalidPeriod { value: secs });
        }
        Ok(Self::with_period(Duration::from_secs_f64(secs)))
    }

    /// The sleep granularity used between due-checks.
    pub fn grain(&self) -> Duration {
        self.period / self.grain_divisor.max(1)
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grain_divisor == 0 {
            return Err(ConfigError::ZeroGrain);
        }
        Ok(())
    }
}

// ── ServerConfig ───────────────────────────────────────────────────

/// Configuration for [`Server`](crate::server::Server).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Step loop cadence.
    pub scheduler: SchedulerConfig,
    /// Reset the graph's cycle counter to 0 when the server is killed, so
    /// a later `exec()` starts from a clean count. Default: true.
    pub reset_cycles_on_kill: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            reset_cycles_on_kill: true,
        }
    }
}

impl ServerConfig {
    /// Config stepping at the given period.
    pub fn with_period(period: Duration) -> Self {
        Self {
            scheduler: SchedulerConfig::with_period(period),
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scheduler.validate()
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors from configuration validation and scheduler lifecycle.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The period is negative, NaN, or infinite.
    #[error("period must be finite and non-negative, got {value}")]
    InvalidPeriod {
        /// The invalid value in seconds.
        value: f64,
    },
    /// `grain_divisor` is zero.
    #[error("grain_divisor must be at least 1")]
    ZeroGrain,
    /// `start()` was called while the loop is already running.
    #[error("scheduler is already running")]
    AlreadyRunning,
    /// The background thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// The OS error.
        reason: String,
    },
    /// The task could not be recovered from a previous run (its thread
    /// panicked outside the captured region).
    #[error("scheduled task could not be recovered from the previous run")]
    TaskRecoveryFailed,
}
