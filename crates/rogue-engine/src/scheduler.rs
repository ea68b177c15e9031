//! Periodic background execution with pull-based failure capture.
//!
//! [`Scheduler`] runs a task on a dedicated OS thread at a fixed period.
//! The task is moved into the thread on [`start()`](Scheduler::start) and
//! handed back through the `JoinHandle` on [`kill()`](Scheduler::kill),
//! so a scheduler can be stopped and restarted any number of times.
//!
//! # Failures
//!
//! Task errors never unwind the background thread and are never printed.
//! Each one is pushed onto an unbounded FIFO channel and stays there until
//! the owner drains it with [`process_errors()`](Scheduler::process_errors).
//! Whether the loop keeps going after a failure is decided by
//! [`Severity::is_fatal`]; a panic escaping the task is always fatal.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use tracing::{error, info, warn};

use rogue_core::StepError;

use crate::config::{ConfigError, SchedulerConfig};
use crate::graph::panic_message;

// ── Severity ─────────────────────────────────────────────────────

/// Classifies task failures as recoverable or fatal.
pub trait Severity {
    /// `true` if the scheduler loop must stop after this failure.
    fn is_fatal(&self) -> bool;
}

impl Severity for StepError {
    fn is_fatal(&self) -> bool {
        StepError::is_fatal(self)
    }
}

// ── TaskFailure ──────────────────────────────────────────────────

/// A failure captured on the scheduler thread.
#[derive(Debug, Error)]
pub enum TaskFailure<E> {
    /// The task returned an error.
    #[error(transparent)]
    Task(E),
    /// The task panicked.
    #[error("scheduled task panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl<E: Severity> TaskFailure<E> {
    /// Whether this failure stopped the loop.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Task(e) => e.is_fatal(),
            Self::Panicked { .. } => true,
        }
    }
}

/// Boxed task run by the scheduler.
pub type Task<E> = Box<dyn FnMut() -> Result<(), E> + Send>;

// ── LoopState ────────────────────────────────────────────────────

/// State held by the scheduler thread's main loop.
struct LoopState<E> {
    task: Task<E>,
    period: Duration,
    grain: Duration,
    shutdown: Arc<AtomicBool>,
    invocations: Arc<AtomicU64>,
    errors: Sender<TaskFailure<E>>,
}

impl<E: Severity + std::fmt::Display + Send + 'static> LoopState<E> {
    /// Main loop. Runs until `shutdown` is set or a fatal failure occurs.
    ///
    /// Consumes self and returns the task so the scheduler can restart it.
    fn run(mut self) -> Task<E> {
        let mut last: Option<Instant> = None;
        while !self.shutdown.load(Ordering::Acquire) {
            let now = Instant::now();
            let due = last.is_none_or(|l| now.duration_since(l) >= self.period);
            if !due {
                self.pause();
                continue;
            }
            last = Some(now);
            self.invocations.fetch_add(1, Ordering::AcqRel);

            let failure = match panic::catch_unwind(AssertUnwindSafe(|| (self.task)())) {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(TaskFailure::Task(e)),
                Err(payload) => Some(TaskFailure::Panicked {
                    message: panic_message(payload.as_ref()),
                }),
            };
            if let Some(failure) = failure {
                let fatal = failure.is_fatal();
                if fatal {
                    error!(error = %failure, "fatal failure, scheduler stopping");
                } else {
                    warn!(error = %failure, "task failed, captured for process_errors");
                }
                // The receiver lives as long as the scheduler, which joins
                // this thread before dropping it.
                let _ = self.errors.send(failure);
                if fatal {
                    break;
                }
            }
        }
        self.task
    }

    /// Wait one grain, or yield when running flat out.
    ///
    /// `park_timeout` instead of `sleep` so `kill()` can wake the thread
    /// immediately.
    fn pause(&self) {
        if self.grain.is_zero() {
            thread::yield_now();
        } else {
            thread::park_timeout(self.grain);
        }
    }
}

// ── Scheduler ────────────────────────────────────────────────────

/// Runs a task periodically on a background thread.
///
/// The first invocation happens immediately on `start()`. After that the
/// task runs whenever at least `period` has elapsed since the previous
/// invocation began; between checks the thread parks for
/// `period / grain_divisor`, bounding drift to about one grain.
pub struct Scheduler<E> {
    config: SchedulerConfig,
    task: Option<Task<E>>,
    handle: Option<JoinHandle<Task<E>>>,
    shutdown: Arc<AtomicBool>,
    invocations: Arc<AtomicU64>,
    errors_tx: Sender<TaskFailure<E>>,
    errors_rx: Receiver<TaskFailure<E>>,
}

impl<E: Severity + std::fmt::Display + Send + 'static> Scheduler<E> {
    /// A stopped scheduler for `task`.
    pub fn new<F>(config: SchedulerConfig, task: F) -> Result<Self, ConfigError>
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
    {
        config.validate()?;
        // Unbounded: a failure is never dropped because the owner has
        // not polled yet.
        let (errors_tx, errors_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            config,
            task: Some(Box::new(task)),
            handle: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            invocations: Arc::new(AtomicU64::new(0)),
            errors_tx,
            errors_rx,
        })
    }

    /// Spawn the background loop.
    ///
    /// # Errors
    ///
    /// [`ConfigError::AlreadyRunning`] if started twice without `kill()`,
    /// [`ConfigError::ThreadSpawnFailed`] if the OS refuses the thread,
    /// [`ConfigError::TaskRecoveryFailed`] if a previous run lost the task.
    pub fn start(&mut self) -> Result<(), ConfigError> {
        if self.handle.is_some() {
            return Err(ConfigError::AlreadyRunning);
        }
        let task = self.task.take().ok_or(ConfigError::TaskRecoveryFailed)?;

        self.shutdown.store(false, Ordering::Release);
        let state = LoopState {
            task,
            period: self.config.period,
            grain: self.config.grain(),
            shutdown: Arc::clone(&self.shutdown),
            invocations: Arc::clone(&self.invocations),
            errors: self.errors_tx.clone(),
        };
        // On spawn failure the closure, and the task inside it, is gone.
        let handle = thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        info!(
            thread = %self.config.thread_name,
            period_us = self.config.period.as_micros() as u64,
            "scheduler started"
        );
        self.handle = Some(handle);
        Ok(())
    }

    /// Stop the loop and wait for the thread to exit.
    ///
    /// After this returns the task will not be invoked again until the
    /// next `start()`. Calling it on a stopped scheduler is a no-op.
    pub fn kill(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::Release);
        handle.thread().unpark();
        match handle.join() {
            Ok(task) => self.task = Some(task),
            Err(payload) => {
                error!(
                    message = %panic_message(payload.as_ref()),
                    "scheduler thread panicked, task lost"
                );
            }
        }
        info!(
            thread = %self.config.thread_name,
            invocations = self.invocations(),
            "scheduler stopped"
        );
    }

    /// Surface the oldest captured failure, if any.
    ///
    /// Returns `Err` with at most one failure per call, oldest first, and
    /// `Ok(())` when nothing is pending.
    pub fn process_errors(&self) -> Result<(), TaskFailure<E>> {
        match self.errors_rx.try_recv() {
            Ok(failure) => Err(failure),
            Err(_) => Ok(()),
        }
    }

    /// Number of captured failures not yet drained.
    pub fn pending_errors(&self) -> usize {
        self.errors_rx.len()
    }

    /// Whether the background thread is alive.
    ///
    /// `false` after `kill()`, and also once the loop has exited on its
    /// own after a fatal failure.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Total task invocations across all runs.
    pub fn invocations(&self) -> u64 {
        self.invocations.load(Ordering::Acquire)
    }

    /// The configuration this scheduler was built with.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl<E> Drop for Scheduler<E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.shutdown.store(true, Ordering::Release);
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl<E> std::fmt::Debug for Scheduler<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("running", &self.handle.is_some())
            .field("invocations", &self.invocations.load(Ordering::Relaxed))
            .field("pending_errors", &self.errors_rx.len())
            .finish()
    }
}
