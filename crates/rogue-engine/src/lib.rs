//! Simulation engine for the rogue IO hardware simulator.
//!
//! Provides the [`SignalGraph`] with its single-step update algorithm, the
//! [`Recorder`] of timestamped samples, the periodic [`Scheduler`] with
//! pull-based failure capture, and the [`Server`] tying them together.
//! The graph can also be stepped directly for lockstep use.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod graph;
pub mod metrics;
pub mod recorder;
pub mod scheduler;
pub mod server;

pub use config::{ConfigError, SchedulerConfig, ServerConfig};
pub use graph::{SignalGraph, StepResult};
pub use metrics::StepMetrics;
pub use recorder::Recorder;
pub use scheduler::{Scheduler, Severity, Task, TaskFailure};
pub use server::Server;
