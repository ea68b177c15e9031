//! Rogue: a software-in-the-loop simulator for wired IO hardware.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rogue sub-crates. Simulated devices are clients with named ports;
//! connections copy values between ports once per step, and listened ports
//! are sampled into timestamped series.
//!
//! # Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use rogue::prelude::*;
//!
//! let mut server = Server::with_period(Duration::from_millis(1)).unwrap();
//!
//! // A device whose callback ramps its output every step.
//! let mut next: i64 = 0;
//! server
//!     .add_client_with("adc", ["out"], move |client: &mut ClientHandle<'_>| {
//!         client.set_value("out", next)?;
//!         next += 1;
//!         Ok(())
//!     })
//!     .unwrap();
//! server.add_client("dut", ["in"]).unwrap();
//! server.connect(("adc", "out"), ("dut", "in")).unwrap();
//! server.listen("dut", "in").unwrap();
//!
//! server.exec().unwrap();
//! while server.cycle_count() < 3 {
//!     std::thread::sleep(Duration::from_millis(1));
//! }
//! server.kill();
//! server.process_errors().unwrap();
//!
//! let series = server.series("dut", "in").unwrap();
//! assert_eq!(series.values[..3], [Value::Int(0), Value::Int(1), Value::Int(2)]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rogue-core` | Values, ports, clients, wiring, series, errors |
//! | [`engine`] | `rogue-engine` | Signal graph, recorder, scheduler, server |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core data model and errors (`rogue-core`).
///
/// Contains [`types::Value`], [`types::Client`] and its callback handle,
/// the [`types::Jack`] and [`types::Connection`] wiring types, and the
/// [`types::Series`] sample container.
pub use rogue_core as types;

/// Simulation engine (`rogue-engine`).
///
/// [`engine::SignalGraph`] for direct lockstep stepping,
/// [`engine::Server`] for periodic background stepping.
pub use rogue_engine as engine;

/// Common imports for typical rogue usage.
///
/// ```rust
/// use rogue::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use rogue_core::{
        Callback, Client, ClientHandle, Connection, Jack, PortSpec, SampleData, Series, Value,
    };

    // Errors
    pub use rogue_core::{CallbackError, GraphError, StepError};

    // Engine
    pub use rogue_engine::{
        ConfigError, Scheduler, SchedulerConfig, Server, ServerConfig, SignalGraph, StepMetrics,
        StepResult, TaskFailure,
    };
}
