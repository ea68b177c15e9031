//! Core types and errors for the rogue IO hardware simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the data model shared by the rest of the workspace: signal values,
//! ports, clients and their callbacks, connection endpoints, recorded
//! sample series, and the error enums for each subsystem.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod client;
pub mod error;
pub mod port;
pub mod series;
pub mod value;
pub mod wiring;

pub use client::{Callback, Client, ClientHandle};
pub use error::{CallbackError, GraphError, StepError};
pub use port::{Port, PortSpec};
pub use series::{SampleData, Series};
pub use value::Value;
pub use wiring::{Connection, Jack};
