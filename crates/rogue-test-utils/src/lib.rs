//! Test utilities and callback fixtures for rogue development.
//!
//! Provides the standard two-device port layout used across the graph
//! and server tests, plus callback factories in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    counting, failing_after, fatal_after, panicking_after, square_counter, CallCounter,
};

use std::time::{Duration, Instant};

use rogue_core::PortSpec;

/// Port layout of the reference fixture: `dev0{port0, port1}` and
/// `dev1{port2, port3}`, all starting at the default value.
///
/// Tests wire `dev0.port0 -> dev1.port3` on top of it.
pub fn two_device_graph_spec() -> Vec<(&'static str, PortSpec)> {
    vec![
        ("dev0", PortSpec::from(["port0", "port1"])),
        ("dev1", PortSpec::from(["port2", "port3"])),
    ]
}

/// Sleep for at least `duration` and return the time actually slept.
///
/// `thread::sleep` may wake early on some platforms; this keeps sleeping
/// until the full duration has passed.
pub fn sleep_at_least(duration: Duration) -> Duration {
    let start = Instant::now();
    loop {
        let slept = start.elapsed();
        if slept >= duration {
            return slept;
        }
        std::thread::sleep(duration - slept);
    }
}

/// Poll `cond` every millisecond until it holds or `timeout` passes.
/// Returns whether it held.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}
