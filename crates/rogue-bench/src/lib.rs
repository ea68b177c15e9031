//! Benchmark graph profiles for the rogue simulator.
//!
//! Provides pre-built [`SignalGraph`] layouts for benchmarking:
//!
//! - [`chain_profile`]: `n` relay clients wired head to tail
//! - [`fan_out_profile`]: one ramp source feeding `n` listened sinks
//! - [`relay`]: callback copying one port of a client onto another

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rogue_core::{CallbackError, ClientHandle, GraphError};
use rogue_engine::SignalGraph;

/// Callback copying `from` onto `to` on the same client.
pub fn relay(
    from: &'static str,
    to: &'static str,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    move |client| {
        let value = client.get_value(from)?;
        client.set_value(to, value)?;
        Ok(())
    }
}

/// Callback writing an increasing integer to `port`.
pub fn ramp(
    port: &'static str,
) -> impl FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static {
    let mut next: i64 = 0;
    move |client| {
        client.set_value(port, next)?;
        next += 1;
        Ok(())
    }
}

/// Build a chain of `len` relay clients.
///
/// `relay0` is driven by a ramp; every `relay{i}.out` connects to
/// `relay{i+1}.in`. Only the tail's `out` is listened, so each step
/// records one sample.
pub fn chain_profile(len: usize) -> Result<SignalGraph, GraphError> {
    let graph = SignalGraph::new();
    graph.add_client_with("source", ["out"], ramp("out"))?;
    let mut prev = String::from("source");
    for i in 0..len {
        let id = format!("relay{i}");
        graph.add_client_with(id.as_str(), ["in", "out"], relay("in", "out"))?;
        graph.connect((prev.as_str(), "out"), (id.as_str(), "in"))?;
        prev = id;
    }
    graph.listen(&prev, "out")?;
    Ok(graph)
}

/// Build one ramp source connected to `sinks` passive clients.
///
/// Every sink port is listened, so each step records `sinks` samples.
pub fn fan_out_profile(sinks: usize) -> Result<SignalGraph, GraphError> {
    let graph = SignalGraph::new();
    graph.add_client_with("source", ["out"], ramp("out"))?;
    for i in 0..sinks {
        let id = format!("sink{i}");
        graph.add_client(id.as_str(), ["in"])?;
        graph.connect(("source", "out"), (id.as_str(), "in"))?;
        graph.listen(&id, "in")?;
    }
    Ok(graph)
}
