//! The signal graph: clients, connections, and the single-step update.
//!
//! [`SignalGraph`] owns every client and connection behind one mutex.
//! All structural setup, value reads and writes, and the step itself are
//! serialised by that lock, giving per-operation sequential consistency.
//!
//! # Step order
//!
//! One [`step()`](SignalGraph::step) runs, under the lock:
//!
//! 1. every client callback once, in `add_client` order;
//! 2. every connection once, in `connect` order, copying the sender's
//!    current value into the receiver. A chain `a -> b -> c` therefore
//!    carries `a`'s value all the way to `c` within one step;
//! 3. the cycle counter increment.
//!
//! Listened ports are sampled before the lock is released and appended to
//! the [`Recorder`] afterwards.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use rogue_core::{
    CallbackError, Client, ClientHandle, Connection, GraphError, Jack, PortSpec, SampleData,
    Series, StepError, Value,
};

use crate::metrics::StepMetrics;
use crate::recorder::Recorder;

// ── StepResult ───────────────────────────────────────────────────

/// Result of a successful [`SignalGraph::step()`].
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    /// Cycle count after the step.
    pub cycle: u64,
    /// Timestamp of the step, in seconds since the time origin.
    pub time: f64,
    /// Timing and volume metrics.
    pub metrics: StepMetrics,
}

// ── GraphState ───────────────────────────────────────────────────

struct GraphState {
    clients: IndexMap<String, Client>,
    connections: IndexSet<Connection>,
    listened: IndexSet<Jack>,
    cycle_count: u64,
    origin: Instant,
    last_metrics: StepMetrics,
}

impl GraphState {
    fn client(&self, client: &str) -> Result<&Client, GraphError> {
        self.clients
            .get(client)
            .ok_or_else(|| GraphError::ClientNotFound {
                client: client.to_owned(),
            })
    }

    fn client_mut(&mut self, client: &str) -> Result<&mut Client, GraphError> {
        self.clients
            .get_mut(client)
            .ok_or_else(|| GraphError::ClientNotFound {
                client: client.to_owned(),
            })
    }

    fn check_port(&self, jack: &Jack) -> Result<(), GraphError> {
        let client = self.client(&jack.client)?;
        if client.has_port(&jack.port) {
            Ok(())
        } else {
            Err(GraphError::PortNotFound {
                client: jack.client.clone(),
                port: jack.port.clone(),
            })
        }
    }

    /// Copy one connection's sender value into its receiver.
    fn propagate(&mut self, conn: &Connection) -> bool {
        let Some(value) = self
            .clients
            .get(&conn.sender.client)
            .and_then(|c| c.value(&conn.sender.port))
            .cloned()
        else {
            return false;
        };
        self.clients
            .get_mut(&conn.receiver.client)
            .is_some_and(|c| c.set_value(&conn.receiver.port, value).is_ok())
    }

    fn sample_listened(&self) -> Vec<(Jack, Value)> {
        self.listened
            .iter()
            .filter_map(|jack| {
                let value = self.clients.get(&jack.client)?.value(&jack.port)?;
                Some((jack.clone(), value.clone()))
            })
            .collect()
    }
}

// ── SignalGraph ──────────────────────────────────────────────────

/// Clients, their ports, and the directed connections between them.
///
/// Shared between the owner and the scheduler thread by `Arc`; every
/// method takes `&self` and locks internally.
pub struct SignalGraph {
    state: Mutex<GraphState>,
    recorder: Mutex<Recorder>,
}

impl SignalGraph {
    /// An empty graph whose time origin is now.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GraphState {
                clients: IndexMap::new(),
                connections: IndexSet::new(),
                listened: IndexSet::new(),
                cycle_count: 0,
                origin: Instant::now(),
                last_metrics: StepMetrics::default(),
            }),
            recorder: Mutex::new(Recorder::new()),
        }
    }

    // Every callback runs under `catch_unwind`, so a poisoned lock can
    // only come from a panic inside this module; the state is still
    // structurally valid and is used as-is.
    fn state(&self) -> MutexGuard<'_, GraphState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── setup ────────────────────────────────────────────────────

    /// Register a client without a callback.
    ///
    /// `ports` is either a list of names (each starting at
    /// [`Value::default()`]) or a list of `(name, initial value)` pairs.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateClient`] if `id` is taken,
    /// [`GraphError::DuplicatePort`] if `ports` repeats a name.
    pub fn add_client(
        &self,
        id: impl Into<String>,
        ports: impl Into<PortSpec>,
    ) -> Result<(), GraphError> {
        self.insert_client(Client::new(id, ports)?)
    }

    /// Register a client with a per-cycle callback.
    ///
    /// The callback receives a handle to this client only and must be
    /// fast and non-blocking: it runs with the graph lock held.
    pub fn add_client_with<F>(
        &self,
        id: impl Into<String>,
        ports: impl Into<PortSpec>,
        callback: F,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.insert_client(Client::new(id, ports)?.with_callback(callback))
    }

    /// Register a pre-built client.
    pub fn insert_client(&self, client: Client) -> Result<(), GraphError> {
        let mut state = self.state();
        if state.clients.contains_key(client.id()) {
            return Err(GraphError::DuplicateClient {
                client: client.id().to_owned(),
            });
        }
        debug!(
            client = client.id(),
            ports = client.ports().count(),
            callback = client.has_callback(),
            "client added"
        );
        state.clients.insert(client.id().to_owned(), client);
        Ok(())
    }

    /// Wire `sender` to `receiver`.
    ///
    /// Both endpoints are validated now, not at step time. Connecting the
    /// same pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownEndpoint`] if either client or port is missing.
    pub fn connect(
        &self,
        sender: impl Into<Jack>,
        receiver: impl Into<Jack>,
    ) -> Result<(), GraphError> {
        let conn = Connection::new(sender, receiver);
        let mut state = self.state();
        for endpoint in [&conn.sender, &conn.receiver] {
            state
                .check_port(endpoint)
                .map_err(|e| GraphError::UnknownEndpoint {
                    endpoint: endpoint.clone(),
                    reason: e.to_string(),
                })?;
        }
        debug!(connection = %conn, "connected");
        state.connections.insert(conn);
        Ok(())
    }

    /// Start recording samples of a port. Listening twice is a no-op.
    ///
    /// # Errors
    ///
    /// [`GraphError::ClientNotFound`] / [`GraphError::PortNotFound`].
    pub fn listen(&self, client: &str, port: &str) -> Result<(), GraphError> {
        let jack = Jack::new(client, port);
        let mut state = self.state();
        state.check_port(&jack)?;
        if state.listened.insert(jack.clone()) {
            self.recorder().listen(&jack);
            debug!(port = %jack, "listening");
        }
        Ok(())
    }

    // ── values ───────────────────────────────────────────────────

    /// Write one port.
    ///
    /// # Errors
    ///
    /// [`GraphError::ClientNotFound`] / [`GraphError::PortNotFound`]; on
    /// error nothing is written.
    pub fn set_value(
        &self,
        client: &str,
        port: &str,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        self.state().client_mut(client)?.set_value(port, value)
    }

    /// Read one port.
    ///
    /// # Errors
    ///
    /// [`GraphError::ClientNotFound`] / [`GraphError::PortNotFound`].
    pub fn get_value(&self, client: &str, port: &str) -> Result<Value, GraphError> {
        self.state().client(client)?.get_value(port)
    }

    // ── stepping ─────────────────────────────────────────────────

    /// Advance the simulation by one cycle.
    ///
    /// Normally driven by the [`Scheduler`](crate::scheduler::Scheduler);
    /// callable directly for lockstep use.
    ///
    /// # Errors
    ///
    /// If a callback returns an error or panics, the step stops at that
    /// client: later callbacks, propagation, the cycle increment and
    /// sampling are skipped. Writes made by earlier callbacks remain.
    pub fn step(&self) -> Result<StepResult, StepError> {
        let start = Instant::now();
        let mut state = self.state();
        let time = state.origin.elapsed().as_secs_f64();

        let mut callbacks_run = 0;
        for client in state.clients.values_mut() {
            if !client.has_callback() {
                continue;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| client.run_callback())) {
                Ok(Ok(())) => callbacks_run += 1,
                Ok(Err(source)) => {
                    return Err(StepError::Callback {
                        client: client.id().to_owned(),
                        source,
                    })
                }
                Err(payload) => {
                    return Err(StepError::CallbackPanicked {
                        client: client.id().to_owned(),
                        message: panic_message(payload.as_ref()),
                    })
                }
            }
        }
        let callbacks_done = Instant::now();

        // Connections are only ever inserted, so the set is taken out for
        // the duration of the loop instead of cloned.
        let connections = std::mem::take(&mut state.connections);
        let connections_propagated = connections
            .iter()
            .filter(|conn| state.propagate(conn))
            .count();
        state.connections = connections;
        let propagation_done = Instant::now();

        state.cycle_count += 1;
        let cycle = state.cycle_count;
        let samples = state.sample_listened();

        // Take the recorder before releasing the graph so concurrent steps
        // append in cycle order.
        let mut recorder = self.recorder();
        drop(state);
        let samples_recorded = recorder.record(time, samples);
        drop(recorder);

        let metrics = StepMetrics {
            cycle,
            total_us: start.elapsed().as_micros() as u64,
            callbacks_us: callbacks_done.duration_since(start).as_micros() as u64,
            propagation_us: propagation_done.duration_since(callbacks_done).as_micros() as u64,
            callbacks_run,
            connections_propagated,
            samples_recorded,
        };
        trace!(cycle, time, connections_propagated, "step");
        self.state().last_metrics = metrics.clone();

        Ok(StepResult {
            cycle,
            time,
            metrics,
        })
    }

    /// Number of completed steps.
    pub fn cycle_count(&self) -> u64 {
        self.state().cycle_count
    }

    /// Reset the cycle counter to 0.
    pub fn reset_cycle_count(&self) {
        self.state().cycle_count = 0;
    }

    /// Make now the time origin for subsequent sample timestamps.
    pub fn reset_origin(&self) {
        self.state().origin = Instant::now();
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> StepMetrics {
        self.state().last_metrics.clone()
    }

    // ── recorded data ────────────────────────────────────────────

    /// Deep snapshot of every recorded series, keyed client then port.
    pub fn data(&self) -> SampleData {
        self.recorder().snapshot()
    }

    /// Deep copy of one recorded series, if the port is listened.
    pub fn series(&self, client: &str, port: &str) -> Option<Series> {
        self.recorder().series(client, port)
    }

    /// Drop all recorded samples; listened ports stay listened.
    pub fn clear_samples(&self) {
        self.recorder().clear_samples();
    }

    // ── introspection ────────────────────────────────────────────

    /// Client ids in registration order.
    pub fn client_ids(&self) -> Vec<String> {
        self.state().clients.keys().cloned().collect()
    }

    /// Port names of a client in declaration order.
    pub fn ports(&self, client: &str) -> Result<Vec<String>, GraphError> {
        Ok(self
            .state()
            .client(client)?
            .ports()
            .map(str::to_owned)
            .collect())
    }

    /// Whether `client` exists and has `port`.
    pub fn contains(&self, client: &str, port: &str) -> bool {
        self.state().check_port(&Jack::new(client, port)).is_ok()
    }

    /// Connections in the order they were made.
    pub fn connections(&self) -> Vec<Connection> {
        self.state().connections.iter().cloned().collect()
    }

    /// Listened ports in the order they were first listened to.
    pub fn listened(&self) -> Vec<Jack> {
        self.state().listened.iter().cloned().collect()
    }
}

impl Default for SignalGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignalGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SignalGraph")
            .field("clients", &state.clients.len())
            .field("connections", &state.connections.len())
            .field("listened", &state.listened.len())
            .field("cycle_count", &state.cycle_count)
            .finish()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rogue_test_utils::{square_counter, two_device_graph_spec};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// dev0{port0, port1}, dev1{port2, port3}, dev0.port0 -> dev1.port3.
    fn fixture() -> SignalGraph {
        let graph = SignalGraph::new();
        for (id, ports) in two_device_graph_spec() {
            graph.add_client(id, ports).unwrap();
        }
        graph.connect(("dev0", "port0"), ("dev1", "port3")).unwrap();
        graph
    }

    #[test]
    fn set_value_get_value() {
        let graph = fixture();
        graph.set_value("dev0", "port0", 123).unwrap();
        assert_eq!(graph.get_value("dev0", "port0").unwrap(), Value::Int(123));
        graph.set_value("dev0", "port1", 456).unwrap();
        for _ in 0..3 {
            graph.step().unwrap();
        }
        assert_eq!(graph.get_value("dev0", "port1").unwrap(), Value::Int(456));
        assert_eq!(graph.get_value("dev1", "port2").unwrap(), Value::Float(0.0));
        assert_eq!(graph.get_value("dev1", "port3").unwrap(), Value::Int(123));
    }

    #[test]
    fn not_found_errors() {
        let graph = fixture();
        assert_eq!(
            graph.set_value("dev3", "port0", 1),
            Err(GraphError::ClientNotFound {
                client: "dev3".into()
            })
        );
        assert!(matches!(
            graph.set_value("dev0", "port2", 1),
            Err(GraphError::PortNotFound { .. })
        ));
        assert!(matches!(
            graph.get_value("dev3", "port0"),
            Err(GraphError::ClientNotFound { .. })
        ));
        assert!(matches!(
            graph.get_value("dev0", "port2"),
            Err(GraphError::PortNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_client_rejected_and_original_kept() {
        let graph = fixture();
        graph.set_value("dev0", "port0", 7).unwrap();
        let err = graph.add_client("dev0", ["other"]).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateClient {
                client: "dev0".into()
            }
        );
        assert_eq!(graph.get_value("dev0", "port0").unwrap(), Value::Int(7));
        assert_eq!(graph.ports("dev0").unwrap(), ["port0", "port1"]);
    }

    #[test]
    fn connect_validates_eagerly() {
        let graph = fixture();
        let err = graph
            .connect(("dev0", "port0"), ("dev9", "port0"))
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownEndpoint { ref endpoint, .. } if endpoint == &Jack::new("dev9", "port0")
        ));
        let err = graph
            .connect(("dev0", "nope"), ("dev1", "port2"))
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownEndpoint { .. }));
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn duplicate_connections_collapse() {
        let graph = fixture();
        graph.connect(("dev0", "port0"), ("dev1", "port3")).unwrap();
        assert_eq!(graph.connections().len(), 1);
    }

    #[test]
    fn steps_without_wiring_only_advance_counter() {
        let graph = SignalGraph::new();
        graph.add_client("a", [("x", 1), ("y", 2)]).unwrap();
        for _ in 0..10 {
            graph.step().unwrap();
        }
        assert_eq!(graph.cycle_count(), 10);
        assert_eq!(graph.get_value("a", "x").unwrap(), Value::Int(1));
        assert_eq!(graph.get_value("a", "y").unwrap(), Value::Int(2));
    }

    #[test]
    fn chained_connections_propagate_in_one_step() {
        let graph = SignalGraph::new();
        graph.add_client("a", ["out"]).unwrap();
        graph.add_client("b", ["in", "out"]).unwrap();
        graph.add_client("c", ["in"]).unwrap();
        graph.add_client("loop", ["through"]).unwrap();
        graph.connect(("a", "out"), ("b", "in")).unwrap();
        graph.connect(("b", "in"), ("c", "in")).unwrap();
        graph.set_value("a", "out", 5).unwrap();
        graph.step().unwrap();
        assert_eq!(graph.get_value("c", "in").unwrap(), Value::Int(5));
    }

    #[test]
    fn connection_order_is_insertion_order() {
        // Reverse-ordered chain: c reads b before b reads a, so a's value
        // needs two steps to reach c.
        let graph = SignalGraph::new();
        graph.add_client("a", ["p"]).unwrap();
        graph.add_client("b", ["p"]).unwrap();
        graph.add_client("c", ["p"]).unwrap();
        graph.connect(("b", "p"), ("c", "p")).unwrap();
        graph.connect(("a", "p"), ("b", "p")).unwrap();
        graph.set_value("a", "p", 9).unwrap();
        graph.step().unwrap();
        assert_eq!(graph.get_value("b", "p").unwrap(), Value::Int(9));
        assert_eq!(graph.get_value("c", "p").unwrap(), Value::Float(0.0));
        graph.step().unwrap();
        assert_eq!(graph.get_value("c", "p").unwrap(), Value::Int(9));
    }

    #[test]
    fn callbacks_run_before_propagation_in_registration_order() {
        let graph = SignalGraph::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            graph
                .add_client_with(id, ["out"], move |c| {
                    let id = c.id().to_owned();
                    order.lock().unwrap().push(id.clone());
                    c.set_value("out", id)?;
                    Ok(())
                })
                .unwrap();
        }
        graph.add_client("sink", ["in"]).unwrap();
        graph.connect(("second", "out"), ("sink", "in")).unwrap();
        graph.step().unwrap();
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
        assert_eq!(graph.get_value("sink", "in").unwrap(), Value::from("second"));
    }

    #[test]
    fn listen_records_squares() {
        let graph = fixture();
        graph
            .add_client_with("dev2", [("port0", 0)], square_counter("port0"))
            .unwrap();
        graph.listen("dev2", "port0").unwrap();
        for _ in 0..3 {
            graph.step().unwrap();
        }
        let data = graph.data();
        assert_eq!(data.len(), 1);
        let series = &data["dev2"]["port0"];
        assert_eq!(
            series.values,
            vec![Value::Int(0), Value::Int(1), Value::Int(4)]
        );
        assert_eq!(series.time.len(), 3);
        assert!(series.time.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn listen_is_idempotent_and_validated() {
        let graph = fixture();
        graph.listen("dev1", "port3").unwrap();
        graph.step().unwrap();
        graph.listen("dev1", "port3").unwrap();
        assert_eq!(graph.series("dev1", "port3").unwrap().len(), 1);
        assert_eq!(graph.listened(), vec![Jack::new("dev1", "port3")]);
        assert!(matches!(
            graph.listen("dev5", "port3"),
            Err(GraphError::ClientNotFound { .. })
        ));
        assert!(matches!(
            graph.listen("dev1", "port0"),
            Err(GraphError::PortNotFound { .. })
        ));
    }

    #[test]
    fn data_is_a_snapshot() {
        let graph = fixture();
        graph.listen("dev0", "port0").unwrap();
        graph.step().unwrap();
        let before = graph.data();
        graph.step().unwrap();
        assert_eq!(before["dev0"]["port0"].len(), 1);
        assert_eq!(graph.data()["dev0"]["port0"].len(), 2);
    }

    #[test]
    fn callback_error_aborts_step() {
        let graph = fixture();
        graph
            .add_client_with("bad", ["p"], |c| {
                c.set_value("p", 1)?;
                c.set_value("missing", 2)?;
                Ok(())
            })
            .unwrap();
        graph.listen("dev1", "port3").unwrap();
        graph.set_value("dev0", "port0", 42).unwrap();

        let err = graph.step().unwrap_err();
        assert_eq!(err.client(), "bad");
        assert!(!err.is_fatal());
        // Aborted: no propagation, no cycle, no sample.
        assert_eq!(graph.cycle_count(), 0);
        assert_eq!(graph.get_value("dev1", "port3").unwrap(), Value::Float(0.0));
        assert!(graph.series("dev1", "port3").unwrap().is_empty());
        // Write made before the failure is kept.
        assert_eq!(graph.get_value("bad", "p").unwrap(), Value::Int(1));
    }

    #[test]
    fn callback_panic_is_captured() {
        let graph = fixture();
        graph
            .add_client_with("boom", ["p"], |_| panic!("exploded"))
            .unwrap();
        let err = graph.step().unwrap_err();
        assert_eq!(
            err,
            StepError::CallbackPanicked {
                client: "boom".into(),
                message: "exploded".into()
            }
        );
        assert!(err.is_fatal());
        // The lock is still usable.
        graph.set_value("dev0", "port0", 1).unwrap();
        assert_eq!(graph.get_value("dev0", "port0").unwrap(), Value::Int(1));
    }

    #[test]
    fn panicked_callback_runs_again_next_step() {
        let graph = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        graph
            .add_client_with("flaky", ["p"], move |_| {
                if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first call panics");
                }
                Ok(())
            })
            .unwrap();
        assert!(graph.step().is_err());
        for _ in 0..3 {
            graph.step().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(graph.cycle_count(), 3);
    }

    #[test]
    fn callback_isolated_to_own_client() {
        let graph = fixture();
        graph
            .add_client_with("dev2", ["port0"], |c| {
                // `port2` exists on dev1, not on this client.
                c.set_value("port2", 1)?;
                Ok(())
            })
            .unwrap();
        assert!(graph.step().is_err());
        assert_eq!(graph.get_value("dev1", "port2").unwrap(), Value::Float(0.0));
    }

    #[test]
    fn metrics_reflect_step() {
        let graph = fixture();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        graph
            .add_client_with("dev2", ["port0"], move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .unwrap();
        graph.listen("dev2", "port0").unwrap();
        let result = graph.step().unwrap();
        assert_eq!(result.cycle, 1);
        assert_eq!(result.metrics.callbacks_run, 1);
        assert_eq!(result.metrics.connections_propagated, 1);
        assert_eq!(result.metrics.samples_recorded, 1);
        assert_eq!(graph.last_metrics(), result.metrics);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reset_cycle_count_and_clear_samples() {
        let graph = fixture();
        graph.listen("dev0", "port0").unwrap();
        graph.step().unwrap();
        graph.step().unwrap();
        graph.reset_cycle_count();
        graph.clear_samples();
        assert_eq!(graph.cycle_count(), 0);
        assert!(graph.series("dev0", "port0").unwrap().is_empty());
        assert_eq!(graph.step().unwrap().cycle, 1);
    }

    #[test]
    fn introspection() {
        let graph = fixture();
        assert_eq!(graph.client_ids(), ["dev0", "dev1"]);
        assert!(graph.contains("dev1", "port2"));
        assert!(!graph.contains("dev1", "port0"));
        assert!(graph.ports("nope").is_err());
        assert_eq!(
            graph.connections(),
            vec![Connection::new(("dev0", "port0"), ("dev1", "port3"))]
        );
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            (-1e9f64..1e9).prop_map(Value::Float),
            "[a-z]{0,8}".prop_map(Value::Text),
        ]
    }

    proptest! {
        #[test]
        fn set_then_get_round_trips(
            client in prop::sample::select(vec!["dev0", "dev1"]),
            idx in 0usize..2,
            value in arb_value(),
        ) {
            let graph = fixture();
            let port = graph.ports(client).unwrap()[idx].clone();
            graph.set_value(client, &port, value.clone()).unwrap();
            prop_assert_eq!(graph.get_value(client, &port).unwrap(), value);
        }

        #[test]
        fn failed_writes_never_mutate(
            client in "[a-z]{1,6}",
            port in "[a-z]{1,6}",
            value in arb_value(),
        ) {
            let graph = fixture();
            graph.set_value("dev0", "port0", 11).unwrap();
            let before: Vec<_> = ["port0", "port1"]
                .iter()
                .map(|p| graph.get_value("dev0", p).unwrap())
                .collect();
            // Lowercase-only names can never hit a real "devN"/"portN" pair.
            prop_assert!(graph.set_value(&client, &port, value).is_err());
            prop_assert!(graph.get_value(&client, &port).is_err());
            let after: Vec<_> = ["port0", "port1"]
                .iter()
                .map(|p| graph.get_value("dev0", p).unwrap())
                .collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn n_steps_advance_cycle_by_n(n in 0u64..50) {
            let graph = SignalGraph::new();
            graph.add_client("a", [("x", 3)]).unwrap();
            for _ in 0..n {
                graph.step().unwrap();
            }
            prop_assert_eq!(graph.cycle_count(), n);
            prop_assert_eq!(graph.get_value("a", "x").unwrap(), Value::Int(3));
        }
    }
}
