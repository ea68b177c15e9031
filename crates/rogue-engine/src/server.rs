//! User-facing [`Server`]: a signal graph stepped by a background scheduler.
//!
//! # Architecture
//!
//! ```text
//! Owner thread                     Scheduler thread
//!     |                                   |
//!     |--add_client/connect/listen------->| (graph lock)
//!     |--exec()-------------------------->| reset time origin, spawn
//!     |--set_value/get_value------------->| graph.step() every period:
//!     |   [graph mutex]                   |   callbacks, propagation,
//!     |                                   |   cycle += 1, record samples
//!     |<--process_errors()----------------| [errors: unbounded FIFO]
//!     |--kill()-------------------------->| unpark, join
//!     |--data()                           |
//! ```
//!
//! Owner calls and steps are serialised by the graph's lock; nothing else
//! is shared between the two threads.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use rogue_core::{
    CallbackError, Client, ClientHandle, GraphError, Jack, PortSpec, SampleData, Series,
    StepError, Value,
};

use crate::config::{ConfigError, ServerConfig};
use crate::graph::SignalGraph;
use crate::metrics::StepMetrics;
use crate::scheduler::{Scheduler, TaskFailure};

/// A signal graph driven by a periodic background step.
///
/// Build the wiring with [`add_client`](Self::add_client),
/// [`connect`](Self::connect) and [`listen`](Self::listen), then
/// [`exec`](Self::exec) to start stepping. Values can be read and written
/// at any time. Failures raised inside steps are held until
/// [`process_errors`](Self::process_errors) is called.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use rogue_core::Value;
/// use rogue_engine::Server;
///
/// let mut server = Server::with_period(Duration::from_millis(1)).unwrap();
/// server.add_client("dev0", ["port0", "port1"]).unwrap();
/// server.add_client("dev1", ["port2", "port3"]).unwrap();
/// server.connect(("dev0", "port0"), ("dev1", "port3")).unwrap();
/// server.set_value("dev0", "port0", 123).unwrap();
///
/// server.exec().unwrap();
/// while server.cycle_count() < 3 {
///     std::thread::sleep(Duration::from_millis(1));
/// }
/// server.kill();
/// server.process_errors().unwrap();
/// assert_eq!(server.get_value("dev1", "port3").unwrap(), Value::Int(123));
/// ```
pub struct Server {
    graph: Arc<SignalGraph>,
    scheduler: Scheduler<StepError>,
    config: ServerConfig,
}

impl Server {
    /// Create a stopped server with an empty graph.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let graph = Arc::new(SignalGraph::new());
        let step_graph = Arc::clone(&graph);
        let scheduler = Scheduler::new(config.scheduler.clone(), move || {
            step_graph.step().map(drop)
        })?;
        Ok(Self {
            graph,
            scheduler,
            config,
        })
    }

    /// Create a stopped server stepping at `period`.
    pub fn with_period(period: Duration) -> Result<Self, ConfigError> {
        Self::new(ServerConfig::with_period(period))
    }

    // ── lifecycle ────────────────────────────────────────────────

    /// Start stepping.
    ///
    /// Resets the time origin, so sample timestamps of this run count
    /// seconds from this call. The first step happens immediately.
    pub fn exec(&mut self) -> Result<(), ConfigError> {
        if self.scheduler.is_running() {
            return Err(ConfigError::AlreadyRunning);
        }
        // Reap a loop that exited on its own after a fatal failure.
        self.scheduler.kill();
        self.graph.reset_origin();
        self.scheduler.start()?;
        info!(cycle = self.graph.cycle_count(), "server running");
        Ok(())
    }

    /// Stop stepping and wait for the background thread to exit.
    ///
    /// No step starts after this returns. With `reset_cycles_on_kill`
    /// the cycle counter goes back to 0. Recorded samples are kept.
    pub fn kill(&mut self) {
        self.scheduler.kill();
        if self.config.reset_cycles_on_kill {
            self.graph.reset_cycle_count();
        }
        info!("server stopped");
    }

    /// Surface the oldest failure captured during stepping, if any.
    pub fn process_errors(&self) -> Result<(), TaskFailure<StepError>> {
        self.scheduler.process_errors()
    }

    /// Number of captured failures not yet drained.
    pub fn pending_errors(&self) -> usize {
        self.scheduler.pending_errors()
    }

    /// Whether the step loop is running.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Total step attempts since construction, failed ones included.
    pub fn invocations(&self) -> u64 {
        self.scheduler.invocations()
    }

    // ── graph delegation ─────────────────────────────────────────

    /// See [`SignalGraph::add_client`].
    pub fn add_client(
        &self,
        id: impl Into<String>,
        ports: impl Into<PortSpec>,
    ) -> Result<(), GraphError> {
        self.graph.add_client(id, ports)
    }

    /// See [`SignalGraph::add_client_with`].
    pub fn add_client_with<F>(
        &self,
        id: impl Into<String>,
        ports: impl Into<PortSpec>,
        callback: F,
    ) -> Result<(), GraphError>
    where
        F: FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.graph.add_client_with(id, ports, callback)
    }

    /// See [`SignalGraph::insert_client`].
    pub fn insert_client(&self, client: Client) -> Result<(), GraphError> {
        self.graph.insert_client(client)
    }

    /// See [`SignalGraph::connect`].
    pub fn connect(
        &self,
        sender: impl Into<Jack>,
        receiver: impl Into<Jack>,
    ) -> Result<(), GraphError> {
        self.graph.connect(sender, receiver)
    }

    /// See [`SignalGraph::listen`].
    pub fn listen(&self, client: &str, port: &str) -> Result<(), GraphError> {
        self.graph.listen(client, port)
    }

    /// See [`SignalGraph::set_value`].
    pub fn set_value(
        &self,
        client: &str,
        port: &str,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        self.graph.set_value(client, port, value)
    }

    /// See [`SignalGraph::get_value`].
    pub fn get_value(&self, client: &str, port: &str) -> Result<Value, GraphError> {
        self.graph.get_value(client, port)
    }

    /// Deep snapshot of every recorded series.
    ///
    /// Times are seconds since the `exec()` that started the run in which
    /// each sample was taken.
    pub fn data(&self) -> SampleData {
        self.graph.data()
    }

    /// Deep copy of one recorded series.
    pub fn series(&self, client: &str, port: &str) -> Option<Series> {
        self.graph.series(client, port)
    }

    /// Completed steps in the current run.
    pub fn cycle_count(&self) -> u64 {
        self.graph.cycle_count()
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> StepMetrics {
        self.graph.last_metrics()
    }

    /// The shared graph.
    pub fn graph(&self) -> &Arc<SignalGraph> {
        &self.graph
    }

    /// The configuration this server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("graph", &self.graph)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
