//! Per-step performance metrics for the signal graph.
//!
//! [`StepMetrics`] captures timing and volume data for a single step,
//! enabling telemetry and profiling of callback-heavy graphs.

/// Timing and volume metrics collected during a single step.
///
/// All durations are in microseconds. The graph populates these fields
/// after each successful `step()`; the most recent set is also kept on
/// the graph and readable via `last_metrics()`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Cycle count after this step.
    pub cycle: u64,
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent running client callbacks, in microseconds.
    pub callbacks_us: u64,
    /// Time spent propagating connections, in microseconds.
    pub propagation_us: u64,
    /// Number of callbacks invoked.
    pub callbacks_run: usize,
    /// Number of connections whose value was copied.
    pub connections_propagated: usize,
    /// Number of samples appended to recorded series.
    pub samples_recorded: usize,
}
