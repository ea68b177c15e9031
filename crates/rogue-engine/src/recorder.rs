//! Timestamped sample recording for listened ports.
//!
//! The [`Recorder`] owns one append-only [`Series`] per listened port. The
//! graph samples listened values while it holds its own lock, then hands
//! the batch to the recorder after releasing it.

use indexmap::IndexMap;

use rogue_core::{Jack, SampleData, Series, Value};

/// Per-port sample histories, keyed by client id then port name.
#[derive(Debug, Default)]
pub struct Recorder {
    series: SampleData,
}

impl Recorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a series for `jack`. Returns `false` if one already exists,
    /// leaving its samples untouched.
    pub fn listen(&mut self, jack: &Jack) -> bool {
        let ports = self.series.entry(jack.client.clone()).or_default();
        if ports.contains_key(&jack.port) {
            return false;
        }
        ports.insert(jack.port.clone(), Series::new());
        true
    }

    /// Whether `jack` has a series.
    pub fn is_listening(&self, jack: &Jack) -> bool {
        self.series
            .get(&jack.client)
            .is_some_and(|ports| ports.contains_key(&jack.port))
    }

    /// Append one sample per entry of `batch`, all stamped with `time`.
    ///
    /// Entries for jacks without a series are skipped. Returns the number
    /// of samples appended.
    pub fn record<I>(&mut self, time: f64, batch: I) -> usize
    where
        I: IntoIterator<Item = (Jack, Value)>,
    {
        let mut appended = 0;
        for (jack, value) in batch {
            if let Some(series) = self
                .series
                .get_mut(&jack.client)
                .and_then(|ports| ports.get_mut(&jack.port))
            {
                series.push(time, value);
                appended += 1;
            }
        }
        appended
    }

    /// Deep copy of every series.
    pub fn snapshot(&self) -> SampleData {
        self.series.clone()
    }

    /// Deep copy of one series.
    pub fn series(&self, client: &str, port: &str) -> Option<Series> {
        self.series.get(client)?.get(port).cloned()
    }

    /// Listened jacks, in the order they were first listened to.
    pub fn listened(&self) -> Vec<Jack> {
        self.series
            .iter()
            .flat_map(|(client, ports)| ports.keys().map(move |port| Jack::new(client, port)))
            .collect()
    }

    /// Drop all recorded samples, keeping every series registered.
    pub fn clear_samples(&mut self) {
        for ports in self.series.values_mut() {
            for series in ports.values_mut() {
                *series = Series::new();
            }
        }
    }

    /// Total number of samples across every series.
    pub fn sample_count(&self) -> usize {
        self.series
            .values()
            .flat_map(IndexMap::values)
            .map(Series::len)
            .sum()
    }
}
