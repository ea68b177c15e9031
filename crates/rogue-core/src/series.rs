//! Recorded sample history for listened ports.

use indexmap::IndexMap;

use crate::value::Value;

/// Append-only `(time, value)` history of one port.
///
/// `time` and `values` always have the same length. Times are elapsed
/// seconds since the recording graph's time origin.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Series {
    /// Sample timestamps in seconds.
    pub time: Vec<f64>,
    /// Sampled values, index-aligned with `time`.
    pub values: Vec<Value>,
}

impl Series {
    /// An empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample.
    pub fn push(&mut self, time: f64, value: Value) {
        self.time.push(time);
        self.values.push(value);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The most recent sample.
    pub fn last(&self) -> Option<(f64, &Value)> {
        Some((*self.time.last()?, self.values.last()?))
    }

    /// Iterate `(time, value)` pairs oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Value)> + '_ {
        self.time.iter().copied().zip(self.values.iter())
    }

    /// The first `n` samples (or fewer, if the series is shorter).
    pub fn head(&self, n: usize) -> Series {
        let n = n.min(self.len());
        Series {
            time: self.time[..n].to_vec(),
            values: self.values[..n].to_vec(),
        }
    }
}

/// Snapshot of every recorded series, keyed by client id then port name,
/// in the order the ports were first listened to.
pub type SampleData = IndexMap<String, IndexMap<String, Series>>;
