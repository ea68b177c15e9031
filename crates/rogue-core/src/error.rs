//! Error types for the rogue simulator, organised by subsystem:
//! graph addressing, per-client callbacks, and step execution.

use thiserror::Error;

use crate::wiring::Jack;

/// Errors from synchronous graph operations (`add_client`, `connect`,
/// `set_value`, `get_value`, `listen`).
///
/// These are always returned directly to the caller, never buffered.
/// A call that fails leaves the graph exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No client is registered under this id.
    #[error("client '{client}' not found")]
    ClientNotFound {
        /// The id that was looked up.
        client: String,
    },
    /// The client exists but has no port with this name.
    #[error("client '{client}' has no port '{port}'")]
    PortNotFound {
        /// The owning client.
        client: String,
        /// The missing port.
        port: String,
    },
    /// `add_client` was called with an id that is already registered.
    #[error("client '{client}' already exists")]
    DuplicateClient {
        /// The conflicting id.
        client: String,
    },
    /// A port spec named the same port more than once.
    #[error("client '{client}' declares port '{port}' more than once")]
    DuplicatePort {
        /// The client being added.
        client: String,
        /// The repeated port name.
        port: String,
    },
    /// `connect` referenced a client or port that does not exist.
    #[error("unknown connection endpoint {endpoint}: {reason}")]
    UnknownEndpoint {
        /// The offending endpoint.
        endpoint: Jack,
        /// What was missing.
        reason: String,
    },
}

impl GraphError {
    pub(crate) fn port_not_found(client: &str, port: &str) -> Self {
        Self::PortNotFound {
            client: client.to_owned(),
            port: port.to_owned(),
        }
    }
}

/// Failure raised by a per-client callback.
///
/// `Graph` and `Failed` are recoverable: the scheduler records them and
/// keeps stepping. `Fatal` stops the scheduler loop after it is recorded.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// The callback addressed a port its client does not have.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Domain failure reported by the callback.
    #[error("callback failed: {reason}")]
    Failed {
        /// Human-readable description.
        reason: String,
    },
    /// Unrecoverable failure; the simulation should not continue.
    #[error("callback failed fatally: {reason}")]
    Fatal {
        /// Human-readable description.
        reason: String,
    },
}

impl CallbackError {
    /// Recoverable failure with the given reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Fatal failure with the given reason.
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Whether this failure must stop the scheduler.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

/// Errors from a single graph step.
///
/// A step that returns an error stopped at the failing client: later
/// callbacks, connection propagation, the cycle increment and sample
/// recording did not happen for that step.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    /// A client's callback returned an error.
    #[error("callback of client '{client}' failed: {source}")]
    Callback {
        /// The client whose callback failed.
        client: String,
        /// The error it returned.
        source: CallbackError,
    },
    /// A client's callback panicked.
    #[error("callback of client '{client}' panicked: {message}")]
    CallbackPanicked {
        /// The client whose callback panicked.
        client: String,
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl StepError {
    /// The client whose callback caused the failure.
    pub fn client(&self) -> &str {
        match self {
            Self::Callback { client, .. } | Self::CallbackPanicked { client, .. } => client,
        }
    }

    /// Whether this failure must stop the scheduler.
    ///
    /// Panics are always fatal; returned errors are fatal only when the
    /// callback said so with [`CallbackError::Fatal`].
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Callback { source, .. } => source.is_fatal(),
            Self::CallbackPanicked { .. } => true,
        }
    }
}
