//! Connection endpoints ([`Jack`]) and directed wiring ([`Connection`]).

use std::fmt;

/// A reference to one port of one client, used as a connection endpoint.
///
/// A jack never owns the port it names; the graph validates it when the
/// connection is made.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Jack {
    /// Id of the client owning the port.
    pub client: String,
    /// Name of the port on that client.
    pub port: String,
}

impl Jack {
    /// Build a jack from a client id and port name.
    pub fn new(client: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for Jack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.client, self.port)
    }
}

impl<C: Into<String>, P: Into<String>> From<(C, P)> for Jack {
    fn from((client, port): (C, P)) -> Self {
        Self::new(client, port)
    }
}

/// A directed edge copying the sender's value into the receiver once per step.
///
/// Connections compare structurally, so wiring the same pair twice
/// collapses to a single edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    /// Source endpoint.
    pub sender: Jack,
    /// Destination endpoint.
    pub receiver: Jack,
}

impl Connection {
    /// Build a connection from two endpoints.
    pub fn new(sender: impl Into<Jack>, receiver: impl Into<Jack>) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.sender, self.receiver)
    }
}
