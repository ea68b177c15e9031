//! Simulated devices: a [`Client`] bundles uniquely named ports with an
//! optional per-cycle [`Callback`].

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexMap;

use crate::error::{CallbackError, GraphError};
use crate::port::{Port, PortSpec};
use crate::value::Value;

/// Per-cycle device behaviour.
///
/// Invoked once per step with a handle to its own client only. Callbacks
/// run while the graph lock is held, so they must be fast and must not
/// block; a slow callback stalls every other graph operation.
pub type Callback = Box<dyn FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send>;

/// An id-addressed bundle of uniquely named ports.
pub struct Client {
    id: String,
    ports: IndexMap<String, Port>,
    callback: Option<Callback>,
}

impl Client {
    /// Build a client from a port spec.
    ///
    /// Fails with [`GraphError::DuplicatePort`] if the spec names a port twice.
    pub fn new(id: impl Into<String>, ports: impl Into<PortSpec>) -> Result<Self, GraphError> {
        let id = id.into();
        let spec = ports.into();
        let mut map = IndexMap::with_capacity(spec.len());
        for port in spec.into_ports() {
            if map.contains_key(port.id()) {
                return Err(GraphError::DuplicatePort {
                    client: id,
                    port: port.id().to_owned(),
                });
            }
            map.insert(port.id().to_owned(), port);
        }
        Ok(Self {
            id,
            ports: map,
            callback: None,
        })
    }

    /// Attach a per-cycle callback, replacing any previous one.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut ClientHandle<'_>) -> Result<(), CallbackError> + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The client's id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Port names in declaration order.
    pub fn ports(&self) -> impl Iterator<Item = &str> + '_ {
        self.ports.keys().map(String::as_str)
    }

    /// Whether the client has a port with this name.
    pub fn has_port(&self, port: &str) -> bool {
        self.ports.contains_key(port)
    }

    /// Whether a callback is attached.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Read a port's current value.
    pub fn get_value(&self, port: &str) -> Result<Value, GraphError> {
        self.ports
            .get(port)
            .map(|p| p.value.clone())
            .ok_or_else(|| GraphError::port_not_found(&self.id, port))
    }

    /// Borrow a port's current value without cloning.
    pub fn value(&self, port: &str) -> Option<&Value> {
        self.ports.get(port).map(|p| &p.value)
    }

    /// Overwrite a port's value.
    pub fn set_value(&mut self, port: &str, value: impl Into<Value>) -> Result<(), GraphError> {
        match self.ports.get_mut(port) {
            Some(p) => {
                p.value = value.into();
                Ok(())
            }
            None => Err(GraphError::port_not_found(&self.id, port)),
        }
    }

    /// Run the callback once, if one is attached.
    ///
    /// The callback is detached for the duration of the call so it can be
    /// handed a mutable view of its own client. It is reattached before a
    /// panic resumes unwinding, so the client keeps its behaviour for
    /// later steps.
    pub fn run_callback(&mut self) -> Result<(), CallbackError> {
        let Some(mut callback) = self.callback.take() else {
            return Ok(());
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            callback(&mut ClientHandle { client: self })
        }));
        self.callback = Some(callback);
        match result {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.id)
            .field("ports", &self.ports)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// The view of a client handed to its own callback.
///
/// Only that client's ports are reachable through it.
pub struct ClientHandle<'a> {
    client: &'a mut Client,
}

impl ClientHandle<'_> {
    /// The client's id.
    pub fn id(&self) -> &str {
        self.client.id()
    }

    /// Port names in declaration order.
    pub fn ports(&self) -> impl Iterator<Item = &str> + '_ {
        self.client.ports()
    }

    /// Read one of this client's ports.
    pub fn get_value(&self, port: &str) -> Result<Value, GraphError> {
        self.client.get_value(port)
    }

    /// Write one of this client's ports.
    pub fn set_value(&mut self, port: &str, value: impl Into<Value>) -> Result<(), GraphError> {
        self.client.set_value(port, value)
    }
}
