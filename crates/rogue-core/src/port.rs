//! Named value cells ([`Port`]) and the [`PortSpec`] used to declare them.

use crate::value::Value;

/// A named, mutable scalar cell owned by exactly one client.
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    id: String,
    /// Current value of the port.
    pub value: Value,
}

impl Port {
    /// A port holding [`Value::default()`].
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_value(id, Value::default())
    }

    /// A port holding an explicit initial value.
    pub fn with_value(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// The port's name.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Declaration of a client's ports.
///
/// Either a list of names, each starting at [`Value::default()`], or a
/// list of `(name, initial value)` pairs. Declaration order is kept.
#[derive(Clone, Debug, PartialEq)]
pub enum PortSpec {
    /// Port names with default initial values.
    Names(Vec<String>),
    /// Port names with explicit initial values.
    Values(Vec<(String, Value)>),
}

impl PortSpec {
    /// Expand the spec into concrete ports, in declaration order.
    pub fn into_ports(self) -> Vec<Port> {
        match self {
            Self::Names(names) => names.into_iter().map(Port::new).collect(),
            Self::Values(pairs) => pairs
                .into_iter()
                .map(|(id, value)| Port::with_value(id, value))
                .collect(),
        }
    }

    /// Number of declared ports (including any repeated names).
    pub fn len(&self) -> usize {
        match self {
            Self::Names(v) => v.len(),
            Self::Values(v) => v.len(),
        }
    }

    /// Whether no ports are declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for PortSpec {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Vec<&str>> for PortSpec {
    fn from(names: Vec<&str>) -> Self {
        Self::Names(names.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for PortSpec {
    fn from(names: &[&str]) -> Self {
        Self::Names(names.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PortSpec {
    fn from(names: [&str; N]) -> Self {
        Self::Names(names.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl<V: Into<Value>> From<Vec<(&str, V)>> for PortSpec {
    fn from(pairs: Vec<(&str, V)>) -> Self {
        Self::Values(
            pairs
                .into_iter()
                .map(|(id, v)| (id.to_owned(), v.into()))
                .collect(),
        )
    }
}

impl<V: Into<Value>> From<Vec<(String, V)>> for PortSpec {
    fn from(pairs: Vec<(String, V)>) -> Self {
        Self::Values(pairs.into_iter().map(|(id, v)| (id, v.into())).collect())
    }
}

impl<V: Into<Value>, const N: usize> From<[(&str, V); N]> for PortSpec {
    fn from(pairs: [(&str, V); N]) -> Self {
        Self::Values(
            pairs
                .into_iter()
                .map(|(id, v)| (id.to_owned(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_get_default_values() {
        let ports = PortSpec::from(["port0", "port1"]).into_ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].id(), "port0");
        assert_eq!(ports[1].value, Value::Float(0.0));
    }

    #[test]
    fn values_keep_initial_values_and_order() {
        let ports = PortSpec::from([("b", 1), ("a", 2)]).into_ports();
        assert_eq!(ports[0].id(), "b");
        assert_eq!(ports[0].value, Value::Int(1));
        assert_eq!(ports[1].id(), "a");
        assert_eq!(ports[1].value, Value::Int(2));
    }

    #[test]
    fn spec_len() {
        assert!(PortSpec::from(Vec::<&str>::new()).is_empty());
        assert_eq!(PortSpec::from(vec!["x", "y", "z"]).len(), 3);
        assert_eq!(PortSpec::from(vec![("x", true)]).len(), 1);
    }
}
