use exposure_controller_k8s_api::{IntOrString, ServiceBackendPort};
use std::ops::RangeInclusive;

/// Application protocols that may be declared as a port-name prefix, e.g. `grpc-api`.
pub const NAMED_PROTOCOLS: [&str; 5] = ["TCP", "HTTP", "HTTPS", "GRPC", "HTTP2"];

/// Node ports a user may request explicitly.
pub const NODE_PORT_RANGE: RangeInclusive<i32> = 30000..=32767;

const PROTOCOL_SEPARATOR: char = '-';
const TCP: &str = "TCP";
const UDP: &str = "UDP";

/// Refers to a port either by its declared name or by its number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortRef {
    Name(String),
    Number(i32),
}

/// The transport protocol and port name of a synthesized exposure port.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportPort {
    pub protocol: &'static str,
    pub name: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("node port {0} is out of range; the range is from 30000 to 32767")]
pub struct NodePortRangeError(pub i32);

// === impl PortRef ===

impl PortRef {
    /// Reads a gateway backend port, preferring the name when both are set.
    pub fn from_backend(port: &ServiceBackendPort) -> Option<Self> {
        match (port.name.as_deref(), port.number) {
            (Some(name), _) if !name.is_empty() => Some(Self::Name(name.to_string())),
            (_, Some(number)) => Some(Self::Number(number)),
            _ => None,
        }
    }
}

impl From<&IntOrString> for PortRef {
    fn from(port: &IntOrString) -> Self {
        match port {
            IntOrString::Int(n) => Self::Number(*n),
            IntOrString::String(s) => Self::Name(s.clone()),
        }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

// === impl TransportPort ===

impl TransportPort {
    /// UDP ports stay unnamed. Everything else is carried over TCP, with the requested protocol
    /// kept as a port-name prefix (`http-<service>`).
    pub fn for_requested(protocol: &str, service_name: &str) -> Self {
        if protocol.eq_ignore_ascii_case(UDP) {
            return Self {
                protocol: UDP,
                name: None,
            };
        }

        let protocol = if protocol.is_empty() { TCP } else { protocol };
        Self {
            protocol: TCP,
            name: Some(format!(
                "{}{}{}",
                protocol.to_ascii_lowercase(),
                PROTOCOL_SEPARATOR,
                service_name
            )),
        }
    }
}

/// Returns the application protocol declared by a port name's prefix, if any.
pub fn protocol_from_port_name(name: &str) -> Option<&'static str> {
    let upper = name.to_ascii_uppercase();
    NAMED_PROTOCOLS.iter().copied().find(|p| {
        upper
            .strip_prefix(p)
            .is_some_and(|rest| rest.starts_with(PROTOCOL_SEPARATOR))
    })
}

/// Zero leaves the node port to the cluster.
pub fn check_node_port(node_port: i32) -> Result<(), NodePortRangeError> {
    if node_port == 0 || NODE_PORT_RANGE.contains(&node_port) {
        return Ok(());
    }
    Err(NodePortRangeError(node_port))
}
