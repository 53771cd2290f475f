//! Resolved exposure paths between gateway rules, exposure objects, and containers.

use crate::PortRef;
use exposure_controller_k8s_api::{Time, SERVICE_TYPE_CLUSTER_IP, SERVICE_TYPE_NODE_PORT};
use std::sync::Arc;

/// One resolved exposure path.
///
/// `ingress` is `None` for bare exposure: an exposure object that no gateway rule routes to.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkRelation {
    pub ingress: Option<IngressData>,
    pub service: Arc<ServiceData>,
    pub controller: ControllerData,
}

/// A single host/path rule of a gateway object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngressData {
    pub name: String,
    pub is_system_created: bool,
    pub host: String,
    pub path: String,
    pub domain_name: String,
    pub domain_prefix: String,
    pub is_secure: bool,
    pub created_at: Option<Time>,
}

/// A single declared port of an exposure object.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceData {
    pub name: String,
    pub is_system_created: bool,
    pub port: ExposurePort,
    pub created_at: Option<Time>,
    pub exposure_type: ExposureType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExposurePort {
    pub name: Option<String>,
    pub number: i32,

    /// The declared transport protocol.
    pub protocol: String,

    /// The container port this port forwards to.
    pub target: PortRef,

    pub node_port: Option<i32>,
}

/// The container port backing a relation. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerData {
    pub container_port: i32,
}

/// The exposure types the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExposureType {
    ClusterIP,
    NodePort,
}

// === impl NetworkRelation ===

impl NetworkRelation {
    pub fn is_external(&self) -> bool {
        self.ingress.is_some()
    }
}

// === impl ExposureType ===

impl ExposureType {
    /// Reads an exposure object's `spec.type`. An unset type is `ClusterIP`; types the engine
    /// does not model (e.g. `LoadBalancer`) yield `None`.
    pub fn from_service_type(type_: Option<&str>) -> Option<Self> {
        match type_ {
            None | Some(SERVICE_TYPE_CLUSTER_IP) => Some(Self::ClusterIP),
            Some(SERVICE_TYPE_NODE_PORT) => Some(Self::NodePort),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClusterIP => SERVICE_TYPE_CLUSTER_IP,
            Self::NodePort => SERVICE_TYPE_NODE_PORT,
        }
    }
}

impl std::fmt::Display for ExposureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
