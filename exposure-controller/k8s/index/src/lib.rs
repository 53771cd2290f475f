//! Workload exposure index
//!
//! Infers how a workload's container ports are reachable from the routing objects in its
//! namespace:
//!
//! - Each container port is indexed by number and by name ([`PortIndex`]).
//! - Each `Service` that selects the workload's pod template is indexed by port number and port
//!   name ([`ExposurePortIndex`]). Only `ClusterIP` and `NodePort` services are considered.
//! - Each `Ingress` path names a service and a service port. When that service port resolves and
//!   its target port resolves to a container port, the path becomes an external relation.
//! - Service ports that no ingress path routes to become bare (internal or node-port) relations,
//!   unless the service was generated to back an ingress.
//!
//! ```text
//! [ Ingress ] -> [ Service port ] -> [ Container port ]
//! ```
//!
//! All functions operate on caller-supplied snapshots and return independent values.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod ports;
mod projection;
mod relation;
mod resources;
pub mod service;


pub use self::{
    ports::PortIndex, projection::project, relation::resolve, resources::matched_resources,
    service::ExposurePortIndex,
};
use exposure_controller_core::{
    network::{NetworkInfo, VisitAddress},
    update::Manifest,
    ExposureConfig, Workload,
};
use exposure_controller_k8s_api as k8s;

/// Resolves and projects a workload's exposure.
pub fn network_info(
    workload: &Workload,
    ingresses: &[k8s::Ingress],
    services: &[k8s::Service],
    config: &ExposureConfig,
) -> (NetworkInfo, VisitAddress) {
    let relations = resolve(workload, ingresses, services, config);
    project(&relations, &workload.namespace)
}

/// Returns the routing objects through which a workload is exposed.
pub fn workload_resources(
    workload: &Workload,
    ingresses: &[k8s::Ingress],
    services: &[k8s::Service],
    config: &ExposureConfig,
) -> Vec<Manifest> {
    let relations = resolve(workload, ingresses, services, config);
    matched_resources(&relations, &workload.namespace, ingresses, services)
}
