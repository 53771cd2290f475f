use crate::{ports::PortIndex, service::ExposurePortIndex};
use ahash::AHashSet as HashSet;
use exposure_controller_core::{
    relation::{ControllerData, IngressData, NetworkRelation},
    ExposureConfig, PortRef, Workload,
};
use exposure_controller_k8s_api::{self as k8s, ResourceExt};
use tracing::{debug, instrument, trace};

/// Correlates a workload's containers with the gateway and exposure objects that route to it.
///
/// Relations are produced in gateway traversal order (object, rule, path), followed by bare
/// exposure in exposure-index order. Unresolvable rules and ports are dropped.
#[instrument(
    skip_all,
    fields(
        ns = %workload.namespace,
        workload = %workload.name,
    )
)]
pub fn resolve(
    workload: &Workload,
    ingresses: &[k8s::Ingress],
    services: &[k8s::Service],
    config: &ExposureConfig,
) -> Vec<NetworkRelation> {
    let ports = PortIndex::from_containers(&workload.containers);
    let exposures = ExposurePortIndex::build(services, workload, config.annotations());

    let mut relations = Vec::new();
    let mut routed = HashSet::new();
    for ing in ingresses {
        if ing.namespace().as_deref() != Some(workload.namespace.as_str()) {
            trace!(ingress = %ing.name_any(), "Ignoring ingress in another namespace");
            continue;
        }
        resolve_ingress(ing, &ports, &exposures, config, &mut routed, &mut relations);
    }

    let mut bare = HashSet::new();
    for (idx, svc) in exposures.iter() {
        if routed.contains(&idx) || svc.is_system_created {
            continue;
        }

        let Some(container_port) = ports.container_port(&svc.port.target) else {
            trace!(service = %svc.name, port = %svc.port.number, "No container port");
            continue;
        };

        // Several ports of one exposure object may forward to the same container port.
        if !bare.insert((svc.name.as_str(), container_port)) {
            trace!(service = %svc.name, %container_port, "Already exposed");
            continue;
        }

        relations.push(NetworkRelation {
            ingress: None,
            service: svc.clone(),
            controller: ControllerData { container_port },
        });
    }

    debug!(relations = relations.len(), "Resolved");
    relations
}

fn resolve_ingress(
    ing: &k8s::Ingress,
    ports: &PortIndex,
    exposures: &ExposurePortIndex,
    config: &ExposureConfig,
    routed: &mut HashSet<usize>,
    relations: &mut Vec<NetworkRelation>,
) {
    let name = ing.name_any();
    let Some(spec) = ing.spec.as_ref() else {
        return;
    };
    let is_system_created = config.annotations().is_system_created(&ing.metadata);
    let (domain_name, domain_prefix) = config.annotations().domain(&ing.metadata);
    let is_secure = spec.tls.as_ref().is_some_and(|tls| !tls.is_empty());

    for rule in spec.rules.iter().flatten() {
        for path in rule.http.iter().flat_map(|http| http.paths.iter()) {
            let Some((svc_name, port)) = backend(path) else {
                trace!(ingress = %name, path = ?path.path, "Path has no service backend");
                continue;
            };

            let Some((idx, svc)) = exposures.get(svc_name, &port) else {
                trace!(ingress = %name, service = %svc_name, %port, "Dangling rule");
                continue;
            };

            let Some(container_port) = ports.container_port(&svc.port.target) else {
                trace!(ingress = %name, service = %svc_name, %port, "No container port");
                continue;
            };

            routed.insert(idx);
            relations.push(NetworkRelation {
                ingress: Some(IngressData {
                    name: name.clone(),
                    is_system_created,
                    host: rule.host.clone().unwrap_or_default(),
                    path: path.path.clone().unwrap_or_default(),
                    domain_name: domain_name.clone(),
                    domain_prefix: domain_prefix.clone(),
                    is_secure,
                    created_at: ing.metadata.creation_timestamp.clone(),
                }),
                service: svc.clone(),
                controller: ControllerData { container_port },
            });
        }
    }
}

fn backend(path: &k8s::HTTPIngressPath) -> Option<(&str, PortRef)> {
    let svc = path.backend.service.as_ref()?;
    let port = PortRef::from_backend(svc.port.as_ref()?)?;
    Some((svc.name.as_str(), port))
}
