use crate::PlanError;
use exposure_controller_core::{
    check_node_port,
    network::{ExternalNetworkInfo, ExternalNodePortInfo, InternalNetworkInfo, NetworkInfo},
    relation::ExposureType,
    update::Manifest,
    ExposureConfig, TransportPort, Workload,
};
use exposure_controller_k8s_api::{
    annotations::SIDECAR_INJECT, HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend,
    IngressRule, IngressServiceBackend, IngressSpec, IntOrString, ObjectMeta, Service,
    ServiceBackendPort, ServicePort, ServiceSpec,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use uuid::Uuid;

const PATH_TYPE: &str = "ImplementationSpecific";

/// Builds new routing objects that expose a workload.
///
/// Synthesized objects live in the workload's namespace, select the workload's pod template
/// labels, and carry the workload's sidecar-injection setting as a label.
#[derive(Clone, Copy, Debug)]
pub struct Synthesizer<'a> {
    workload: &'a Workload,
    config: &'a ExposureConfig,
}

/// Builds the routing objects for a whole desired network model: two objects per external entry,
/// then one per internal entry, then one per node-port entry.
pub fn synthesize_network(
    network: &NetworkInfo,
    workload: &Workload,
    config: &ExposureConfig,
) -> Result<Vec<Manifest>, PlanError> {
    Synthesizer::new(workload, config).network(network)
}

// === impl Synthesizer ===

impl<'a> Synthesizer<'a> {
    pub fn new(workload: &'a Workload, config: &'a ExposureConfig) -> Self {
        Self { workload, config }
    }

    /// Builds a system-owned `ClusterIP` service forwarding the target port and an ingress routing
    /// the requested host and path to it. Unnamed objects share one generated identifier.
    pub fn external(&self, info: &ExternalNetworkInfo) -> (Service, Ingress) {
        let id = Uuid::new_v4();
        let service_name = name_or_generate(&info.service_name, "service", id);
        let ingress_name = name_or_generate(&info.ingress_name, "ingress", id);
        let annotations = self.config.annotations();

        let port = service_port("TCP", &service_name, info.target_port, info.target_port, 0);
        let mut service = self.service(service_name.clone(), ExposureType::ClusterIP, port);
        annotations.mark_system_created(
            service
                .metadata
                .annotations
                .get_or_insert_with(BTreeMap::new),
        );

        let mut metadata = self.metadata(ingress_name);
        let ingress_annotations = metadata.annotations.get_or_insert_with(BTreeMap::new);
        annotations.mark_system_created(ingress_annotations);
        annotations.set_domain(ingress_annotations, &info.domain_name, &info.domain_prefix);

        let path = HTTPIngressPath {
            path: non_empty(&info.path),
            path_type: PATH_TYPE.to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service_name,
                    port: Some(ServiceBackendPort {
                        name: None,
                        number: Some(info.target_port),
                    }),
                }),
                resource: None,
            },
        };
        let ingress = Ingress {
            metadata,
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    host: non_empty(&info.host),
                    http: Some(HTTPIngressRuleValue { paths: vec![path] }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        debug!(
            service = ?service.metadata.name,
            ingress = ?ingress.metadata.name,
            "Synthesized external exposure"
        );
        (service, ingress)
    }

    /// Builds a user-owned `ClusterIP` service.
    pub fn internal(&self, info: &InternalNetworkInfo) -> Service {
        let svc = &info.service;
        let name = name_or_generate(&svc.service_name, "service", Uuid::new_v4());
        let port = service_port(&svc.protocol, &name, svc.source_port, svc.target_port, 0);
        debug!(service = %name, "Synthesized internal exposure");
        self.service(name, ExposureType::ClusterIP, port)
    }

    /// Builds a `NodePort` service whose port number matches the container port.
    pub fn node_port(&self, info: &ExternalNodePortInfo) -> Result<Service, PlanError> {
        check_node_port(info.node_port)?;

        let svc = &info.service;
        let name = name_or_generate(&svc.service_name, "service", Uuid::new_v4());
        let port = service_port(
            &svc.protocol,
            &name,
            svc.target_port,
            svc.target_port,
            info.node_port,
        );
        debug!(service = %name, node_port = info.node_port, "Synthesized node-port exposure");
        Ok(self.service(name, ExposureType::NodePort, port))
    }

    #[instrument(
        skip_all,
        fields(
            ns = %self.workload.namespace,
            workload = %self.workload.name,
        )
    )]
    pub fn network(&self, network: &NetworkInfo) -> Result<Vec<Manifest>, PlanError> {
        let mut manifests = Vec::with_capacity(
            2 * network.external_network_infos.len()
                + network.internal_network_infos.len()
                + network.external_node_port_infos.len(),
        );

        for info in &network.external_network_infos {
            let (service, ingress) = self.external(info);
            manifests.push(service.into());
            manifests.push(ingress.into());
        }
        for info in &network.internal_network_infos {
            manifests.push(self.internal(info).into());
        }
        for info in &network.external_node_port_infos {
            manifests.push(self.node_port(info)?.into());
        }

        Ok(manifests)
    }

    fn metadata(&self, name: String) -> ObjectMeta {
        let labels = self
            .workload
            .inject_sidecar
            .as_ref()
            .map(|inject| BTreeMap::from([(SIDECAR_INJECT.to_string(), inject.clone())]));
        ObjectMeta {
            name: Some(name),
            namespace: Some(self.workload.namespace.clone()),
            labels,
            ..Default::default()
        }
    }

    fn service(&self, name: String, exposure_type: ExposureType, port: ServicePort) -> Service {
        Service {
            metadata: self.metadata(name),
            spec: Some(ServiceSpec {
                type_: Some(exposure_type.as_str().to_string()),
                selector: Some(self.workload.labels.as_ref().clone()),
                ports: Some(vec![port]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Builds a service port forwarding to a numbered container port. A zero node port is left for
/// the cluster to assign.
pub(crate) fn service_port(
    protocol: &str,
    service: &str,
    port: i32,
    target_port: i32,
    node_port: i32,
) -> ServicePort {
    let TransportPort { protocol, name } = TransportPort::for_requested(protocol, service);
    ServicePort {
        name,
        port,
        protocol: Some(protocol.to_string()),
        target_port: Some(IntOrString::Int(target_port)),
        node_port: (node_port != 0).then_some(node_port),
        ..Default::default()
    }
}

fn name_or_generate(name: &str, prefix: &str, id: Uuid) -> String {
    if name.is_empty() {
        return format!("{prefix}-{id}");
    }
    name.to_string()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
