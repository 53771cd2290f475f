use exposure_controller_core::{
    network::{
        ExternalNetworkInfo, ExternalNodePortInfo, InternalNetworkInfo, NetworkInfo,
        ServiceNetworkInfo, VisitAddress,
    },
    protocol_from_port_name,
    relation::{ExposureType, NetworkRelation, ServiceData},
};

/// Projects relations into the editable network model and the list of addresses they are
/// reachable at.
///
/// A relation with a gateway rule is external; otherwise its exposure type decides between
/// node-port and internal.
pub fn project(relations: &[NetworkRelation], namespace: &str) -> (NetworkInfo, VisitAddress) {
    let mut info = NetworkInfo::default();
    let mut visit = VisitAddress::default();

    for relation in relations {
        let svc = &relation.service;
        let container_port = relation.controller.container_port;

        if let Some(ing) = relation.ingress.as_ref() {
            let scheme = if ing.is_secure { "https" } else { "http" };
            visit
                .external
                .push(format!("{scheme}://{}{}", ing.host, ing.path));
            info.external_network_infos.push(ExternalNetworkInfo {
                domain_prefix: ing.domain_prefix.clone(),
                domain_name: ing.domain_name.clone(),
                host: ing.host.clone(),
                path: ing.path.clone(),
                target_port: container_port,
                ingress_name: ing.name.clone(),
                service_name: svc.name.clone(),
                created_at: svc.created_at.clone(),
            });
            continue;
        }

        let service = ServiceNetworkInfo {
            protocol: protocol(svc).to_string(),
            source_port: svc.port.number,
            target_port: container_port,
            service_name: svc.name.clone(),
            created_at: svc.created_at.clone(),
        };
        let scheme = service.protocol.to_ascii_lowercase();
        match svc.exposure_type {
            ExposureType::NodePort => {
                let node_port = svc.port.node_port.unwrap_or_default();
                visit
                    .node_port
                    .push(format!("{scheme}://NODE-IP:{node_port}"));
                info.external_node_port_infos
                    .push(ExternalNodePortInfo { service, node_port });
            }
            ExposureType::ClusterIP => {
                visit.internal.push(format!(
                    "{scheme}://{}.{namespace}:{}",
                    service.service_name, service.source_port
                ));
                info.internal_network_infos
                    .push(InternalNetworkInfo { service });
            }
        }
    }

    (info, visit)
}

/// An application protocol declared by the port name takes precedence over the port's transport
/// protocol.
fn protocol(svc: &ServiceData) -> &str {
    match svc.port.name.as_deref().and_then(protocol_from_port_name) {
        Some(protocol) => protocol,
        None => &svc.port.protocol,
    }
}
