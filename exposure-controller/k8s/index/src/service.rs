use ahash::AHashMap as HashMap;
use exposure_controller_core::{
    relation::{ExposurePort, ExposureType, ServiceData},
    PortRef, Workload,
};
use exposure_controller_k8s_api::{self as k8s, AnnotationKeys, ResourceExt, Selector};
use std::sync::Arc;
use tracing::trace;

/// An index of the declared ports of the exposure objects that select a workload.
///
/// Records are kept in the order they were read (object order, then declared port order) so that
/// iteration is deterministic. Each record is reachable by `(object name, port number)` and, when
/// the port is named, by `(object name, port name)`.
#[derive(Debug, Default)]
pub struct ExposurePortIndex {
    records: Vec<Arc<ServiceData>>,
    by_service: HashMap<String, HashMap<PortRef, usize>>,
}

// === impl ExposurePortIndex ===

impl ExposurePortIndex {
    pub fn build<'s>(
        services: impl IntoIterator<Item = &'s k8s::Service>,
        workload: &Workload,
        annotations: &AnnotationKeys,
    ) -> Self {
        let mut index = Self::default();
        for svc in services {
            let name = svc.name_any();
            if svc.namespace().as_deref() != Some(workload.namespace.as_str()) {
                trace!(service = %name, "Ignoring service in another namespace");
                continue;
            }

            let Some(spec) = svc.spec.as_ref() else {
                continue;
            };

            if !Selector::from(spec.selector.clone()).matches(&workload.labels) {
                trace!(service = %name, "Service does not select workload");
                continue;
            }

            let Some(exposure_type) = ExposureType::from_service_type(spec.type_.as_deref()) else {
                trace!(service = %name, service_type = ?spec.type_, "Ignoring unsupported service type");
                continue;
            };

            let is_system_created = annotations.is_system_created(&svc.metadata);
            for port in spec.ports.iter().flatten() {
                index.insert(ServiceData {
                    name: name.clone(),
                    is_system_created,
                    port: Self::exposure_port(port),
                    created_at: svc.metadata.creation_timestamp.clone(),
                    exposure_type,
                });
            }
        }
        index
    }

    /// Looks up the record for a port of the named exposure object. Returns the record's position
    /// alongside it.
    pub fn get(&self, service: &str, port: &PortRef) -> Option<(usize, &Arc<ServiceData>)> {
        let idx = *self.by_service.get(service)?.get(port)?;
        Some((idx, self.records.get(idx)?))
    }

    /// Iterates over all records in the order they were read.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<ServiceData>)> + '_ {
        self.records.iter().enumerate()
    }

    fn insert(&mut self, data: ServiceData) {
        let idx = self.records.len();
        let ports = self.by_service.entry(data.name.clone()).or_default();
        if let Some(name) = data.port.name.as_deref().filter(|n| !n.is_empty()) {
            ports.insert(PortRef::Name(name.to_string()), idx);
        }
        ports.insert(PortRef::Number(data.port.number), idx);
        self.records.push(Arc::new(data));
    }

    fn exposure_port(port: &k8s::ServicePort) -> ExposurePort {
        ExposurePort {
            name: port.name.clone().filter(|n| !n.is_empty()),
            number: port.port,
            protocol: port.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
            // An unset target port forwards to the same port number.
            target: port
                .target_port
                .as_ref()
                .map(PortRef::from)
                .unwrap_or(PortRef::Number(port.port)),
            node_port: port.node_port,
        }
    }
}
