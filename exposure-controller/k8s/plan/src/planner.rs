use crate::{
    synth::{service_port, Synthesizer},
    PlanError,
};
use exposure_controller_core::{
    check_node_port,
    network::ExternalNetworkInfo,
    relation::ExposureType,
    update::{Action, Manifest, NetworkType, UpdateNetworkSpec, UpdateNetworkYaml},
    ExposureConfig, Workload,
};
use exposure_controller_k8s_api::{Ingress, ResourceExt, Service, ServicePort};
use tracing::{debug, info, instrument};

/// The live objects a change's back-references point at.
#[derive(Clone, Copy, Debug, Default)]
pub struct LiveObjects<'a> {
    pub ingress: Option<&'a Ingress>,
    pub service: Option<&'a Service>,
}

/// Turns requested exposure changes into ordered object actions.
///
/// Live objects are never modified; patched objects are returned as independent copies. An error
/// means no actions at all.
#[derive(Clone, Copy, Debug)]
pub struct Planner<'a> {
    workload: &'a Workload,
    config: &'a ExposureConfig,
}

/// Plans a single change against the live objects it refers to.
pub fn plan(
    change: &UpdateNetworkSpec,
    live: LiveObjects<'_>,
    workload: &Workload,
    config: &ExposureConfig,
) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
    Planner::new(workload, config).plan(change, live)
}

// === impl Planner ===

impl<'a> Planner<'a> {
    pub fn new(workload: &'a Workload, config: &'a ExposureConfig) -> Self {
        Self { workload, config }
    }

    #[instrument(
        skip_all,
        fields(
            ns = %self.workload.namespace,
            workload = %self.workload.name,
            action = %change.action,
            network_type = %change.network_type,
        )
    )]
    pub fn plan(
        &self,
        change: &UpdateNetworkSpec,
        live: LiveObjects<'_>,
    ) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        let actions = match change.action {
            Action::Create => self.create(change)?,
            Action::Delete => self.delete(change, live)?,
            Action::Update => self.update(change, live)?,
        };

        for yaml in &actions {
            info!(
                action = %yaml.action,
                kind = yaml.manifest.kind(),
                name = %yaml.manifest.name(),
                "Planned"
            );
        }
        Ok(actions)
    }

    fn synth(&self) -> Synthesizer<'a> {
        Synthesizer::new(self.workload, self.config)
    }

    fn create(&self, change: &UpdateNetworkSpec) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        let create = |manifest: Manifest| UpdateNetworkYaml::new(Action::Create, manifest);
        match change.network_type {
            NetworkType::External => {
                let info = required(change, change.new_external_network_info.as_ref(), "new")?;
                let (service, ingress) = self.synth().external(info);
                Ok(vec![create(service.into()), create(ingress.into())])
            }
            NetworkType::Internal => {
                let info = required(change, change.new_internal_network_info.as_ref(), "new")?;
                Ok(vec![create(self.synth().internal(info).into())])
            }
            NetworkType::NodePort => {
                let info = required(change, change.new_external_node_port_info.as_ref(), "new")?;
                Ok(vec![create(self.synth().node_port(info)?.into())])
            }
        }
    }

    fn delete(
        &self,
        change: &UpdateNetworkSpec,
        live: LiveObjects<'_>,
    ) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        match change.network_type {
            NetworkType::External => {
                let info = required(change, change.old_external_network_info.as_ref(), "old")?;
                self.delete_external(info, live)
            }
            NetworkType::Internal => {
                let info = required(change, change.old_internal_network_info.as_ref(), "old")?;
                let svc = exposure(live, ExposureType::ClusterIP)?;
                Ok(vec![remove_port(svc, info.service.source_port)?])
            }
            NetworkType::NodePort => {
                let info = required(change, change.old_external_node_port_info.as_ref(), "old")?;
                let svc = exposure(live, ExposureType::NodePort)?;
                Ok(vec![remove_port(svc, info.service.source_port)?])
            }
        }
    }

    /// System-owned ingresses are removed along with their service, which must be supplied. A
    /// user-owned ingress only loses the matching path.
    fn delete_external(
        &self,
        info: &ExternalNetworkInfo,
        live: LiveObjects<'_>,
    ) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        let ingress = live.ingress.ok_or(PlanError::MissingIngress)?;
        if !self.config.annotations().is_system_created(&ingress.metadata) {
            return Ok(vec![remove_path(ingress, &info.host, &info.path)?]);
        }

        let Some(svc) = live.service else {
            debug!(ingress = %ingress.name_any(), "Missing service of a system-created ingress");
            return Err(PlanError::MissingService);
        };
        Ok(vec![
            UpdateNetworkYaml::new(Action::Delete, ingress.clone()),
            UpdateNetworkYaml::new(Action::Delete, svc.clone()),
        ])
    }

    fn update(
        &self,
        change: &UpdateNetworkSpec,
        live: LiveObjects<'_>,
    ) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        match change.network_type {
            NetworkType::External => self.update_external(change, live),
            NetworkType::Internal => {
                let old = required(change, change.old_internal_network_info.as_ref(), "old")?;
                let new = required(change, change.new_internal_network_info.as_ref(), "new")?;
                let svc = exposure(live, ExposureType::ClusterIP)?;
                let yaml = rewrite_port(svc, old.service.source_port, |name| {
                    service_port(
                        &new.service.protocol,
                        name,
                        new.service.source_port,
                        new.service.target_port,
                        0,
                    )
                })?;
                Ok(vec![yaml])
            }
            NetworkType::NodePort => {
                let old = required(change, change.old_external_node_port_info.as_ref(), "old")?;
                let new = required(change, change.new_external_node_port_info.as_ref(), "new")?;
                check_node_port(new.node_port)?;
                let svc = exposure(live, ExposureType::NodePort)?;
                let yaml = rewrite_port(svc, old.service.source_port, |name| {
                    service_port(
                        &new.service.protocol,
                        name,
                        new.service.target_port,
                        new.service.target_port,
                        new.node_port,
                    )
                })?;
                Ok(vec![yaml])
            }
        }
    }

    /// Replaces an external entry: the replacement is created before the old entry is removed.
    /// The replacement never reuses the names of the objects being replaced.
    fn update_external(
        &self,
        change: &UpdateNetworkSpec,
        live: LiveObjects<'_>,
    ) -> Result<Vec<UpdateNetworkYaml>, PlanError> {
        let old = required(change, change.old_external_network_info.as_ref(), "old")?;
        let new = required(change, change.new_external_network_info.as_ref(), "new")?;

        let removed = self.delete_external(old, live)?;

        let mut new = new.clone();
        if !old.ingress_name.is_empty() && new.ingress_name == old.ingress_name {
            new.ingress_name.clear();
        }
        if !old.service_name.is_empty() && new.service_name == old.service_name {
            new.service_name.clear();
        }
        let (service, ingress) = self.synth().external(&new);

        let mut actions = Vec::with_capacity(2 + removed.len());
        actions.push(UpdateNetworkYaml::new(Action::Create, service));
        actions.push(UpdateNetworkYaml::new(Action::Create, ingress));
        actions.extend(removed);
        Ok(actions)
    }
}

fn required<'c, T>(
    change: &UpdateNetworkSpec,
    info: Option<&'c T>,
    side: &'static str,
) -> Result<&'c T, PlanError> {
    let field = match (side, change.network_type) {
        ("old", NetworkType::External) => "oldExternalNetworkInfo",
        ("old", NetworkType::Internal) => "oldInternalNetworkInfo",
        ("old", NetworkType::NodePort) => "oldExternalNodePortInfo",
        (_, NetworkType::External) => "newExternalNetworkInfo",
        (_, NetworkType::Internal) => "newInternalNetworkInfo",
        (_, NetworkType::NodePort) => "newExternalNodePortInfo",
    };
    info.ok_or(PlanError::MissingSpec {
        action: change.action,
        network_type: change.network_type,
        field,
    })
}

/// Returns the live service if it has the expected exposure type.
fn exposure<'l>(live: LiveObjects<'l>, expected: ExposureType) -> Result<&'l Service, PlanError> {
    let svc = live.service.ok_or(PlanError::MissingService)?;
    let type_ = svc.spec.as_ref().and_then(|s| s.type_.as_deref());
    if ExposureType::from_service_type(type_) != Some(expected) {
        return Err(PlanError::ExposureTypeMismatch {
            service: svc.name_any(),
            expected,
            found: type_.unwrap_or_default().to_string(),
        });
    }
    Ok(svc)
}

fn ports_mut(svc: &mut Service) -> Option<&mut Vec<ServicePort>> {
    svc.spec.as_mut()?.ports.as_mut()
}

/// Removes the port numbered `port`. Removing the last port deletes the service.
fn remove_port(svc: &Service, port: i32) -> Result<UpdateNetworkYaml, PlanError> {
    let no_match = || PlanError::NoMatchingPort {
        service: svc.name_any(),
        port,
    };

    let mut patched = svc.clone();
    let ports = ports_mut(&mut patched).ok_or_else(no_match)?;
    let idx = ports.iter().position(|p| p.port == port).ok_or_else(no_match)?;
    ports.remove(idx);

    if ports.is_empty() {
        return Ok(UpdateNetworkYaml::new(Action::Delete, svc.clone()));
    }
    Ok(UpdateNetworkYaml::new(Action::Update, patched))
}

/// Rewrites the port numbered `port`. Fields the change does not describe are kept.
fn rewrite_port(
    svc: &Service,
    port: i32,
    build: impl FnOnce(&str) -> ServicePort,
) -> Result<UpdateNetworkYaml, PlanError> {
    let name = svc.name_any();
    let mut patched = svc.clone();
    let entry = ports_mut(&mut patched)
        .and_then(|ports| ports.iter_mut().find(|p| p.port == port))
        .ok_or_else(|| PlanError::NoMatchingPort {
            service: name.clone(),
            port,
        })?;
    let rebuilt = build(&name);
    entry.name = rebuilt.name;
    entry.port = rebuilt.port;
    entry.protocol = rebuilt.protocol;
    entry.target_port = rebuilt.target_port;
    entry.node_port = rebuilt.node_port;
    Ok(UpdateNetworkYaml::new(Action::Update, patched))
}

/// Removes the path matching `host` and `path`. A rule left without paths is removed, and an
/// ingress left without rules is deleted.
fn remove_path(ingress: &Ingress, host: &str, path: &str) -> Result<UpdateNetworkYaml, PlanError> {
    let no_match = || PlanError::NoMatchingRule {
        ingress: ingress.name_any(),
        host: host.to_string(),
        path: path.to_string(),
    };

    let mut patched = ingress.clone();
    let rules = patched
        .spec
        .as_mut()
        .and_then(|s| s.rules.as_mut())
        .ok_or_else(no_match)?;

    let mut found = None;
    for (r, rule) in rules.iter().enumerate() {
        if rule.host.as_deref().unwrap_or_default() != host {
            continue;
        }
        let mut paths = rule.http.iter().flat_map(|http| http.paths.iter());
        if let Some(p) = paths.position(|p| p.path.as_deref().unwrap_or_default() == path) {
            found = Some((r, p));
            break;
        }
    }
    let (r, p) = found.ok_or_else(no_match)?;

    let rule_emptied = match rules[r].http.as_mut() {
        Some(http) => {
            http.paths.remove(p);
            http.paths.is_empty()
        }
        None => true,
    };
    if rule_emptied {
        rules.remove(r);
    }

    if rules.is_empty() {
        return Ok(UpdateNetworkYaml::new(Action::Delete, ingress.clone()));
    }
    Ok(UpdateNetworkYaml::new(Action::Update, patched))
}
