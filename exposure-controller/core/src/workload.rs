use exposure_controller_k8s_api::{
    annotations::sidecar_inject, Container, DaemonSet, Deployment, Labels, ObjectMeta,
    PodTemplateSpec, StatefulSet,
};

/// The parts of a workload the engine correlates routing objects against.
#[derive(Clone, Debug, PartialEq)]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<Container>,

    /// The pod template's labels. Exposure objects select the workload through these and
    /// synthesized exposure objects use them as their selector.
    pub labels: Labels,

    /// The sidecar-injection setting copied onto synthesized objects.
    pub inject_sidecar: Option<String>,
}

// === impl Workload ===

impl Workload {
    pub fn from_template(meta: &ObjectMeta, template: &PodTemplateSpec) -> Self {
        let template_meta = template.metadata.as_ref();
        let inject_sidecar = sidecar_inject(meta)
            .or_else(|| template_meta.and_then(sidecar_inject))
            .map(str::to_string);
        Self {
            name: meta.name.clone().unwrap_or_default(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            containers: template
                .spec
                .as_ref()
                .map(|s| s.containers.clone())
                .unwrap_or_default(),
            labels: template_meta.and_then(|m| m.labels.clone()).into(),
            inject_sidecar,
        }
    }

    pub fn from_deployment(deploy: &Deployment) -> Option<Self> {
        let spec = deploy.spec.as_ref()?;
        Some(Self::from_template(&deploy.metadata, &spec.template))
    }

    pub fn from_stateful_set(sts: &StatefulSet) -> Option<Self> {
        let spec = sts.spec.as_ref()?;
        Some(Self::from_template(&sts.metadata, &spec.template))
    }

    pub fn from_daemon_set(ds: &DaemonSet) -> Option<Self> {
        let spec = ds.spec.as_ref()?;
        Some(Self::from_template(&ds.metadata, &spec.template))
    }
}
