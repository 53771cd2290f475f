//! The write-path contract: a requested exposure change in, an ordered list of object actions out.

use crate::network::{ExternalNetworkInfo, ExternalNodePortInfo, InternalNetworkInfo};
use exposure_controller_k8s_api::{Ingress, ResourceExt, Service};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkType {
    External,
    Internal,
    NodePort,
}

/// A requested change to one exposure entry.
///
/// `old_*` entries identify what is being changed (and carry back-references to the live objects);
/// `new_*` entries describe the desired result. Only the pair matching `network_type` is read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNetworkSpec {
    pub action: Action,

    #[serde(rename = "type")]
    pub network_type: NetworkType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_external_network_info: Option<ExternalNetworkInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_external_network_info: Option<ExternalNetworkInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_internal_network_info: Option<InternalNetworkInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_internal_network_info: Option<InternalNetworkInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_external_node_port_info: Option<ExternalNodePortInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_external_node_port_info: Option<ExternalNodePortInfo>,
}

/// Names of the live objects an update or delete applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectRefs<'s> {
    pub ingress: Option<&'s str>,
    pub service: Option<&'s str>,
}

/// A routing object ready to be submitted to the cluster.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Manifest {
    Service(Service),
    Ingress(Ingress),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateNetworkYaml {
    pub action: Action,
    pub manifest: Manifest,
}

// === impl Action ===

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl NetworkType ===

impl NetworkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Internal => "internal",
            Self::NodePort => "nodePort",
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl UpdateNetworkSpec ===

impl UpdateNetworkSpec {
    /// Returns the back-references of the `old_*` entry matching this change's type.
    pub fn old_refs(&self) -> ObjectRefs<'_> {
        fn non_empty(s: &str) -> Option<&str> {
            (!s.is_empty()).then_some(s)
        }

        match self.network_type {
            NetworkType::External => self
                .old_external_network_info
                .as_ref()
                .map(|i| ObjectRefs {
                    ingress: non_empty(&i.ingress_name),
                    service: non_empty(&i.service_name),
                })
                .unwrap_or_default(),
            NetworkType::Internal => ObjectRefs {
                ingress: None,
                service: self
                    .old_internal_network_info
                    .as_ref()
                    .and_then(|i| non_empty(&i.service.service_name)),
            },
            NetworkType::NodePort => ObjectRefs {
                ingress: None,
                service: self
                    .old_external_node_port_info
                    .as_ref()
                    .and_then(|i| non_empty(&i.service.service_name)),
            },
        }
    }
}

// === impl Manifest ===

impl Manifest {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => "Service",
            Self::Ingress(_) => "Ingress",
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Service(s) => s.name_any(),
            Self::Ingress(i) => i.name_any(),
        }
    }

    pub fn as_service(&self) -> Option<&Service> {
        match self {
            Self::Service(s) => Some(s),
            Self::Ingress(_) => None,
        }
    }

    pub fn as_ingress(&self) -> Option<&Ingress> {
        match self {
            Self::Ingress(i) => Some(i),
            Self::Service(_) => None,
        }
    }
}

impl From<Service> for Manifest {
    fn from(svc: Service) -> Self {
        Self::Service(svc)
    }
}

impl From<Ingress> for Manifest {
    fn from(ing: Ingress) -> Self {
        Self::Ingress(ing)
    }
}

// === impl UpdateNetworkYaml ===

impl UpdateNetworkYaml {
    pub fn new(action: Action, manifest: impl Into<Manifest>) -> Self {
        Self {
            action,
            manifest: manifest.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ServiceNetworkInfo;
    use serde_json::json;

    #[test]
    fn reads_change_requests() {
        let spec: UpdateNetworkSpec = serde_json::from_value(json!({
            "action": "delete",
            "type": "nodePort",
            "oldExternalNodePortInfo": {
                "protocol": "TCP",
                "sourcePort": 8080,
                "targetPort": 8080,
                "nodePort": 30080,
                "serviceName": "svc-np",
            },
        }))
        .unwrap();
        assert_eq!(spec.action, Action::Delete);
        assert_eq!(spec.network_type, NetworkType::NodePort);
        assert_eq!(
            spec.old_refs(),
            ObjectRefs {
                ingress: None,
                service: Some("svc-np"),
            }
        );
        assert!(spec.new_external_node_port_info.is_none());
    }

    #[test]
    fn desired_entries_have_no_refs() {
        let spec = UpdateNetworkSpec {
            action: Action::Update,
            network_type: NetworkType::Internal,
            old_external_network_info: None,
            new_external_network_info: None,
            old_internal_network_info: Some(InternalNetworkInfo {
                service: ServiceNetworkInfo::default(),
            }),
            new_internal_network_info: None,
            old_external_node_port_info: None,
            new_external_node_port_info: None,
        };
        assert_eq!(spec.old_refs(), ObjectRefs::default());
    }

    #[test]
    fn manifests_serialize_as_objects() {
        let yaml = UpdateNetworkYaml::new(
            Action::Delete,
            Service {
                metadata: exposure_controller_k8s_api::ObjectMeta {
                    name: Some("svc-a".to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        assert_eq!(yaml.manifest.kind(), "Service");
        assert_eq!(yaml.manifest.name(), "svc-a");
        assert_eq!(
            serde_json::to_value(&yaml).unwrap(),
            json!({
                "action": "delete",
                "manifest": {
                    "apiVersion": "v1",
                    "kind": "Service",
                    "metadata": { "name": "svc-a" },
                },
            })
        );
    }
}
