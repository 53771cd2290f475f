//! The editable projection of a workload's exposure.
//!
//! The same types describe both observed state and desired state: entries describing existing
//! exposure carry back-references (`ingressName`, `serviceName`) to the objects they were read
//! from, while entries describing something to create leave them empty.

use exposure_controller_k8s_api::Time;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    #[serde(default)]
    pub external_network_infos: Vec<ExternalNetworkInfo>,

    #[serde(default)]
    pub internal_network_infos: Vec<InternalNetworkInfo>,

    #[serde(default)]
    pub external_node_port_infos: Vec<ExternalNodePortInfo>,
}

/// Reachability through a gateway host/path rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNetworkInfo {
    #[serde(default)]
    pub domain_prefix: String,

    #[serde(default)]
    pub domain_name: String,

    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub target_port: i32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ingress_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,

    #[serde(default)]
    pub created_at: Option<Time>,
}

/// Fields shared by internal and node-port exposure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNetworkInfo {
    /// A transport protocol (`TCP`, `UDP`) or an application protocol (`HTTP`, `GRPC`, ...).
    #[serde(default)]
    pub protocol: String,

    #[serde(default)]
    pub source_port: i32,

    #[serde(default)]
    pub target_port: i32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,

    #[serde(default)]
    pub created_at: Option<Time>,
}

/// Reachability through a cluster-local virtual address.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalNetworkInfo {
    #[serde(flatten)]
    pub service: ServiceNetworkInfo,
}

/// Reachability through a port opened on every node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalNodePortInfo {
    #[serde(flatten)]
    pub service: ServiceNetworkInfo,

    /// Zero leaves the choice to the cluster.
    #[serde(default)]
    pub node_port: i32,
}

/// Human-readable addresses a workload is reachable at.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitAddress {
    pub internal: Vec<String>,
    pub external: Vec<String>,
    #[serde(rename = "nodeport")]
    pub node_port: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn desired_entries_omit_back_references() {
        let info = NetworkInfo {
            internal_network_infos: vec![InternalNetworkInfo {
                service: ServiceNetworkInfo {
                    protocol: "TCP".to_string(),
                    source_port: 8080,
                    target_port: 80,
                    ..Default::default()
                },
            }],
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "externalNetworkInfos": [],
                "internalNetworkInfos": [{
                    "protocol": "TCP",
                    "sourcePort": 8080,
                    "targetPort": 80,
                    "createdAt": null,
                }],
                "externalNodePortInfos": [],
            })
        );
    }

    #[test]
    fn reads_node_port_entries() {
        let info: NetworkInfo = serde_json::from_value(json!({
            "externalNodePortInfos": [{
                "protocol": "UDP",
                "targetPort": 53,
                "nodePort": 30053,
                "serviceName": "dns",
            }],
        }))
        .unwrap();
        assert_eq!(
            info.external_node_port_infos,
            vec![ExternalNodePortInfo {
                service: ServiceNetworkInfo {
                    protocol: "UDP".to_string(),
                    target_port: 53,
                    service_name: "dns".to_string(),
                    ..Default::default()
                },
                node_port: 30053,
            }]
        );
        assert!(info.external_network_infos.is_empty());
    }
}
