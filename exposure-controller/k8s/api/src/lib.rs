#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
pub mod document;
pub mod labels;

pub use self::{
    annotations::AnnotationKeys,
    document::{DecodeError, Object},
    labels::{Labels, Selector},
};
pub use k8s_openapi::{
    api::{
        self,
        apps::v1::{DaemonSet, Deployment, StatefulSet},
        core::v1::{Container, ContainerPort, PodTemplateSpec, Service, ServicePort, ServiceSpec},
        networking::v1::{
            HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
            IngressServiceBackend, IngressSpec, IngressTLS, ServiceBackendPort,
        },
    },
    apimachinery::pkg::{
        apis::meta::v1::{ObjectMeta, Time},
        util::intstr::IntOrString,
    },
};
pub use kube::{Resource, ResourceExt};

/// The `spec.type` of a cluster-internal exposure object.
pub const SERVICE_TYPE_CLUSTER_IP: &str = "ClusterIP";

/// The `spec.type` of an exposure object published on every node.
pub const SERVICE_TYPE_NODE_PORT: &str = "NodePort";
