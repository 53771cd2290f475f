use exposure_controller_core::{
    relation::ExposureType,
    update::{Action, NetworkType},
    NodePortRangeError,
};

/// Reasons a requested exposure change cannot be planned.
///
/// Planning stops at the first error and returns no actions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("{action} of {network_type} exposure requires its {field} entry")]
    MissingSpec {
        action: Action,
        network_type: NetworkType,
        field: &'static str,
    },

    #[error("the ingress referenced by the change was not supplied")]
    MissingIngress,

    #[error("the service referenced by the change was not supplied")]
    MissingService,

    #[error("service {service} has type {found}, expected {expected}")]
    ExposureTypeMismatch {
        service: String,
        expected: ExposureType,
        found: String,
    },

    #[error("no matched service port was found: service {service} has no port {port}")]
    NoMatchingPort { service: String, port: i32 },

    #[error("no matched ingress rule was found: ingress {ingress} has no path {host}{path}")]
    NoMatchingRule {
        ingress: String,
        host: String,
        path: String,
    },

    #[error(transparent)]
    NodePort(#[from] NodePortRangeError),
}
