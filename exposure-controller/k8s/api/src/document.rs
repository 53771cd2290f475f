//! Decodes untyped documents into the typed object model.
//!
//! This is the only place where untyped object trees are handled. Everything past
//! [`Object::decode`] works with typed resources.

use crate::{DaemonSet, Deployment, Ingress, ObjectMeta, ResourceExt, Service, StatefulSet};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("object does not declare a kind")]
    MissingKind,

    #[error("unsupported kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid {kind}: {source}")]
    Invalid {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A resource the engine knows how to read.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    DaemonSet(DaemonSet),
    Service(Service),
    Ingress(Ingress),
}

// === impl Object ===

impl Object {
    pub fn decode(value: Value) -> Result<Self, DecodeError> {
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingKind)?
            .to_string();
        match kind.as_str() {
            "Deployment" => typed(kind, value).map(Self::Deployment),
            "StatefulSet" => typed(kind, value).map(Self::StatefulSet),
            "DaemonSet" => typed(kind, value).map(Self::DaemonSet),
            "Service" => typed(kind, value).map(Self::Service),
            "Ingress" => typed(kind, value).map(Self::Ingress),
            _ => Err(DecodeError::UnsupportedKind(kind)),
        }
    }

    /// Decodes a document that is either a single object or a `List` of objects.
    pub fn decode_all(mut value: Value) -> Vec<Result<Self, DecodeError>> {
        let is_list = value
            .get("kind")
            .and_then(Value::as_str)
            .is_some_and(|k| k == "List" || k.ends_with("List"));
        if !is_list {
            return vec![Self::decode(value)];
        }

        match value.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => items.into_iter().map(Self::decode).collect(),
            _ => vec![],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deployment(_) => "Deployment",
            Self::StatefulSet(_) => "StatefulSet",
            Self::DaemonSet(_) => "DaemonSet",
            Self::Service(_) => "Service",
            Self::Ingress(_) => "Ingress",
        }
    }

    pub fn name(&self) -> String {
        self.metadata().name.clone().unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<String> {
        match self {
            Self::Deployment(o) => o.namespace(),
            Self::StatefulSet(o) => o.namespace(),
            Self::DaemonSet(o) => o.namespace(),
            Self::Service(o) => o.namespace(),
            Self::Ingress(o) => o.namespace(),
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Deployment(o) => &o.metadata,
            Self::StatefulSet(o) => &o.metadata,
            Self::DaemonSet(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Ingress(o) => &o.metadata,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Deployment(o) => &mut o.metadata,
            Self::StatefulSet(o) => &mut o.metadata,
            Self::DaemonSet(o) => &mut o.metadata,
            Self::Service(o) => &mut o.metadata,
            Self::Ingress(o) => &mut o.metadata,
        }
    }
}

fn typed<T: DeserializeOwned>(kind: String, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Invalid { kind, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_supported_kinds() {
        let svc = Object::decode(json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": { "name": "svc-a", "namespace": "ns-0" },
            "spec": { "ports": [{ "port": 80, "targetPort": "http" }] },
        }))
        .expect("service must decode");
        assert_eq!(svc.kind(), "Service");
        assert_eq!(svc.name(), "svc-a");
        assert_eq!(svc.namespace().as_deref(), Some("ns-0"));

        let ing = Object::decode(json!({
            "apiVersion": "networking.k8s.io/v1",
            "kind": "Ingress",
            "metadata": { "name": "ing-a" },
        }))
        .expect("ingress must decode");
        assert!(matches!(ing, Object::Ingress(_)));
    }

    #[test]
    fn rejects_unknown_and_malformed() {
        assert!(matches!(
            Object::decode(json!({ "metadata": { "name": "x" } })),
            Err(DecodeError::MissingKind)
        ));
        assert!(matches!(
            Object::decode(json!({ "apiVersion": "v1", "kind": "ConfigMap" })),
            Err(DecodeError::UnsupportedKind(k)) if k == "ConfigMap"
        ));
        assert!(matches!(
            Object::decode(json!({
                "apiVersion": "v1",
                "kind": "Service",
                "spec": { "ports": "not-a-list" },
            })),
            Err(DecodeError::Invalid { kind, .. }) if kind == "Service"
        ));
    }

    #[test]
    fn unwraps_lists() {
        let objs = Object::decode_all(json!({
            "apiVersion": "v1",
            "kind": "List",
            "items": [
                { "apiVersion": "v1", "kind": "Service", "metadata": { "name": "a" } },
                { "apiVersion": "v1", "kind": "Secret", "metadata": { "name": "b" } },
            ],
        }));
        assert_eq!(objs.len(), 2);
        assert_eq!(objs[0].as_ref().map(Object::name).ok(), Some("a".to_string()));
        assert!(matches!(objs[1], Err(DecodeError::UnsupportedKind(_))));
    }
}
