use anyhow::{bail, Context, Result};
use exposure_controller_core::{update::ObjectRefs, Workload};
use exposure_controller_k8s_api::{self as k8s, DecodeError, Object, ResourceExt};
use exposure_controller_k8s_plan::LiveObjects;
use futures::future;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// The objects of one namespace, read from YAML or JSON files.
#[derive(Debug, Default)]
pub struct Snapshot {
    namespace: String,
    workloads: Vec<Workload>,
    ingresses: Vec<k8s::Ingress>,
    services: Vec<k8s::Service>,
}

// === impl Snapshot ===

impl Snapshot {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Reads all files concurrently. Objects without a namespace are placed in `namespace`.
    #[instrument(skip(paths), fields(files = paths.len()))]
    pub async fn load(namespace: &str, paths: &[PathBuf]) -> Result<Self> {
        let texts = future::try_join_all(paths.iter().map(|p| read(p))).await?;

        let mut snapshot = Self::new(namespace);
        for (path, text) in paths.iter().zip(&texts) {
            snapshot
                .extend_from_str(text)
                .with_context(|| format!("failed to parse {}", path.display()))?;
        }
        debug!(
            workloads = snapshot.workloads.len(),
            ingresses = snapshot.ingresses.len(),
            services = snapshot.services.len(),
            "Loaded"
        );
        Ok(snapshot)
    }

    /// Adds every supported object of a (possibly multi-document) YAML or JSON text.
    pub fn extend_from_str(&mut self, text: &str) -> Result<()> {
        for document in serde_yaml::Deserializer::from_str(text) {
            let value = serde_json::Value::deserialize(document)?;
            if value.is_null() {
                continue;
            }

            for object in Object::decode_all(value) {
                match object {
                    Ok(object) => self.insert(object),
                    Err(DecodeError::UnsupportedKind(kind)) => {
                        debug!(%kind, "Skipping unsupported object")
                    }
                    Err(DecodeError::MissingKind) => debug!("Skipping document without a kind"),
                    Err(error) => return Err(error.into()),
                }
            }
        }
        Ok(())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn workload(&self, name: &str) -> Result<&Workload> {
        match self
            .workloads
            .iter()
            .find(|w| w.name == name && w.namespace == self.namespace)
        {
            Some(workload) => Ok(workload),
            None => bail!("workload {name} not found in namespace {}", self.namespace),
        }
    }

    pub fn ingresses(&self) -> &[k8s::Ingress] {
        &self.ingresses
    }

    pub fn services(&self) -> &[k8s::Service] {
        &self.services
    }

    /// Looks up the live objects a change refers to.
    pub fn live(&self, refs: ObjectRefs<'_>) -> LiveObjects<'_> {
        LiveObjects {
            ingress: refs.ingress.and_then(|name| self.find(&self.ingresses, name)),
            service: refs.service.and_then(|name| self.find(&self.services, name)),
        }
    }

    fn find<'s, T: ResourceExt>(&self, objects: &'s [T], name: &str) -> Option<&'s T> {
        objects.iter().find(|o| {
            o.name_any() == name && o.namespace().as_deref() == Some(self.namespace.as_str())
        })
    }

    fn insert(&mut self, mut object: Object) {
        let meta = object.metadata_mut();
        if meta.namespace.as_deref().map_or(true, str::is_empty) {
            meta.namespace = Some(self.namespace.clone());
        }

        let kind = object.kind();
        let name = object.name();
        let workload = match object {
            Object::Service(svc) => {
                self.services.push(svc);
                return;
            }
            Object::Ingress(ing) => {
                self.ingresses.push(ing);
                return;
            }
            Object::Deployment(deploy) => Workload::from_deployment(&deploy),
            Object::StatefulSet(sts) => Workload::from_stateful_set(&sts),
            Object::DaemonSet(ds) => Workload::from_daemon_set(&ds),
        };
        match workload {
            Some(workload) => self.workloads.push(workload),
            None => debug!(%kind, %name, "Skipping workload without a spec"),
        }
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Reads a single YAML or JSON document.
pub async fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read(path).await?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECTS: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  annotations:
    sidecar.istio.io/inject: "true"
spec:
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
        - name: web
          image: nginx
          ports:
            - name: http
              containerPort: 8080
---
apiVersion: v1
kind: Service
metadata:
  name: svc-a
spec:
  type: ClusterIP
  selector:
    app: web
  ports:
    - port: 80
      targetPort: http
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
---
apiVersion: v1
kind: List
items:
  - apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: ing-a
      namespace: ns-0
    spec:
      rules:
        - host: web.example.com
          http:
            paths:
              - path: /
                pathType: Prefix
                backend:
                  service:
                    name: svc-a
                    port:
                      number: 80
  - apiVersion: networking.k8s.io/v1
    kind: Ingress
    metadata:
      name: ing-other
      namespace: ns-1
"#;

    #[test]
    fn reads_multi_document_yaml() {
        let mut snapshot = Snapshot::new("ns-0");
        snapshot.extend_from_str(OBJECTS).expect("objects must parse");

        let workload = snapshot.workload("web").expect("workload must be found");
        assert_eq!(workload.namespace, "ns-0");
        assert_eq!(workload.inject_sidecar.as_deref(), Some("true"));
        assert_eq!(workload.containers.len(), 1);

        assert_eq!(snapshot.services().len(), 1);
        assert_eq!(snapshot.services()[0].namespace().as_deref(), Some("ns-0"));
        assert_eq!(snapshot.ingresses().len(), 2);
        assert!(snapshot.workload("api").is_err());
    }

    #[test]
    fn looks_up_live_objects() {
        let mut snapshot = Snapshot::new("ns-0");
        snapshot.extend_from_str(OBJECTS).expect("objects must parse");

        let live = snapshot.live(ObjectRefs {
            ingress: Some("ing-a"),
            service: Some("svc-a"),
        });
        assert_eq!(live.ingress.map(|i| i.name_any()).as_deref(), Some("ing-a"));
        assert_eq!(live.service.map(|s| s.name_any()).as_deref(), Some("svc-a"));

        let live = snapshot.live(ObjectRefs {
            ingress: Some("ing-other"),
            service: None,
        });
        assert!(live.ingress.is_none(), "objects in other namespaces are ignored");
        assert!(live.service.is_none());
    }

    #[test]
    fn rejects_malformed_objects() {
        let mut snapshot = Snapshot::new("ns-0");
        let err = snapshot
            .extend_from_str("apiVersion: v1\nkind: Service\nspec: 7\n")
            .expect_err("a malformed service must be rejected");
        assert!(err.to_string().contains("invalid Service"), "{err}");
    }
}
