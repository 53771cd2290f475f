use ahash::AHashSet as HashSet;
use exposure_controller_core::{relation::NetworkRelation, update::Manifest};
use exposure_controller_k8s_api::{self as k8s, ResourceExt};
use tracing::trace;

/// Collects the live objects backing a set of relations: the gateway object and then the exposure
/// object of each external relation, or only the exposure object of a bare relation.
///
/// Each object is returned once, at its first occurrence.
pub fn matched_resources(
    relations: &[NetworkRelation],
    namespace: &str,
    ingresses: &[k8s::Ingress],
    services: &[k8s::Service],
) -> Vec<Manifest> {
    let mut seen = HashSet::new();
    let mut matched = Vec::new();

    let in_ns = |meta_ns: Option<String>| meta_ns.as_deref() == Some(namespace);
    for relation in relations {
        if let Some(ing) = relation.ingress.as_ref() {
            if seen.insert(("Ingress", ing.name.clone())) {
                match ingresses
                    .iter()
                    .find(|i| i.name_any() == ing.name && in_ns(i.namespace()))
                {
                    Some(i) => matched.push(Manifest::Ingress(i.clone())),
                    None => trace!(ingress = %ing.name, "Ingress not found"),
                }
            }
        }

        let name = &relation.service.name;
        if seen.insert(("Service", name.clone())) {
            match services
                .iter()
                .find(|s| s.name_any() == *name && in_ns(s.namespace()))
            {
                Some(s) => matched.push(Manifest::Service(s.clone())),
                None => trace!(service = %name, "Service not found"),
            }
        }
    }

    matched
}
