//! The annotation and label conventions shared with the rest of the platform.
//!
//! Ownership and domain metadata are carried on objects as annotations whose keys are scoped by a
//! configurable base domain (`app.<domain>/creator`, ...). Nothing outside this module should
//! compare against the raw annotation values.

use crate::ObjectMeta;
use std::collections::BTreeMap;

/// Label propagated from a workload to its exposure objects to keep mesh sidecar injection
/// consistent.
pub const SIDECAR_INJECT: &str = "sidecar.istio.io/inject";

/// Base domain used when none is configured.
pub const DEFAULT_BASE_DOMAIN: &str = "alauda.io";

const SYSTEM_CREATOR: &str = "SYSTEM";

/// Annotation keys derived from a base domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationKeys {
    creator: String,
    domain_name: String,
    domain_prefix: String,
}

// === impl AnnotationKeys ===

impl AnnotationKeys {
    pub fn for_domain(base_domain: &str) -> Self {
        Self {
            creator: format!("app.{base_domain}/creator"),
            domain_name: format!("app.{base_domain}/domain_name"),
            domain_prefix: format!("app.{base_domain}/domain_prefix"),
        }
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    pub fn domain_prefix(&self) -> &str {
        &self.domain_prefix
    }

    /// Returns true if the object was generated on behalf of a user action rather than authored
    /// by the user directly.
    pub fn is_system_created(&self, meta: &ObjectMeta) -> bool {
        meta.annotations
            .as_ref()
            .and_then(|a| a.get(&self.creator))
            .is_some_and(|v| v == SYSTEM_CREATOR)
    }

    pub fn mark_system_created(&self, annotations: &mut BTreeMap<String, String>) {
        annotations.insert(self.creator.clone(), SYSTEM_CREATOR.to_string());
    }

    /// Reads the external domain name and prefix bound to a gateway object. Missing values are
    /// empty.
    pub fn domain(&self, meta: &ObjectMeta) -> (String, String) {
        let get = |key: &str| {
            meta.annotations
                .as_ref()
                .and_then(|a| a.get(key))
                .cloned()
                .unwrap_or_default()
        };
        (get(&self.domain_name), get(&self.domain_prefix))
    }

    pub fn set_domain(
        &self,
        annotations: &mut BTreeMap<String, String>,
        domain_name: &str,
        domain_prefix: &str,
    ) {
        annotations.insert(self.domain_prefix.clone(), domain_prefix.to_string());
        annotations.insert(self.domain_name.clone(), domain_name.to_string());
    }
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self::for_domain(DEFAULT_BASE_DOMAIN)
    }
}

/// Reads the sidecar-injection setting from an object's annotations.
pub fn sidecar_inject(meta: &ObjectMeta) -> Option<&str> {
    meta.annotations
        .as_ref()
        .and_then(|a| a.get(SIDECAR_INJECT))
        .map(String::as_str)
}
