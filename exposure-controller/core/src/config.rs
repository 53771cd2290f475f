use exposure_controller_k8s_api::{annotations::DEFAULT_BASE_DOMAIN, AnnotationKeys};

/// Configures how the engine reads and writes its annotations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExposureConfig {
    annotations: AnnotationKeys,
}

// === impl ExposureConfig ===

impl ExposureConfig {
    pub fn new(base_domain: impl Into<String>) -> Self {
        Self {
            annotations: AnnotationKeys::for_domain(&base_domain.into()),
        }
    }

    pub fn annotations(&self) -> &AnnotationKeys {
        &self.annotations
    }
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DOMAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_follow_base_domain() {
        let config = ExposureConfig::new("example.com");
        assert_eq!(config.annotations(), &AnnotationKeys::for_domain("example.com"));
        assert_eq!(config.annotations().creator(), "app.example.com/creator");
        assert_eq!(ExposureConfig::default().annotations(), &AnnotationKeys::default());
    }
}
