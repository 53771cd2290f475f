use ahash::AHashMap as HashMap;
use exposure_controller_core::PortRef;
use exposure_controller_k8s_api::Container;

/// An index of the ports declared by a pod template's containers.
///
/// Each port is registered by number and, when it is named, by name, so that a referencing object
/// may resolve it either way.
#[derive(Debug, Default)]
pub struct PortIndex {
    by_ref: HashMap<PortRef, i32>,
}

// === impl PortIndex ===

impl PortIndex {
    pub fn from_containers<'c>(containers: impl IntoIterator<Item = &'c Container>) -> Self {
        let mut by_ref = HashMap::new();
        for port in containers.into_iter().flat_map(|c| c.ports.iter().flatten()) {
            if let Some(name) = port.name.as_deref().filter(|n| !n.is_empty()) {
                by_ref.insert(PortRef::Name(name.to_string()), port.container_port);
            }
            by_ref.insert(PortRef::Number(port.container_port), port.container_port);
        }
        Self { by_ref }
    }

    /// Returns the container port a reference resolves to. Zero is never returned, since such a
    /// port cannot carry traffic.
    pub fn container_port(&self, port: &PortRef) -> Option<i32> {
        self.by_ref.get(port).copied().filter(|p| *p != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exposure_controller_k8s_api::ContainerPort;

    fn mk_container(name: &str, ports: impl IntoIterator<Item = (Option<&'static str>, i32)>) -> Container {
        Container {
            name: name.to_string(),
            ports: Some(
                ports
                    .into_iter()
                    .map(|(name, container_port)| ContainerPort {
                        name: name.map(Into::into),
                        container_port,
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn resolves_by_name_and_number() {
        let containers = [
            mk_container("web", [(Some("http"), 8080), (None, 9090)]),
            mk_container("sidecar", [(Some("admin"), 4191)]),
        ];
        let index = PortIndex::from_containers(&containers);

        assert_eq!(index.container_port(&PortRef::Name("http".into())), Some(8080));
        assert_eq!(index.container_port(&PortRef::Number(8080)), Some(8080));
        assert_eq!(index.container_port(&PortRef::Number(9090)), Some(9090));
        assert_eq!(index.container_port(&PortRef::Name("admin".into())), Some(4191));
        assert_eq!(index.container_port(&PortRef::Number(80)), None);
        assert_eq!(index.container_port(&PortRef::Name("grpc".into())), None);
        // A port named like a number is still only reachable by name.
        assert_eq!(index.container_port(&PortRef::Name("9090".into())), None);
    }

    #[test]
    fn ignores_empty_names_and_zero_ports() {
        let containers = [mk_container("web", [(Some(""), 8080), (Some("bad"), 0)])];
        let index = PortIndex::from_containers(&containers);
        assert_eq!(index.container_port(&PortRef::Name(String::new())), None);
        assert_eq!(index.container_port(&PortRef::Name("bad".into())), None);
        assert_eq!(index.container_port(&PortRef::Number(0)), None);
        assert_eq!(index.container_port(&PortRef::Number(8080)), Some(8080));
    }

    #[test]
    fn resolves_nothing_without_ports() {
        let index = PortIndex::from_containers(&[Container::default()]);
        assert_eq!(index.container_port(&PortRef::Number(80)), None);
        assert_eq!(index.container_port(&PortRef::Name("http".into())), None);
    }
}
