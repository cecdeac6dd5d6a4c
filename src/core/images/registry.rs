/// Read-only mapping from image name to its source repository URL.
///
/// Passed explicitly into the resolver and prober; scoped to one run.
/// Entries keep insertion order so probe output stays deterministic.
#[derive(Debug, Clone)]
pub struct ImageRegistry {
    entries: Vec<(String, String)>,
}

impl ImageRegistry {
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, url)| (name.to_string(), url.to_string()))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, url)| url.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, u)| (n.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The S2I builder image set published by the openshift org.
    pub fn openshift_defaults() -> Self {
        Self::new(vec![
            ("openshift/base", "https://github.com/openshift/sti-base"),
            ("openshift/ruby-20", "https://github.com/openshift/sti-ruby"),
            ("openshift/nodejs-010", "https://github.com/openshift/sti-nodejs"),
            ("openshift/python-33", "https://github.com/openshift/sti-python"),
            ("openshift/perl-516", "https://github.com/openshift/sti-perl"),
            ("openshift/php-55", "https://github.com/openshift/sti-php"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_registered_names() {
        let registry = ImageRegistry::openshift_defaults();
        assert_eq!(
            registry.lookup("openshift/base"),
            Some("https://github.com/openshift/sti-base")
        );
        assert_eq!(registry.lookup("unknown/image"), None);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let registry = ImageRegistry::new(vec![("b", "url-b"), ("a", "url-a")]);
        let names: Vec<&str> = registry.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
