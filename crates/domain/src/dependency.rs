//! Dependency rules: the blacklist and the ordered load order.

use std::slice;

/// Domains no component may declare as a dependency.
pub const DEPENDENCY_BLACKLIST: [&str; 1] = ["config"];

/// Return the declared dependencies that are on the blacklist.
#[must_use]
pub fn blacklisted(dependencies: &[String]) -> Vec<String> {
    dependencies
        .iter()
        .filter(|dep| DEPENDENCY_BLACKLIST.contains(&dep.as_str()))
        .cloned()
        .collect()
}

/// Ordered, duplicate-free list of domains.
///
/// Used both for a component's declared dependencies and for the resolved
/// load order, where every domain appears after its own dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder(Vec<String>);

impl LoadOrder {
    /// Create an empty order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `domain` unless it is already present.
    ///
    /// Returns `true` when the domain was added.
    pub fn push(&mut self, domain: impl Into<String>) -> bool {
        let domain = domain.into();
        if self.contains(&domain) {
            return false;
        }
        self.0.push(domain);
        true
    }

    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.0.iter().any(|d| d == domain)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LoadOrder {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut order = Self::new();
        for domain in iter {
            order.push(domain);
        }
        order
    }
}

impl<'a> IntoIterator for &'a LoadOrder {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_detect_blacklisted_dependency() {
        let deps = vec!["http".to_string(), "config".to_string()];
        assert_eq!(blacklisted(&deps), vec!["config".to_string()]);
    }

    #[test]
    fn should_return_empty_when_no_dependency_is_blacklisted() {
        let deps = vec!["http".to_string(), "mqtt".to_string()];
        assert!(blacklisted(&deps).is_empty());
    }

    #[test]
    fn should_keep_first_occurrence_when_collecting() {
        let order: LoadOrder = ["b", "a", "b", "c", "a"].into_iter().collect();
        assert_eq!(order.as_slice(), ["b", "a", "c"]);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn should_report_whether_push_added_domain() {
        let mut order = LoadOrder::new();
        assert!(order.is_empty());
        assert!(order.push("http"));
        assert!(!order.push("http"));
        assert!(order.contains("http"));
    }
}
