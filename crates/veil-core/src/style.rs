//! Ordered inline style rules.

use std::collections::BTreeMap;

/// An ordered set of CSS `property: value` pairs.
///
/// Property names use CSS spelling (`z-index`, not `zIndex`). Setting a
/// property that is already present replaces its value in place, so the
/// original insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")
)]
pub struct StyleRules {
    rules: Vec<(String, String)>,
}

impl StyleRules {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StyleRules::set`].
    #[must_use]
    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property, replacing any existing value.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.rules.iter_mut().find(|(name, _)| *name == property) {
            Some(slot) => slot.1 = value,
            None => self.rules.push((property, value)),
        }
    }

    /// Look up a property value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Apply every rule of `other` on top of `self`.
    pub fn extend(&mut self, other: &Self) {
        for (property, value) in other.iter() {
            self.set(property, value);
        }
    }

    /// Iterate rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rules.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<BTreeMap<String, String>> for StyleRules {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self {
            rules: map.into_iter().collect(),
        }
    }
}

impl From<StyleRules> for BTreeMap<String, String> {
    fn from(rules: StyleRules) -> Self {
        rules.rules.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleRules {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut rules = Self::new();
        for (property, value) in iter {
            rules.set(property, value);
        }
        rules
    }
}
