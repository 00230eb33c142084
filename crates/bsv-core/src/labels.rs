//! Field name -> display label resolution.
//!
//! Labels are typeset by the renderer as math, so a resolved label is wrapped
//! in `$$` delimiters. Unknown fields pass through unchanged.

use std::collections::HashMap;

/// Mapping from raw field (parameter) name to its math-typeset form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LabelMap(HashMap<String, String>);

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, label: impl Into<String>) {
        self.0.insert(field.into(), label.into());
    }

    /// Raw (undelimited) label for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn resolve(&self, field: &str) -> String {
        resolve_label(field, Some(self))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Display label for `field`: the mapped label in math delimiters, or `field`
/// itself when there is no map or no entry.
pub fn resolve_label(field: &str, labels: Option<&LabelMap>) -> String {
    match labels.and_then(|map| map.get(field)) {
        Some(label) => format!("$${label}$$"),
        None => field.to_string(),
    }
}
