use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::source::PropertySource;

/// A named set of configuration key/value pairs: one deployment profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    name: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

impl Stage {
    pub fn new<K, V>(name: impl Into<String>, properties: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            properties: properties
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// A stage with no properties.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Fill in every key of `base` this stage does not define itself.
    pub fn inherit_from(&mut self, base: &Stage) {
        for (k, v) in &base.properties {
            self.properties
                .entry(k.clone())
                .or_insert_with(|| v.clone());
        }
    }
}

impl PropertySource for Stage {
    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }
}
