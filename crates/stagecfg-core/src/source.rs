use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::types::KEY_SEPARATOR;

/// A read-only source of string-valued properties.
///
/// Resolution never writes through this trait; sources are owned and
/// populated by whoever builds them.
pub trait PropertySource {
    /// Value stored for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Every key this source defines.
    fn keys(&self) -> Vec<String>;

    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl PropertySource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }
}

impl PropertySource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

// ── Properties ─────────────────────────────────────────────────

/// Owned in-memory property map, used as the fallback behind a stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Set `key`, returning the value it replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Copy every entry of `other` in, overwriting existing keys.
    pub fn extend_from(&mut self, other: &Properties) {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Properties {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.entries.insert(k.into(), v.into());
        }
    }
}

impl PropertySource for Properties {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

// ── Environment ────────────────────────────────────────────────

/// Snapshot of the process environment taken at construction time.
///
/// Later changes to the environment are not observed.
#[derive(Debug, Clone, Default)]
pub struct EnvProperties {
    vars: Properties,
}

impl EnvProperties {
    /// Capture every environment variable under its own name.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Capture variables starting with `prefix`, mapped to dotted keys
    /// (`STAGECFG_SWARM_PORT` with prefix `STAGECFG_` becomes `swarm.port`).
    pub fn with_prefix(prefix: &str) -> Self {
        Self::from_vars_with_prefix(std::env::vars(), prefix)
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    pub fn from_vars_with_prefix(
        vars: impl IntoIterator<Item = (String, String)>,
        prefix: &str,
    ) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(prefix)?;
                if rest.is_empty() {
                    return None;
                }
                Some((env_name_to_key(rest), value))
            })
            .collect();
        tracing::debug!(prefix, "captured prefixed environment");
        Self { vars }
    }

    pub fn into_properties(self) -> Properties {
        self.vars
    }
}

fn env_name_to_key(name: &str) -> String {
    let separator = KEY_SEPARATOR.to_string();
    name.to_ascii_lowercase()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator.as_str())
}

impl PropertySource for EnvProperties {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key)
    }

    fn keys(&self) -> Vec<String> {
        self.vars.keys()
    }
}
