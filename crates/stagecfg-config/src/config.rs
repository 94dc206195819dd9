use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use stagecfg_core::{KEY_SEPARATOR, Properties, PropertySource, Stage};

use crate::resolver::Resolver;

/// Entry point bound to one stage, backed by a fallback property source.
#[derive(Clone)]
pub struct StageConfig {
    stage: Arc<Stage>,
    fallback: Arc<dyn PropertySource + Send + Sync>,
}

impl StageConfig {
    /// Bind to `stage` with an empty fallback.
    pub fn new(stage: impl Into<Arc<Stage>>) -> Self {
        Self::with_fallback(stage, Properties::new())
    }

    /// Bind to `stage`, consulting `fallback` for keys the stage lacks.
    pub fn with_fallback<S>(stage: impl Into<Arc<Stage>>, fallback: S) -> Self
    where
        S: PropertySource + Send + Sync + 'static,
    {
        Self::with_shared_fallback(stage, Arc::new(fallback))
    }

    pub fn with_shared_fallback(
        stage: impl Into<Arc<Stage>>,
        fallback: Arc<dyn PropertySource + Send + Sync>,
    ) -> Self {
        Self {
            stage: stage.into(),
            fallback,
        }
    }

    /// Start resolving `key` as a string.
    pub fn resolve(&self, key: impl Into<String>) -> Resolver<'_, String> {
        Resolver::new(self, key)
    }

    /// Keys defined by the stage itself.
    pub fn keys(&self) -> BTreeSet<String> {
        self.stage.properties().keys().cloned().collect()
    }

    /// The next path segment below `prefix`, across stage and fallback keys.
    ///
    /// With keys `a.b.c` and `a.d`, `simple_subkeys("a")` is `{b, d}`.
    pub fn simple_subkeys(&self, prefix: &str) -> BTreeSet<String> {
        let search_prefix = format!("{prefix}{KEY_SEPARATOR}");
        self.all_keys()
            .iter()
            .filter_map(|key| key.strip_prefix(search_prefix.as_str()))
            .map(|rest| match rest.find(KEY_SEPARATOR) {
                Some(end) => &rest[..end],
                None => rest,
            })
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether `key` is defined, or is a prefix of a defined key.
    pub fn has_key_or_subkeys(&self, key: &str) -> bool {
        let search_prefix = format!("{key}{KEY_SEPARATOR}");
        self.all_keys()
            .iter()
            .any(|k| k == key || k.starts_with(search_prefix.as_str()))
    }

    pub fn name(&self) -> &str {
        self.stage.name()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn fallback(&self) -> &(dyn PropertySource + Send + Sync) {
        self.fallback.as_ref()
    }

    fn all_keys(&self) -> BTreeSet<String> {
        let mut keys: BTreeSet<String> = self.fallback.keys().into_iter().collect();
        keys.extend(self.stage.properties().keys().cloned());
        keys
    }
}

impl fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageConfig")
            .field("stage", &self.stage.name())
            .field("keys", &self.stage.len())
            .finish_non_exhaustive()
    }
}
