use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stagecfg_core::{DEFAULT_STAGE, Result, Stage, StageError, join_key};
use tracing::{debug, info, warn};

/// Name of the stages file looked up in the working directory.
pub const STAGES_FILE_NAME: &str = "project-stages.toml";

/// Loads the named stages of a TOML stages file.
///
/// ```toml
/// [stages.default]
/// swarm.port = 8080
///
/// [stages.production.swarm]
/// port = 80
/// ```
///
/// Nested tables flatten to dotted keys, arrays to indexed keys
/// (`hosts.0`, `hosts.1`). A document without a `stages` table is read as
/// the single `default` stage. Every other stage inherits the keys of
/// `default` that it does not set itself.
#[derive(Debug, Clone, Default)]
pub struct StageLoader {
    stages: BTreeMap<String, Stage>,
    path: Option<PathBuf>,
}

impl StageLoader {
    /// Resolve the stages file: explicit path > STAGECFG_FILE env >
    /// ./project-stages.toml > ~/.stagecfg/project-stages.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        Self::resolve_path_in(
            explicit,
            std::env::var("STAGECFG_FILE").ok(),
            Path::new("."),
            dirs::home_dir(),
        )
    }

    /// [`StageLoader::resolve_path`] with the environment, working
    /// directory and home directory passed in.
    pub fn resolve_path_in(
        explicit: Option<&Path>,
        env_file: Option<String>,
        work_dir: &Path,
        home_dir: Option<PathBuf>,
    ) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Some(p) = env_file {
            return PathBuf::from(p);
        }
        let local = work_dir.join(STAGES_FILE_NAME);
        if local.exists() {
            return local;
        }
        home_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stagecfg")
            .join(STAGES_FILE_NAME)
    }

    /// Resolve the active stage name: explicit > STAGECFG_STAGE env > "default".
    pub fn resolve_stage_name(explicit: Option<&str>) -> String {
        Self::resolve_stage_name_in(explicit, std::env::var("STAGECFG_STAGE").ok())
    }

    pub fn resolve_stage_name_in(explicit: Option<&str>, env_stage: Option<String>) -> String {
        if let Some(name) = explicit {
            return name.to_string();
        }
        env_stage.unwrap_or_else(|| DEFAULT_STAGE.to_string())
    }

    /// Load the stages file, falling back to an empty set when it does not
    /// exist. A path given explicitly must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(explicit);
        if path.exists() {
            return Self::from_file(&path);
        }
        if explicit.is_some() {
            return Err(StageError::Config(format!(
                "stages file not found: {}",
                path.display()
            )));
        }
        warn!(?path, "stages file not found, using an empty default stage");
        Ok(Self::default())
    }

    /// Read and parse the stages file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        info!(?path, "loading stages");
        let raw = std::fs::read_to_string(path)?;
        let mut loader = Self::from_toml_str(&raw).map_err(|e| match e {
            StageError::Config(reason) => {
                StageError::Config(format!("failed to parse {}: {}", path.display(), reason))
            }
            other => other,
        })?;
        loader.path = Some(path.to_path_buf());
        Ok(loader)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let doc = toml::from_str::<toml::Table>(raw)
            .map_err(|e| StageError::Config(e.to_string()))?;

        let mut stages = BTreeMap::new();
        match doc.get("stages") {
            Some(toml::Value::Table(tables)) => {
                for (name, value) in tables {
                    let toml::Value::Table(table) = value else {
                        return Err(StageError::Config(format!(
                            "stage '{name}' must be a table"
                        )));
                    };
                    stages.insert(name.clone(), Stage::new(name.clone(), flatten(table)));
                }
            }
            Some(_) => {
                return Err(StageError::Config("'stages' must be a table".into()));
            }
            None => {
                stages.insert(
                    DEFAULT_STAGE.to_string(),
                    Stage::new(DEFAULT_STAGE, flatten(&doc)),
                );
            }
        }

        if let Some(base) = stages.get(DEFAULT_STAGE).cloned() {
            for (name, stage) in stages.iter_mut() {
                if name != DEFAULT_STAGE {
                    stage.inherit_from(&base);
                }
            }
        }

        debug!(count = stages.len(), "parsed stages");
        Ok(Self { stages, path: None })
    }

    /// The stage called `name`. `default` always exists, empty if the file
    /// does not define it.
    pub fn stage(&self, name: &str) -> Result<Stage> {
        match self.stages.get(name) {
            Some(stage) => Ok(stage.clone()),
            None if name == DEFAULT_STAGE => Ok(Stage::empty(DEFAULT_STAGE)),
            None => Err(StageError::StageNotFound(name.to_string())),
        }
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.keys().cloned().collect()
    }

    /// File the stages were read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn flatten(table: &toml::Table) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in table {
        flatten_value(key, value, &mut out);
    }
    out
}

fn flatten_value(key: &str, value: &toml::Value, out: &mut BTreeMap<String, String>) {
    match value {
        toml::Value::String(s) => {
            out.insert(key.to_string(), s.clone());
        }
        toml::Value::Integer(i) => {
            out.insert(key.to_string(), i.to_string());
        }
        toml::Value::Float(f) => {
            out.insert(key.to_string(), f.to_string());
        }
        toml::Value::Boolean(b) => {
            out.insert(key.to_string(), b.to_string());
        }
        toml::Value::Datetime(d) => {
            out.insert(key.to_string(), d.to_string());
        }
        toml::Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_value(&join_key(key, &i.to_string()), item, out);
            }
        }
        toml::Value::Table(table) => {
            for (child, item) in table {
                flatten_value(&join_key(key, child), item, out);
            }
        }
    }
}
