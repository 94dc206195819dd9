use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use url::Url;

use stagecfg_config::{StageConfig, StageLoader};
use stagecfg_core::{EnvProperties, Properties, StageError};

/// Resolve configuration values from a named stage
#[derive(Parser)]
#[command(name = "stagecfg", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the stages file (default: ./project-stages.toml or ~/.stagecfg/)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Stage to resolve against (default: $STAGECFG_STAGE or "default")
    #[arg(short, long, global = true)]
    stage: Option<String>,

    /// Fallback property as KEY=VALUE, consulted when the stage lacks a key
    #[arg(short = 'D', long = "define", global = true, value_parser = parse_key_val)]
    define: Vec<(String, String)>,

    /// Also read fallback properties from environment variables with this prefix
    #[arg(long, global = true, conflicts_with = "env")]
    env_prefix: Option<String>,

    /// Use the whole process environment, under its own names, as fallback
    #[arg(long, global = true)]
    env: bool,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a key and print its converted value
    Get {
        /// Key in dot notation (e.g. swarm.http.port)
        key: String,
        /// Type to convert the raw value to
        #[arg(short = 't', long = "type", value_enum, default_value_t = TargetType::String)]
        target: TargetType,
        /// Value used when no source defines the key
        #[arg(short, long)]
        default: Option<String>,
    },
    /// Report whether any source defines a key
    Has { key: String },
    /// List the keys the stage defines
    Keys {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the next key segments below a prefix
    Subkeys {
        prefix: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the stages defined in the stages file
    Stages,
    /// Print the selected stage
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TargetType {
    String,
    Bool,
    Int,
    Long,
    Float,
    Double,
    Url,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// Parse "key=value" CLI arguments.
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

impl Cli {
    pub fn run(self) -> stagecfg_core::Result<()> {
        self.init_logging();

        let loader = StageLoader::load(self.file.as_deref())?;
        let output = self.execute(&loader)?;
        if !output.is_empty() {
            println!("{output}");
        }
        Ok(())
    }

    /// Run the subcommand against `loader` and return what it prints.
    pub fn execute(&self, loader: &StageLoader) -> stagecfg_core::Result<String> {
        if let Commands::Stages = self.command {
            return Ok(loader.stage_names().join("\n"));
        }

        let stage_name = StageLoader::resolve_stage_name(self.stage.as_deref());
        let stage = loader.stage(&stage_name)?;
        debug!(stage = %stage_name, keys = stage.len(), "selected stage");
        let config = StageConfig::with_fallback(stage, self.fallback_properties());

        match &self.command {
            Commands::Get {
                key,
                target,
                default,
            } => Self::cmd_get(&config, key, *target, default.as_deref()),
            Commands::Has { key } => Ok(config.resolve(key.as_str()).has_value().to_string()),
            Commands::Keys { json } => Self::print_set(config.keys(), *json),
            Commands::Subkeys { prefix, json } => {
                Self::print_set(config.simple_subkeys(prefix), *json)
            }
            Commands::Show { json } => Self::cmd_show(&config, *json),
            Commands::Stages => Ok(loader.stage_names().join("\n")),
        }
    }

    /// Fallback properties: environment (whole or prefixed), then `-D`
    /// pairs on top.
    fn fallback_properties(&self) -> Properties {
        let mut props = match &self.env_prefix {
            Some(prefix) => EnvProperties::with_prefix(prefix).into_properties(),
            None if self.env => EnvProperties::capture().into_properties(),
            None => Properties::new(),
        };
        props.extend(self.define.iter().cloned());
        props
    }

    fn init_logging(&self) {
        // Resolve log level: --verbose > --quiet > --log-level > warn
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or("warn")
        };

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

        let result = match self.log_format {
            LogFormat::Json => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .with_target(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .try_init(),
        };
        if let Err(e) = result {
            eprintln!("logging already initialized: {e}");
        }
    }

    fn cmd_get(
        config: &StageConfig,
        key: &str,
        target: TargetType,
        default: Option<&str>,
    ) -> stagecfg_core::Result<String> {
        let resolver = config.resolve(key);
        let resolver = match default {
            Some(raw) => resolver.with_raw_default(raw),
            None => resolver,
        };
        let value = match target {
            TargetType::String => resolver.value()?,
            TargetType::Bool => resolver.as_type::<bool>().value()?.to_string(),
            TargetType::Int => resolver.as_type::<i32>().value()?.to_string(),
            TargetType::Long => resolver.as_type::<i64>().value()?.to_string(),
            TargetType::Float => resolver.as_type::<f32>().value()?.to_string(),
            TargetType::Double => resolver.as_type::<f64>().value()?.to_string(),
            TargetType::Url => resolver.as_type::<Url>().value()?.to_string(),
        };
        Ok(value)
    }

    fn cmd_show(config: &StageConfig, json: bool) -> stagecfg_core::Result<String> {
        if json {
            return Ok(serde_json::to_string_pretty(config.stage())?);
        }
        toml::to_string_pretty(config.stage().properties())
            .map_err(|e| StageError::Config(e.to_string()))
    }

    fn print_set(
        items: std::collections::BTreeSet<String>,
        json: bool,
    ) -> stagecfg_core::Result<String> {
        if json {
            return Ok(serde_json::to_string(&items)?);
        }
        Ok(items.into_iter().collect::<Vec<_>>().join("\n"))
    }
}
