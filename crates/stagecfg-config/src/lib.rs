//! # stagecfg-config
//!
//! Stage-scoped configuration resolution. A [`StageConfig`] looks keys up in
//! its stage first, then in an injected fallback property source, then in the
//! resolver's default, and converts the raw string to the requested type.
//!
//! Stages are read from a TOML stages file by [`StageLoader`].

pub mod config;
pub mod loader;
pub mod resolver;
pub mod value;

pub use config::StageConfig;
pub use loader::StageLoader;
pub use resolver::Resolver;
pub use value::{Fallback, StageValue};
