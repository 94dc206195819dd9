//! # stagecfg-core
//!
//! Shared vocabulary for stagecfg: stages, read-only property sources, the
//! closed set of value kinds, and the error type used by every other crate
//! in the workspace.

pub mod error;
pub mod source;
pub mod stage;
pub mod types;

pub use error::{BoxError, ConversionError, Result, StageError};
pub use source::{EnvProperties, Properties, PropertySource};
pub use stage::Stage;
pub use types::*;
