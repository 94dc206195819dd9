//! # stagecfg-cli
//!
//! Command-line interface for stagecfg.
//!
//! ## Commands
//!
//! - `stagecfg get <key> [--type T] [--default V]` — Resolve and convert a value
//! - `stagecfg has <key>` — Whether any source defines a key
//! - `stagecfg keys` — Keys defined by the selected stage
//! - `stagecfg subkeys <prefix>` — Next key segments below a prefix
//! - `stagecfg stages` — Stages defined in the stages file
//! - `stagecfg show` — Print the selected stage

pub mod commands;

pub use commands::Cli;
