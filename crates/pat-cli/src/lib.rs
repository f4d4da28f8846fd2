//! Command-line entry point for pat-helper.
//!
//! Parses the mode, permission flags and environment settings into an
//! immutable [`PatConfig`], optionally waits for the LDAP credential to become
//! valid, issues or revokes one Stash token, and publishes the result as
//! GitHub Actions outputs.

pub mod bootstrap_helpers;
pub mod cli_args;
pub mod config;
pub mod outputs;
pub mod runner;

pub use bootstrap_helpers::init_tracing;
pub use cli_args::{Cli, CliMode};
pub use config::{ConfigError, PatAction, PatConfig};
pub use outputs::{publish_outputs, url_encode, OutputTargets};
pub use runner::{execute, run, RunError};
