//! Command-line front end for CodeSync
//!
//! Exports a script component for the editor, imports an edited file back,
//! and inspects or clears the shared work directory without a running host.

pub mod commands;

pub use commands::{build_cli, config_from_matches, parse_command, Cli, CliCommand};
