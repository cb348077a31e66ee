//! CLI module for chatlab-inspect
//!
//! Provides command-line interface for:
//! - serve: Open a store, start the inspector, wait for resume
//! - put: Append one record to a store
//! - scan: Print mapped records as JSON lines

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{put, run, run_command, scan, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_json;
