//! CLI argument definitions using clap
//!
//! Commands:
//! - chatlab-inspect serve --data-dir <dir> [--config <path>] [--port <p>] [--prefix <p>]
//! - chatlab-inspect put --data-dir <dir> --key <k> --value <v>
//! - chatlab-inspect scan --data-dir <dir> [--prefix <p>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// chatlab-inspect - Pause, browse and resume test workloads
#[derive(Parser, Debug)]
#[command(name = "chatlab-inspect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the inspection page for a store until resumed
    Serve {
        /// Store directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Path to a JSON inspector configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to bind to, overriding the configuration
        #[arg(long)]
        port: Option<u16>,

        /// Prefix shown in the printed URL
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Write a single record to a store
    Put {
        /// Store directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Record key
        #[arg(long)]
        key: String,

        /// Record value
        #[arg(long)]
        value: String,
    },

    /// Print the mapped records under a prefix as JSON lines
    Scan {
        /// Store directory
        #[arg(long)]
        data_dir: PathBuf,

        /// Key prefix (default: every key)
        #[arg(long, default_value = "")]
        prefix: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from([
            "chatlab-inspect",
            "serve",
            "--data-dir",
            "/tmp/lab",
            "--port",
            "0",
        ])
        .unwrap();
        match cli.command {
            Command::Serve {
                data_dir,
                config,
                port,
                prefix,
            } => {
                assert_eq!(data_dir, PathBuf::from("/tmp/lab"));
                assert!(config.is_none());
                assert_eq!(port, Some(0));
                assert!(prefix.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_scan_prefix_defaults_to_empty() {
        let cli = Cli::try_parse_from(["chatlab-inspect", "scan", "--data-dir", "d"]).unwrap();
        assert!(matches!(cli.command, Command::Scan { prefix, .. } if prefix.is_empty()));
    }

    #[test]
    fn test_put_requires_value() {
        let result = Cli::try_parse_from(["chatlab-inspect", "put", "--data-dir", "d", "--key", "k"]);
        assert!(result.is_err());
    }
}
