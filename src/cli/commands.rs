//! CLI command implementations

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::inspector::{DefaultMapper, InspectServer, InspectorConfig, PageView};
use crate::observability::{Logger, Severity};
use crate::storage::LogStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_json_to};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            data_dir,
            config,
            port,
            prefix,
        } => serve(&data_dir, config.as_deref(), port, prefix.as_deref()),
        Command::Put {
            data_dir,
            key,
            value,
        } => {
            quiet_stdout();
            put(&data_dir, &key, &value)
        }
        Command::Scan { data_dir, prefix } => {
            quiet_stdout();
            scan(&data_dir, &prefix)
        }
    }
}

/// Commands whose stdout is JSON data keep INFO lines off it
fn quiet_stdout() {
    if Logger::min_severity() < Severity::Warn {
        Logger::set_min_severity(Severity::Warn);
    }
}

/// Resolve the inspector configuration from an optional file and overrides
fn load_config(config_path: Option<&Path>, port: Option<u16>) -> CliResult<InspectorConfig> {
    let mut config = match config_path {
        Some(path) => InspectorConfig::load(path)?,
        None => InspectorConfig::default(),
    };
    if let Some(port) = port {
        config.port = port;
    }
    config.validate()?;
    Ok(config)
}

/// Serve the inspection page for the store in `data_dir` until resumed
pub fn serve(
    data_dir: &Path,
    config_path: Option<&Path>,
    port: Option<u16>,
    prefix: Option<&str>,
) -> CliResult<()> {
    let config = load_config(config_path, port)?;
    Logger::set_min_severity(config.severity());

    let store = LogStore::open(data_dir)?;
    let server = InspectServer::start(Arc::new(store), config, None)?;
    server.wait(prefix.unwrap_or_default());
    server.shutdown();

    Ok(())
}

/// Durably write one record
pub fn put(data_dir: &Path, key: &str, value: &str) -> CliResult<()> {
    if key.is_empty() {
        return Err(CliError::store_error("Key must not be empty"));
    }

    let store = LogStore::open(data_dir)?;
    store.put(key, value.as_bytes())?;

    write_json(&json!({ "status": "ok", "key": key }))
}

/// Print the mapped records under `prefix`, one JSON object per line
pub fn scan(data_dir: &Path, prefix: &str) -> CliResult<()> {
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    scan_to(&mut stdout, data_dir, prefix)?;
    stdout.flush()?;
    Ok(())
}

fn scan_to<W: Write>(out: &mut W, data_dir: &Path, prefix: &str) -> CliResult<usize> {
    let store = LogStore::open(data_dir)?;
    let page = PageView::scan(&store, prefix, &DefaultMapper::new());

    for record in &page.items {
        write_json_to(out, record)?;
    }
    Ok(page.items.len())
}
