//! CLI command implementations
//!
//! Every command loads the config, applies its log level and opens the file
//! store before doing anything else. Results and rejections are written to
//! stdout as one JSON object; a rejection also exits non-zero.

use std::path::Path;

use serde_json::{json, Value};

use crate::identity::CallerGroup;
use crate::observability::Logger;
use crate::operations::Registry;
use crate::storage::FileStore;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Invoke {
            config,
            group,
            operation,
        } => invoke(&config, group.as_deref(), &operation),
        Command::Schema { config, tag } => schema(&config, tag.as_deref()),
    }
}

/// Creates the data directory and installs configured asset types
pub fn init(config_path: &Path) -> CliResult<()> {
    respond(execute_init(config_path))
}

/// Runs one operation with arguments from stdin
pub fn invoke(config_path: &Path, group: Option<&str>, operation: &str) -> CliResult<()> {
    let outcome = read_request().and_then(|args| execute(config_path, group, operation, &args));
    respond(outcome)
}

/// Prints the catalog summary, or one definition when `tag` is given
pub fn schema(config_path: &Path, tag: Option<&str>) -> CliResult<()> {
    let args = match tag {
        Some(tag) => json!({ "assetType": tag }),
        None => Value::Null,
    };
    respond(execute(config_path, None, "getSchema", &args))
}

fn respond(outcome: CliResult<Value>) -> CliResult<()> {
    match outcome {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn open_registry(config_path: &Path) -> CliResult<(Config, Registry)> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity());

    let store = FileStore::open(config.data_path()).map_err(|e| CliError::store_unavailable(&e))?;
    Ok((config, Registry::new(store)))
}

pub(crate) fn execute_init(config_path: &Path) -> CliResult<Value> {
    let (config, registry) = open_registry(config_path)?;
    registry.sync_builtin_types(&config.asset_types)?;

    Ok(json!({
        "initialized": true,
        "data_dir": config.data_dir,
        "asset_types": config.asset_types.len(),
    }))
}

pub(crate) fn execute(
    config_path: &Path,
    group: Option<&str>,
    operation: &str,
    args: &Value,
) -> CliResult<Value> {
    let (config, registry) = open_registry(config_path)?;
    let identity = CallerGroup::new(group.unwrap_or(config.caller_group.as_str()));
    Ok(registry.invoke_by_name(operation, args, &identity)?)
}
