//! CLI module
//!
//! - init: create the data directory and install configured asset types
//! - invoke: run one registry operation with JSON arguments from stdin
//! - schema: print the catalog

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, invoke, run, run_command, schema};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
