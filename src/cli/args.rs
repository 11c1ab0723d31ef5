//! CLI argument definitions using clap
//!
//! Commands:
//! - assetreg init --config <path>
//! - assetreg invoke --config <path> [--group <group>] <operation>
//! - assetreg schema --config <path> [--tag <tag>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// assetreg - dynamic asset-type registry for key-value ledgers
#[derive(Parser, Debug)]
#[command(name = "assetreg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and install configured asset types
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./assetreg.json")]
        config: PathBuf,
    },

    /// Run one operation with a JSON argument object read from stdin
    Invoke {
        /// Path to configuration file
        #[arg(long, default_value = "./assetreg.json")]
        config: PathBuf,

        /// Caller group; defaults to the configured one
        #[arg(long)]
        group: Option<String>,

        /// Operation tag, e.g. putAsset
        operation: String,
    },

    /// Print the catalog summary or one asset type definition
    Schema {
        /// Path to configuration file
        #[arg(long, default_value = "./assetreg.json")]
        config: PathBuf,

        /// Asset type tag
        #[arg(long)]
        tag: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
