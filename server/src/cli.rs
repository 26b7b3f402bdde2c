//! Command line arguments.

use clap::{Parser, Subcommand};
use faulttree_core::config::{DEFAULT_DATA_DIR, DEFAULT_MAIN_FILE};
use faulttree_core::fetch::DEFAULT_TIMEOUT_MS;
use faulttree_core::ViewerConfig;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "faulttree")]
#[command(about = "Browse fault diagnosis trees and their repair details")]
#[command(version)]
pub struct Cli {
    /// Data directory or http(s) base URL holding main.json and detail files
    #[arg(long, short, default_value = DEFAULT_DATA_DIR)]
    pub data: String,

    /// Path of the tree document, relative to the data location
    #[arg(long, default_value = DEFAULT_MAIN_FILE)]
    pub main: String,

    /// Per-request timeout for remote data, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the tree outline
    Outline {
        /// Expand every category
        #[arg(long)]
        all: bool,
    },
    /// Resolve and print one node's note and details
    Show {
        /// Node id such as root-0-1
        id: String,
    },
    /// Print the outline filtered by a title substring
    Search { query: String },
    /// Serve the Model Context Protocol over stdio
    Serve,
}

impl Cli {
    pub fn to_config(&self) -> ViewerConfig {
        ViewerConfig::new(self.data.clone())
            .with_main_file(self.main.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}
