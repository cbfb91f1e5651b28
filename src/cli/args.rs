//! CLI argument definitions (spec §4.8): a `clap` derive-subcommand
//! structure with exactly the operational subcommands this crate exposes.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codeindex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A code indexing and retrieval engine exposing a project's source tree as queryable structured data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        #[arg(short, long)]
        force: bool,
    },

    /// Build the deep and shallow indexes for a project path
    Index {
        /// Path to the project to index
        #[arg(long)]
        path: PathBuf,

        /// Extra directory basenames to exclude, comma-separated
        #[arg(long, value_delimiter = ',')]
        additional_excludes: Vec<String>,
    },

    /// Invoke a named operation and print its JSON result
    Call {
        /// find_files, get_file_summary, get_index_stats, get_file_list, or search
        tool: String,

        #[arg(long)]
        path: PathBuf,

        /// Operation parameters as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
}
