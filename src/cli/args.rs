//! Command line argument parsing for the Lancet CLI using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lancet - an on-disk boolean full-text search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "lancet")]
#[command(about = "Index a directory of text files and run boolean queries over it")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LancetArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LancetArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the index over a directory of text files
    Index(IndexArgs),

    /// Run a boolean query against a built index
    Search(SearchArgs),
}

/// Arguments for building an index
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Root directory of the document corpus
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Directory holding the index store files
    #[arg(short = 'd', long, value_name = "DIR", default_value = "index")]
    pub index_dir: PathBuf,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query string; read from standard input when omitted
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Directory holding the index store files
    #[arg(short = 'd', long, value_name = "DIR", default_value = "index")]
    pub index_dir: PathBuf,

    /// Number of results to return
    #[arg(short = 'k', long = "top", value_name = "K", default_value = "1")]
    pub top: usize,
}
