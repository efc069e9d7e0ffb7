//! Command line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate G-code for a dado job
    Generate {
        /// Job file (.toml or .json); defaults to the reference job
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write G-code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a JSON operation tree to G-code
    Compile {
        /// Program file
        program: PathBuf,

        /// Write G-code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the reference job to a file for editing
    InitConfig {
        /// Destination (.toml or .json)
        path: PathBuf,
    },
}
