use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect and modify a onefilefs image
#[derive(Parser)]
pub struct Cli {
    /// Image file holding the filesystem
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the root directory
    Ls,
    /// Show the metadata of a file
    Stat { name: String },
    /// Print a file
    Cat { name: String },
    /// Write TEXT into a file
    Write {
        name: String,

        #[arg(long, short, default_value_t = 0)]
        offset: usize,

        text: String,
    },
}
