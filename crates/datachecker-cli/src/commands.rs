use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "datachecker",
    version,
    about = "Scan a directory tree for wasted space, data-quality and security issues"
)]
pub struct Cli {
    /// Directory to scan; defaults to INPUT_FOLDER from config.json
    pub directory: Option<PathBuf>,

    /// Run a single check by name (disables the stat cache for the run)
    #[arg(long, value_name = "NAME")]
    pub check: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default config.json into the current directory
    Config,
}
