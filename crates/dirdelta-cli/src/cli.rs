use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dirdelta",
    about = "Compare two directory trees and report per-file differences",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two directories
    Compare(CompareArgs),
    /// Compare every directory pair listed in a CSV job file
    Batch(BatchArgs),
}

#[derive(Args)]
pub struct CompareArgs {
    pub dir1: PathBuf,
    pub dir2: PathBuf,
    #[command(flatten)]
    pub options: CompareOptions,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Job list with `dir1,dir2[,name]` rows after a header row
    pub jobs: PathBuf,
    #[command(flatten)]
    pub options: CompareOptions,
}

#[derive(Args, Debug, Default)]
pub struct CompareOptions {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Unchanged lines shown around each change
    #[arg(short = 'U', long)]
    pub context: Option<usize>,
    /// Extension compared by content hash only (repeatable)
    #[arg(long = "hash-ext", value_name = "EXT")]
    pub hash_exts: Vec<String>,
    /// Two-column tag table (`tag,path_fragment`)
    #[arg(long, value_name = "FILE")]
    pub tags: Option<PathBuf>,
    /// Per-file time limit in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
    /// Do not follow symbolic links
    #[arg(long)]
    pub no_follow_links: bool,
}
