use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Tessera - Boolean search engine CLI
#[derive(Parser)]
#[command(name = "tessera", version, about)]
pub struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a binary index from a document file.
    Index(IndexArgs),
    /// Run queries against a binary index.
    Search(SearchArgs),
}

#[derive(Parser)]
pub struct IndexArgs {
    /// Input text file, one document per line.
    #[arg(long)]
    pub input: PathBuf,

    /// Output index file.
    #[arg(long)]
    pub output: PathBuf,

    /// Export build statistics to a file.
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Export the index in text format to a file.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Tokenizer configuration file (key=value lines).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Additional stop-words file, one word per line.
    #[arg(long)]
    pub stopwords: Option<PathBuf>,
}

#[derive(Parser)]
pub struct SearchArgs {
    /// Index file to load.
    #[arg(long)]
    pub index: PathBuf,

    /// Search query.
    #[arg(long, conflicts_with = "interactive")]
    pub query: Option<String>,

    /// Interactive search mode: one query per line until quit/exit/EOF.
    #[arg(long)]
    pub interactive: bool,

    /// Maximum number of results.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Export search statistics to a file.
    #[arg(long)]
    pub stats: Option<PathBuf>,
}
