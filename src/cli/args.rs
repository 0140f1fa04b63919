//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Question answering over your PDF documents
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version = env!("CARGO_PKG_VERSION"),
    about = "Question answering over your PDF documents",
    long_about = "Index PDF and text documents into a local vector store, then answer questions with a hosted LLM using the most relevant passages.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the vector store (overrides config)
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .pdfqa directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Index documents, replacing the current store contents
    #[command(about = "Build the vector store from PDFs, text and markdown files")]
    Index {
        /// Files or directories to index (multiple paths allowed)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Chunk size in characters (overrides config)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Chunk overlap in characters (overrides config)
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Disable progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Answer questions using the indexed documents
    #[command(
        about = "Answer questions from the indexed documents",
        after_help = "Questions come from -q flags, --file, or stdin (one per line)."
    )]
    Ask {
        /// Question to ask (repeatable)
        #[arg(short = 'q', long = "question", value_name = "QUESTION")]
        questions: Vec<String>,

        /// Read newline-separated questions from a file
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Chunks retrieved per question (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Questions answered concurrently (overrides config)
        #[arg(short, long)]
        parallel: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the chunks most similar to a query, without calling the LLM
    #[command(about = "Retrieve the most similar chunks for a query")]
    Search {
        /// Search query
        query: String,

        /// Number of chunks to return (overrides config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the live snapshot manifest
    #[command(about = "Show what is currently indexed")]
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration
    #[command(about = "Display active settings")]
    Config,
}
