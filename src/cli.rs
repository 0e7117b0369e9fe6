//! CLI interface for the exam generator

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exam-generator")]
#[command(about = "Generate exam questions from PDF, Word and PowerPoint documents")]
#[command(long_about = "Extract text from uploaded documents (with OCR for images embedded in PDFs), split it into sentences and turn each sentence into a multiple-choice, short-answer or true/false question")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output (also off when stdout is not a terminal)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate questions from a local file
    Generate {
        /// Path to a PDF, Word or PowerPoint file
        file: PathBuf,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        format: String,

        /// Seed for reproducible question selection
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}
