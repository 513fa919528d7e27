//! CLI module for Reelcrew.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{Output, TranscriptPrinter};

use clap::{Parser, Subcommand};

/// Reelcrew - a four-agent crew that turns a topic into a short captioned video
///
/// A script writer, voice actor, graphic designer and director take turns
/// against a local chat model. Run without a command to start chatting.
#[derive(Parser, Debug)]
#[command(name = "reelcrew")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Chat model to use (overrides config and REELCREW_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Maximum turns per run
    #[arg(long, global = true)]
    pub max_turns: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (default)
    Chat,

    /// Run the crew once on a topic and exit
    Once {
        /// The topic or task for the crew
        task: String,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
