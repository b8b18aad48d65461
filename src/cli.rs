//! Command-line interface definition for Debate Arena
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive arena and a one-shot debate command.

use clap::{Parser, Subcommand};

/// Debate Arena - watch historical figures argue your topic
///
/// Enter a topic and the moderator stages a debate between two real
/// people with opposing views, streamed live from Gemini.
#[derive(Parser, Debug, Clone)]
#[command(name = "debate-arena")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Debate Arena
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive debate arena
    Chat {
        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Stage a single debate on a topic and exit
    Ask {
        /// Debate topic, e.g. "Democracy vs Monarchy"
        topic: String,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            command: Commands::Chat { model: None },
        }
    }
}
