//! Root CLI structure for warcraft-mdx

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "warcraft-mdx")]
#[command(about = "Command-line tools for Warcraft III MDX models", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about an MDX model
    Info {
        /// Path to the MDX file
        file: PathBuf,

        /// Also list nodes and material layers
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the chunk layout and node hierarchy as a tree
    Tree {
        /// Path to the MDX file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show metadata inline
        #[arg(long)]
        compact: bool,
    },

    /// Evaluate the skeleton at one point in time
    Sample {
        /// Path to the MDX file
        file: PathBuf,

        /// Sequence name or index
        #[arg(short, long)]
        sequence: Option<String>,

        /// Frame in milliseconds, clamped into the sequence
        #[arg(short, long, default_value_t = 0)]
        frame: i64,

        /// Global sequence counter in milliseconds
        #[arg(short, long, default_value_t = 0)]
        counter: u32,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
