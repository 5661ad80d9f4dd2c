use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contactsheet")]
#[command(author, version, about = "Digital contact sheet for photo portfolios")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the configured photos and print each frame's metadata summary
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract and display the metadata of a single image
    Inspect {
        /// Image file or URL to inspect
        #[arg(required = true)]
        file: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scroll a simulated viewport over the grid and play the highlighter marks
    Simulate {
        /// Write each drawn overlay as an SVG file into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Seed for a reproducible selection and mark sequence
        #[arg(long)]
        seed: Option<u64>,

        /// Scroll step in pixels (defaults to half the viewport height)
        #[arg(long)]
        step: Option<f64>,

        /// Skip the settle and draw delays
        #[arg(long)]
        no_delay: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config or defaults if not specified)
        #[arg(value_name = "CONFIG")]
        path: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
