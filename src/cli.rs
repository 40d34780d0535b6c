use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pkgform")]
#[command(about = "Fill in and validate app package options from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the form layout comes from
#[derive(Args, Debug, Clone)]
pub struct LayoutSource {
    /// JSON layout file describing the form
    #[arg(short, long)]
    pub layout: Option<PathBuf>,

    /// Built-in layout used when no layout file is given (windows)
    #[arg(short, long, default_value = "windows")]
    pub builtin: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Edit package options interactively
    Edit {
        #[command(flatten)]
        source: LayoutSource,

        /// Write the submitted options to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the markup rendered for every field
    Render {
        #[command(flatten)]
        source: LayoutSource,
    },

    /// Apply values from a JSON file and report invalid fields
    Check {
        #[command(flatten)]
        source: LayoutSource,

        /// JSON object mapping field names to values
        #[arg(long)]
        values: PathBuf,
    },
}
