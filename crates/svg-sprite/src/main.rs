//! svg-sprite CLI - build SVG icons into sprite-backed modules.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod builder;
mod commands;
mod config;
mod sheet;
mod watcher;

#[derive(Parser)]
#[command(name = "svg-sprite")]
#[command(about = "Build SVG icons into sprite-backed framework modules")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sprite.toml config file
    #[arg(short, long, default_value = "sprite.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sprite.toml and an example icon
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate icon modules, runtime files, and the sprite sheet
    Build {
        /// Output directory (defaults to config or "dist/icons")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Component flavour: vanilla, react, preact, or vue
        #[arg(short, long)]
        export_type: Option<String>,
    },

    /// Print the module generated for a single SVG file
    Transform {
        /// SVG file to transform
        file: PathBuf,

        /// Print the module descriptor as JSON instead of code
        #[arg(long)]
        json: bool,
    },

    /// Build, then rebuild changed icons until interrupted
    Watch {
        /// Output directory (defaults to config or "dist/icons")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build {
            output,
            export_type,
        } => {
            commands::build::run(&cli.config, output, export_type).await?;
        }
        Commands::Transform { file, json } => {
            commands::transform::run(&cli.config, &file, json).await?;
        }
        Commands::Watch { output } => {
            commands::watch::run(&cli.config, output).await?;
        }
    }

    Ok(())
}
