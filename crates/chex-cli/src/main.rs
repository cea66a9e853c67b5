//! chex binary entrypoint.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;

use chex_cli::commands;

#[derive(Parser)]
#[command(name = "chex")]
#[command(about = "Build tool for browser extensions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the extension into its dist directory
    Build {
        /// Extension root directory
        #[arg(long, default_value = ".")]
        root: String,

        /// Configuration file (default: <root>/chex.json)
        #[arg(long)]
        config: Option<String>,
    },

    /// Rebuild whenever sources change
    Watch {
        /// Extension root directory
        #[arg(long, default_value = ".")]
        root: String,

        /// Configuration file (default: <root>/chex.json)
        #[arg(long)]
        config: Option<String>,
    },

    /// Validate the configuration and the built output
    Validate {
        /// Extension root directory
        #[arg(long, default_value = ".")]
        root: String,

        /// Output directory to check (default: <root>/dist)
        #[arg(long)]
        dist: Option<String>,
    },

    /// Rasterize the icon SVG into PNG files
    Icons {
        /// Extension root directory
        #[arg(long, default_value = ".")]
        root: String,

        /// Source SVG (default: <root>/icons/icon.svg)
        #[arg(long)]
        svg: Option<String>,

        /// Output directory (default: the SVG's directory)
        #[arg(long)]
        out: Option<String>,

        /// Pixel sizes to generate (default: 16,48,128)
        #[arg(long, value_delimiter = ',')]
        sizes: Vec<u32>,
    },

    /// Copy package versions into extension manifests
    SyncManifest {
        /// Repository root containing extensions/
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// Check that required external tools are installed
    Doctor,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { root, config } => commands::build::run(&root, config.as_deref()),
        Commands::Watch { root, config } => commands::watch::run(&root, config.as_deref()),
        Commands::Validate { root, dist } => commands::validate::run(&root, dist.as_deref()),
        Commands::Icons {
            root,
            svg,
            out,
            sizes,
        } => commands::icons::run(&root, svg.as_deref(), out.as_deref(), &sizes),
        Commands::SyncManifest { root } => commands::sync_manifest::run(&root),
        Commands::Doctor => commands::doctor::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            ExitCode::from(1)
        }
    }
}
