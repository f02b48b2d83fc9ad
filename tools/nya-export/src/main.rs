//! nya-export - nya asset inspection and conversion tool
//!
//! Reads .nms / .nan files written by the exporter plugins.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use nya_export::{inspect, ExportConfig};

#[derive(Parser)]
#[command(name = "nya-export")]
#[command(about = "nya asset inspection and conversion tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a mesh or animation file
    Inspect {
        /// Input .nms or .nan file
        input: PathBuf,
    },

    /// Re-encode a mesh or animation file with the configured layout
    Convert {
        /// Input .nms or .nan file
        input: PathBuf,

        /// Output file (default: overwrite input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export config (nya-export.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate an export config file
    CheckConfig {
        /// Path to nya-export.toml
        #[arg(default_value = "nya-export.toml")]
        config: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<ExportConfig> {
    match path {
        Some(path) => ExportConfig::load(path)
            .with_context(|| format!("Failed to load config {:?}", path)),
        None => Ok(ExportConfig::default()),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input } => {
            inspect::inspect(&input).with_context(|| format!("Failed to inspect {:?}", input))?;
        }

        Commands::Convert {
            input,
            output,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let output = output.unwrap_or_else(|| input.clone());
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let kind = inspect::convert(&input, &output, &config)
                .with_context(|| format!("Failed to convert {:?}", input))?;
            tracing::info!("Done! ({:?})", kind);
        }

        Commands::CheckConfig { config } => {
            tracing::info!("Checking config {:?}", config);
            let parsed = load_config(Some(&config))?;
            tracing::info!(
                "Config is valid: mesh v{}, pack_second_uv_channel={}, animation layout {:?}",
                parsed.mesh.container_version,
                parsed.mesh.pack_second_uv_channel,
                parsed.animation.layout
            );
        }
    }

    Ok(())
}
