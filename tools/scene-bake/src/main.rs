//! scene-bake - scene to model baker
//!
//! Converts parsed scene dumps into engine-ready models (.sbmodel)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scene_bake::{export, ImportSettings, ModelImporter, OutputFormat};

#[derive(Parser)]
#[command(name = "scene-bake")]
#[command(about = "Bake parsed scenes into engine-ready models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a scene and write a model file
    Import {
        /// Input scene (extension is probed if the path does not exist)
        input: PathBuf,

        /// Output model file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Import settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Animation samples per second (overrides settings)
        #[arg(short, long)]
        frame_rate: Option<f64>,

        /// Bake global node transforms into mesh vertices
        #[arg(long)]
        bake_global: bool,

        /// Write JSON instead of the binary container
        #[arg(long)]
        json: bool,
    },

    /// List animation stacks in a scene
    Stacks {
        /// Input scene
        input: PathBuf,

        /// Import settings (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a summary of a model file
    Info {
        /// Model file (.sbmodel)
        model: PathBuf,
    },
}

fn load_settings(config: Option<&PathBuf>) -> Result<ImportSettings> {
    match config {
        Some(path) => ImportSettings::load(path),
        None => Ok(ImportSettings::default()),
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
        Commands::Import {
            input,
            output,
            config,
            frame_rate,
            bake_global,
            json,
        } => {
            let mut settings = load_settings(config.as_ref())?;
            if let Some(rate) = frame_rate {
                if !(rate.is_finite() && rate > 0.0) {
                    anyhow::bail!("Frame rate must be positive, got {}", rate);
                }
                settings.frame_rate = rate;
                settings.sample_step = None;
            }
            settings.bake_global_transform |= bake_global;

            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Binary
            };
            let output = output.unwrap_or_else(|| input.with_extension(format.extension()));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let importer = ModelImporter::new(settings);
            export::export_model(&importer, &input, &output, format)?;
            tracing::info!("Done!");
        }

        Commands::Stacks { input, config } => {
            let importer = ModelImporter::new(load_settings(config.as_ref())?);
            export::list_stacks(&importer, &input)?;
        }

        Commands::Info { model } => {
            export::describe_model(&model)?;
        }
    }

    Ok(())
}
