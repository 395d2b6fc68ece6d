//! limlib - dimension effect registries and document tooling
//!
//! Validates effects documents, resolves effect packs and lists the
//! registered variants of each effect family.

mod commands;
mod config;
mod effect_packs;

use std::{io, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{LimlibConfig, DEFAULT_CONFIG_PATH};
use limlib_effects::EffectRegistries;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dimension effects tooling for limlib", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the effect packs directory from the configuration
    #[arg(long)]
    packs_dir: Option<PathBuf>,

    /// Fail on the first invalid pack or document
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode effects documents and print their canonical form
    Validate {
        /// Documents to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Load all enabled effect packs and print the effects per dimension
    Packs,
    /// Print the effects a dimension gets when it declares none
    Defaults,
    /// List registered variants and presets per family
    Variants,
    /// Write a default configuration file to the --config path
    InitConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = LimlibConfig::load_from_path(&cli.config);
    if let Some(packs_dir) = cli.packs_dir {
        config.packs_dir = packs_dir;
    }
    config.strict |= cli.strict;

    info!("Starting limlib v{}", env!("CARGO_PKG_VERSION"));
    let registries =
        EffectRegistries::builtin().context("Failed to bootstrap effect registries")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Validate { files } => {
            let summary = commands::validate(&registries, &config, &files, &mut out)?;
            if summary.invalid > 0 {
                bail!("{} of {} document(s) are invalid", summary.invalid, files.len());
            }
        }
        Command::Packs => commands::packs(&registries, &config, &mut out)?,
        Command::Defaults => commands::defaults(&registries, &config, &mut out)?,
        Command::Variants => commands::variants(&registries, &mut out)?,
        Command::InitConfig => commands::init_config(&cli.config, &mut out)?,
    }
    Ok(())
}
