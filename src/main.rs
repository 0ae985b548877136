//! Gapa CLI - Dump and pack Super Mario Galaxy particle data.
//!
//! This is the main entry point for the Gapa command-line application.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gapa::prelude::*;

/// Gapa - Super Mario Galaxy particle data tool
#[derive(Parser)]
#[command(name = "gapa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-particle progress
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert binary particle files into editable JSON and textures
    Dump {
        /// Directory holding Particles.jpc and the .bcsv tables
        #[arg(env = "GAPA_INPUT")]
        input: PathBuf,

        /// Output directory for the dump
        #[arg(env = "GAPA_OUTPUT")]
        output: PathBuf,
    },

    /// Convert a dump back into binary particle files
    Pack {
        /// Directory holding a dump
        #[arg(env = "GAPA_INPUT")]
        input: PathBuf,

        /// Output directory for the binary files
        #[arg(env = "GAPA_OUTPUT")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let layout = Layout::default();

    match cli.command {
        Commands::Dump { input, output } => cmd_dump(&input, &output, &layout)?,
        Commands::Pack { input, output } => cmd_pack(&input, &output, &layout)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_dump(input: &Path, output: &Path, layout: &Layout) -> Result<()> {
    info!("Dumping: {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let pb = spinner()?;

    pb.set_message("Reading binary files");
    let data = ParticleData::from_binary_dir(input, layout).context("Failed to read particle data")?;

    pb.set_message("Encoding JSON");
    let files = data.to_text().context("Failed to convert particle data")?;

    pb.set_message("Writing dump");
    files.write(output, layout).context("Failed to write dump")?;

    pb.finish_and_clear();
    info!(
        "Dumped {} particles, {} textures and {} effects in {:?}",
        files.particles.len(),
        files.textures.len(),
        data.effects.len(),
        start.elapsed()
    );

    Ok(())
}

fn cmd_pack(input: &Path, output: &Path, layout: &Layout) -> Result<()> {
    info!("Packing: {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let pb = spinner()?;

    pb.set_message("Reading dump");
    let data = ParticleData::from_text_dir(input, layout).context("Failed to read dump")?;

    pb.set_message("Encoding binary files");
    let files = data.to_binary().context("Failed to convert particle data")?;

    pb.set_message("Writing binary files");
    files.write(output, layout).context("Failed to write binary files")?;

    pb.finish_and_clear();
    info!(
        "Packed {} particles, {} textures and {} effects in {:?}",
        data.container.particle_names().len(),
        data.container.textures().len(),
        data.effects.len(),
        start.elapsed()
    );

    Ok(())
}

fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
