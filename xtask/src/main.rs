use std::path::PathBuf;

use anyhow::{Context, Result};
use bitpunker::dithering::threshold::{
    blue_noise::{DEFAULT_SIGMA, MAX_DEPTH},
    store::{DEFAULT_MAP_DIR, MapStore},
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for bitpunker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-generate blue noise maps so dithering can load them
    GenerateMaps {
        /// Depths to generate, all of them when empty
        #[arg(short, long)]
        depth: Vec<i32>,

        #[arg(short = 'p', long, default_value_t = DEFAULT_SIGMA)]
        sigma: f64,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value = DEFAULT_MAP_DIR)]
        dir: PathBuf,
    },
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match cli.command {
        Commands::GenerateMaps {
            depth,
            sigma,
            seed,
            dir,
        } => generate_maps(depth, sigma, seed, dir),
        Commands::Ci => ci(),
    }
}

/// Maps are generated with a fixed seed so a checkout always ships the
/// same thresholds.
fn generate_maps(depths: Vec<i32>, sigma: f64, seed: u64, dir: PathBuf) -> Result<()> {
    let depths = if depths.is_empty() {
        (0..=MAX_DEPTH).collect()
    } else {
        depths
    };
    let store = MapStore::new(&dir).with_seed(Some(seed));
    for depth in depths {
        store
            .blue_noise(depth, sigma, true)
            .with_context(|| format!("generating depth {} map", depth))?;
    }
    log::info!("maps written to {}", dir.display());
    Ok(())
}

/// Checks to run before pushing
fn ci() -> Result<()> {
    run_command("cargo", &["fmt", "--all", "--check"])?;
    run_command(
        "cargo",
        &[
            "clippy",
            "--all-targets",
            "--all-features",
            "--",
            "-D",
            "warnings",
            "-A",
            "clippy::needless_range_loop",
        ],
    )?;
    run_command("cargo", &["build", "--all-features"])?;
    run_command("cargo", &["test", "--all-features"])?;
    Ok(())
}

fn run_command(cmd: &str, args: &[&str]) -> Result<()> {
    use std::process::Command;
    let status = Command::new(cmd).args(args).status()?;
    if !status.success() {
        anyhow::bail!("Command failed: {} {}", cmd, args.join(" "));
    }
    Ok(())
}
