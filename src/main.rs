use std::{path::PathBuf, process::ExitCode};

use bitpunker::{
    config::{Mode, ProcessConfig},
    dithering::{
        DitheringType,
        threshold::{blue_noise::DEFAULT_SIGMA, store::MapStore},
    },
    error::{DitherError, Result},
    run_file,
    utils::image::{self as image_utils, Channel},
};
use clap::Parser;

/// Turn an image into black and white pixels
#[derive(Parser)]
#[command(name = "bitpunker")]
#[command(version)]
#[command(about = "1-bit dithering with bayer, blue noise and error diffusion styles", long_about = None)]
struct Cli {
    /// Image to dither
    #[arg(required_unless_present = "list")]
    image: Option<PathBuf>,

    /// Output png, defaults to the input name followed by `dt.png`
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// bayer, bluenoise, simple, atkinson, floyd-steinberg or jjn
    #[arg(short, long, default_value = "bayer")]
    style: String,

    /// Map depth of ordered styles
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    depth: i32,

    /// Compare against the complement of the map
    #[arg(short, long)]
    invert: bool,

    /// Use 8-bit levels as brightness, without sRGB decoding
    #[arg(long)]
    no_gamma: bool,

    /// red, green, blue or all (luma)
    #[arg(short, long, default_value = "all")]
    channel: String,

    /// Generate a new blue noise map instead of loading a saved one
    #[arg(long)]
    generate: bool,

    /// Sigma of the blue noise energy function
    #[arg(short = 'p', long, default_value_t = DEFAULT_SIGMA)]
    sigma: f64,

    /// Only threshold at 127
    #[arg(long, conflicts_with = "randomize")]
    quantize: bool,

    /// Threshold every pixel at a random level
    #[arg(long)]
    randomize: bool,

    /// Seed for blue noise generation and --randomize
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of saved blue noise maps
    #[arg(long, default_value = "bnoisemaps")]
    map_dir: PathBuf,

    /// JSON config file, replaces every processing option above
    #[arg(long)]
    config: Option<PathBuf>,

    /// List the saved blue noise maps and exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn process_config(&self) -> Result<ProcessConfig> {
        if let Some(path) = &self.config {
            return ProcessConfig::read_config(path);
        }
        let mode = if self.quantize {
            Mode::Quantize
        } else if self.randomize {
            Mode::Randomize
        } else {
            Mode::Dither
        };
        Ok(ProcessConfig {
            dithering_type: DitheringType::from_style(
                &self.style,
                self.depth,
                self.sigma,
                self.generate,
            ),
            invert: self.invert,
            gamma_correct: !self.no_gamma,
            channel: self.channel.parse::<Channel>()?,
            mode,
            map_dir: self.map_dir.clone(),
            seed: self.seed,
        })
    }
}

fn list_maps(store: &MapStore) -> Result {
    let maps = store.list()?;
    if maps.is_empty() {
        println!("no blue noise maps in {}", store.dir().display());
        return Ok(());
    }
    println!("{:>5} {:>6} {:>8}", "depth", "side", "sigma");
    for map in maps {
        println!("{:>5} {:>6} {:>8}", map.depth, map.side, map.sigma);
    }
    Ok(())
}

fn execute(cli: &Cli) -> Result {
    if cli.list {
        return list_maps(&MapStore::new(&cli.map_dir));
    }
    let input = cli
        .image
        .as_ref()
        .ok_or_else(|| DitherError::configuration("no input image given"))?;

    let config = cli.process_config()?;
    log::info!("dithering {} with {}", input.display(), config.dithering_type);
    let bits = run_file(&config, input)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| image_utils::default_output_path(input));
    image_utils::save_binary(&output, &bits)?;
    log::info!("wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
