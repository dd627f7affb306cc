use std::path::Path;

use image::DynamicImage;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{Mode, ProcessConfig},
    dithering::Ditherer,
    error::Result,
    texture::BinaryField,
};

pub mod config;
pub mod dithering;
pub mod error;
pub mod texture;
pub mod transform;
pub mod utils;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::config::{Mode, ProcessConfig};
    pub use crate::dithering::{
        Ditherer, DitheringType, Styler,
        error_diffusion::ErrorDiffusionType,
        threshold::{ThresholdMap, store::MapStore},
    };
    pub use crate::error::{DitherError, Result};
    pub use crate::texture::prelude::*;
    pub use crate::transform::prelude::*;
    pub use crate::utils::image::Channel;
}

/// Build the ditherer `config` asks for, before any image is read.
///
/// Baseline modes skip the threshold map entirely.
pub fn ditherer(config: &ProcessConfig) -> Result<Ditherer> {
    match config.mode {
        Mode::Dither => Ditherer::new(config.dithering_type, &config.map_store()),
        Mode::Quantize | Mode::Randomize => Ok(Ditherer::baseline()),
    }
}

/// Run the mode of `config` on the image bound to `ditherer`.
pub fn process(config: &ProcessConfig, ditherer: &Ditherer) -> Result<BinaryField> {
    log::info!("{} on channel {}", config.mode, config.channel);
    match config.mode {
        Mode::Dither => ditherer.dither(config.invert, config.brightness(), config.channel),
        Mode::Quantize => ditherer.quantize(config.channel),
        Mode::Randomize => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            ditherer.randomize(config.channel, &mut rng)
        }
    }
}

/// Dither `image` as described by `config`.
pub fn run(config: &ProcessConfig, image: DynamicImage) -> Result<BinaryField> {
    let mut ditherer = ditherer(config)?;
    ditherer.set_image(image)?;
    process(config, &ditherer)
}

/// Dither the image file at `path`. The style is built first, so a bad
/// configuration is reported even when the file is unreadable.
pub fn run_file<P: AsRef<Path>>(config: &ProcessConfig, path: P) -> Result<BinaryField> {
    let mut ditherer = ditherer(config)?;
    ditherer.load_image(path)?;
    process(config, &ditherer)
}
