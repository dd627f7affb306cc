use std::{fmt::Display, path::Path};

use image::DynamicImage;
use rand::Rng;

use crate::{
    dithering::{
        error_diffusion::ErrorDiffusionType,
        threshold::{OrderedTransform, ThresholdMap, bayer, store::MapStore},
    },
    error::{DitherError, Result},
    texture::{BinaryField, Texture, TextureRef},
    transform::prelude::*,
    utils::image::{Channel, levels_from_image, open_image},
};

pub mod baseline;
pub mod error_diffusion;
pub mod threshold;

/// Dithering style selected by the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DitheringType {
    Bayer { depth: i32 },
    BlueNoise { depth: i32, sigma: f64, generate: bool },
    ErrorDiffusion(ErrorDiffusionType),
}

impl DitheringType {
    pub const STYLES: [&'static str; 6] = [
        "bayer",
        "bluenoise",
        "simple",
        "atkinson",
        "floyd-steinberg",
        "jjn",
    ];

    /// Style from its name. Depth only matters to ordered styles, sigma and
    /// generate to blue noise. Unknown names fall back to bayer.
    pub fn from_style(style: &str, depth: i32, sigma: f64, generate: bool) -> Self {
        match style {
            "bayer" => DitheringType::Bayer { depth },
            "bluenoise" => DitheringType::BlueNoise {
                depth,
                sigma,
                generate,
            },
            "simple" | "atkinson" | "floyd-steinberg" | "jjn" => {
                DitheringType::ErrorDiffusion(ErrorDiffusionType::from_name(style))
            }
            other => {
                log::warn!("unknown style '{}', using bayer", other);
                DitheringType::Bayer { depth }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DitheringType::Bayer { .. } => "bayer",
            DitheringType::BlueNoise { .. } => "bluenoise",
            DitheringType::ErrorDiffusion(kind) => kind.name(),
        }
    }

    /// Build what the style needs before any pixel is processed: the
    /// threshold map for ordered styles, loaded or generated through `store`.
    pub fn styler(&self, store: &MapStore) -> Result<Styler> {
        match *self {
            DitheringType::Bayer { depth } => Ok(Styler::Ordered(bayer::generate(depth)?)),
            DitheringType::BlueNoise {
                depth,
                sigma,
                generate,
            } => Ok(Styler::Ordered(store.blue_noise(depth, sigma, generate)?)),
            DitheringType::ErrorDiffusion(kind) => Ok(Styler::Diffusion(kind)),
        }
    }
}

impl Display for DitheringType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DitheringType::Bayer { depth } => write!(f, "bayer (depth {})", depth),
            DitheringType::BlueNoise { depth, sigma, .. } => {
                write!(f, "bluenoise (depth {}, sigma {})", depth, sigma)
            }
            DitheringType::ErrorDiffusion(kind) => write!(f, "{}", kind),
        }
    }
}

/// A ready to use dithering strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Styler {
    Ordered(ThresholdMap),
    Diffusion(ErrorDiffusionType),
}

impl Styler {
    /// Convert levels to brightness, then dither.
    ///
    /// `invert` only applies to ordered styles.
    pub fn dither(&self, levels: &Texture<u8>, brightness: Brightness, invert: bool) -> BinaryField {
        let shape = levels.shape();
        let to_brightness = BrightnessTransform::new(brightness);
        match self {
            Styler::Ordered(map) => to_brightness
                .pipe(OrderedTransform::new(map, invert), shape)
                .run(levels),
            Styler::Diffusion(kind) => {
                if invert {
                    log::debug!("invert is ignored by {}", kind);
                }
                to_brightness.pipe(kind.to_transform(), shape).run(levels)
            }
        }
    }
}

/// Binds a strategy to the image being processed.
pub struct Ditherer {
    /// unset for the baseline modes, which need no preparation
    styler: Option<Styler>,
    image: Option<DynamicImage>,
}

impl Ditherer {
    pub fn new(dithering_type: DitheringType, store: &MapStore) -> Result<Self> {
        log::debug!("preparing {}", dithering_type);
        Ok(Self::with_styler(dithering_type.styler(store)?))
    }

    pub fn with_styler(styler: Styler) -> Self {
        Self {
            styler: Some(styler),
            image: None,
        }
    }

    /// Only [Ditherer::quantize] and [Ditherer::randomize] are available.
    pub fn baseline() -> Self {
        Self {
            styler: None,
            image: None,
        }
    }

    pub fn load_image<P: AsRef<Path>>(&mut self, path: P) -> Result {
        self.set_image(open_image(path)?)
    }

    pub fn set_image(&mut self, image: DynamicImage) -> Result {
        if image.width() == 0 || image.height() == 0 {
            return Err(DitherError::invalid_state(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        self.image = Some(image);
        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    fn levels(&self, channel: Channel) -> Result<Texture<u8>> {
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| DitherError::invalid_state("no image to dither, load one first"))?;
        levels_from_image(image, channel)
    }

    pub fn dither(&self, invert: bool, brightness: Brightness, channel: Channel) -> Result<BinaryField> {
        let styler = self
            .styler
            .as_ref()
            .ok_or_else(|| DitherError::invalid_state("no dithering style was prepared"))?;
        let levels = self.levels(channel)?;
        Ok(styler.dither(&levels, brightness, invert))
    }

    /// Plain threshold at 127, no dithering
    pub fn quantize(&self, channel: Channel) -> Result<BinaryField> {
        let levels = self.levels(channel)?;
        Ok(baseline::quantize(&levels, baseline::QUANTIZE_THRESHOLD))
    }

    pub fn randomize<R: Rng>(&self, channel: Channel, rng: &mut R) -> Result<BinaryField> {
        let levels = self.levels(channel)?;
        Ok(baseline::randomize(&levels, rng))
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, RgbImage};

    use super::*;

    fn gray(width: u32, height: u32, level: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, image::Luma([level])))
    }

    #[test]
    fn test_from_style() {
        assert_eq!(
            DitheringType::from_style("bayer", 2, 1.9, false),
            DitheringType::Bayer { depth: 2 }
        );
        assert_eq!(
            DitheringType::from_style("bluenoise", 1, 2.5, true),
            DitheringType::BlueNoise {
                depth: 1,
                sigma: 2.5,
                generate: true
            }
        );
        assert_eq!(
            DitheringType::from_style("jjn", 1, 1.9, false),
            DitheringType::ErrorDiffusion(ErrorDiffusionType::JarvisJudiceNinke)
        );
        assert_eq!(
            DitheringType::from_style("halftone", 3, 1.9, false),
            DitheringType::Bayer { depth: 3 }
        );
    }

    #[test]
    fn test_style_names_roundtrip() {
        for style in DitheringType::STYLES {
            assert_eq!(DitheringType::from_style(style, 1, 1.9, false).name(), style);
        }
    }

    #[test]
    fn test_dither_without_image() {
        let ditherer = Ditherer::with_styler(Styler::Diffusion(ErrorDiffusionType::Simple));
        let err = ditherer
            .dither(false, Brightness::Linear, Channel::All)
            .unwrap_err();
        assert!(matches!(err, DitherError::InvalidState(_)));
        assert!(ditherer.quantize(Channel::All).is_err());
    }

    #[test]
    fn test_baseline_cannot_dither() {
        let mut ditherer = Ditherer::baseline();
        ditherer.set_image(gray(4, 4, 200)).unwrap();
        assert!(matches!(
            ditherer.dither(false, Brightness::Linear, Channel::All),
            Err(DitherError::InvalidState(_))
        ));
        assert!(ditherer.quantize(Channel::All).unwrap().as_ref().iter().all(|b| *b == 1));
    }

    #[test]
    fn test_empty_image_rejected() {
        let mut ditherer = Ditherer::with_styler(Styler::Diffusion(ErrorDiffusionType::Simple));
        let err = ditherer.set_image(gray(0, 4, 0)).unwrap_err();
        assert!(matches!(err, DitherError::InvalidState(_)));
        assert!(!ditherer.has_image());
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut ditherer = Ditherer::with_styler(Styler::Diffusion(ErrorDiffusionType::Simple));
        let err = ditherer.load_image(dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, DitherError::Resource { .. }));
    }

    #[test]
    fn test_bayer_mid_gray() {
        let store = MapStore::default();
        let mut ditherer = Ditherer::new(DitheringType::Bayer { depth: 0 }, &store).unwrap();
        ditherer.set_image(gray(2, 2, 128)).unwrap();
        let bits = ditherer
            .dither(false, Brightness::Linear, Channel::All)
            .unwrap();
        // 0.502 against 0, 0.5, 0.75, 0.25
        assert_eq!(bits.as_ref(), &[1, 1, 0, 1]);
    }

    #[test]
    fn test_channel_selection() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 0, 255]));

        let mut ditherer = Ditherer::with_styler(Styler::Diffusion(ErrorDiffusionType::Simple));
        ditherer.set_image(DynamicImage::ImageRgb8(image)).unwrap();
        assert_eq!(ditherer.quantize(Channel::Red).unwrap().as_ref(), &[1, 0]);
        assert_eq!(ditherer.quantize(Channel::Blue).unwrap().as_ref(), &[0, 1]);
        assert_eq!(ditherer.quantize(Channel::Green).unwrap().as_ref(), &[0, 0]);
    }

    #[test]
    fn test_diffusion_ignores_invert() {
        let mut ditherer = Ditherer::with_styler(Styler::Diffusion(ErrorDiffusionType::FloydSteinberg));
        ditherer.set_image(gray(16, 16, 90)).unwrap();
        let plain = ditherer.dither(false, Brightness::Srgb, Channel::All).unwrap();
        let inverted = ditherer.dither(true, Brightness::Srgb, Channel::All).unwrap();
        assert_eq!(plain, inverted);
    }

    #[test]
    fn test_ordered_invert_flips_mid_gray() {
        let store = MapStore::default();
        let mut ditherer = Ditherer::new(DitheringType::Bayer { depth: 0 }, &store).unwrap();
        ditherer.set_image(gray(2, 2, 153)).unwrap();
        // 0.6 against complements 1.0, 0.5, 0.25, 0.75
        let bits = ditherer.dither(true, Brightness::Linear, Channel::All).unwrap();
        assert_eq!(bits.as_ref(), &[0, 1, 1, 0]);
    }
}
