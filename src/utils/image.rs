use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use image::{DynamicImage, ExtendedColorType, GrayImage, ImageFormat};

use crate::{
    error::{DitherError, Result},
    texture::{BinaryField, Texture, TextureRef},
};

/// ITU-R 601-2 luma coefficients for R, G, B
pub const LUMA_601: [f32; 3] = [0.299, 0.587, 0.114];

/// Which part of a color image gets dithered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    Red,
    Green,
    Blue,
    /// Luma of all channels
    #[default]
    All,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::All => "all",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = DitherError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "red" => Ok(Channel::Red),
            "green" => Ok(Channel::Green),
            "blue" => Ok(Channel::Blue),
            "all" => Ok(Channel::All),
            other => Err(DitherError::configuration(format!(
                "unknown channel '{}', expected red, green, blue or all",
                other
            ))),
        }
    }
}

/// Decode an image file, failing with [DitherError::Resource].
pub fn open_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| DitherError::resource(path, e))?;
    log::debug!(
        "loaded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );
    Ok(image)
}

/// Decode an image file into 8-bit levels of the selected channel.
pub fn load_levels<P: AsRef<Path>>(path: P, channel: Channel) -> Result<Texture<u8>> {
    levels_from_image(&open_image(path)?, channel)
}

/// Extract one channel, or the 601 luma of all channels, from a decoded image.
///
/// Grayscale images only have one channel, which is used whatever the selection.
pub fn levels_from_image(image: &DynamicImage, channel: Channel) -> Result<Texture<u8>> {
    if !image.color().has_color() {
        return Texture::from_vec(image.width(), image.height(), image.to_luma8().into_raw());
    }

    let rgb = image.to_rgb8();
    let levels = rgb
        .pixels()
        .map(|pixel| {
            let [r, g, b] = pixel.0;
            match channel {
                Channel::Red => r,
                Channel::Green => g,
                Channel::Blue => b,
                Channel::All => luma(r, g, b),
            }
        })
        .collect();
    Texture::from_vec(rgb.width(), rgb.height(), levels)
}

#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let value = r as f32 * LUMA_601[0] + g as f32 * LUMA_601[1] + b as f32 * LUMA_601[2];
    value.round().clamp(0.0, 255.0) as u8
}

/// Write 8-bit levels as a grayscale png
pub fn save_levels<P: AsRef<Path>>(path: P, levels: &Texture<u8>) -> Result {
    image::save_buffer_with_format(
        path,
        levels.as_ref(),
        levels.width(),
        levels.height(),
        ExtendedColorType::L8,
        ImageFormat::Png,
    )
    .map_err(encode_error)
}

/// Write a binary field as a black and white png: 0 is black, 1 is white.
pub fn save_binary<P: AsRef<Path>>(path: P, bits: &BinaryField) -> Result {
    let image = binary_to_image(bits);
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(encode_error)
}

pub fn binary_to_image(bits: &BinaryField) -> GrayImage {
    let raw = bits.as_ref().iter().map(|bit| bit * 255).collect();
    // the buffer length always matches the texture shape
    GrayImage::from_raw(bits.width(), bits.height(), raw).unwrap_or_default()
}

/// `photo.png` -> `photodt.png`, next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}dt.png", stem))
}

fn encode_error(err: image::ImageError) -> DitherError {
    match err {
        image::ImageError::IoError(e) => DitherError::Io(e),
        other => DitherError::ImageEncode(other),
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    fn color_image() -> DynamicImage {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([10, 200, 30]));
        DynamicImage::ImageRgb8(rgb)
    }

    #[test]
    fn test_single_channel_selection() {
        let image = color_image();
        assert_eq!(levels_from_image(&image, Channel::Red).unwrap().as_ref(), &[255, 10]);
        assert_eq!(levels_from_image(&image, Channel::Green).unwrap().as_ref(), &[0, 200]);
        assert_eq!(levels_from_image(&image, Channel::Blue).unwrap().as_ref(), &[0, 30]);
    }

    #[test]
    fn test_luma_weights() {
        let levels = levels_from_image(&color_image(), Channel::All).unwrap();
        // 255 * 0.299 = 76.245
        assert_eq!(levels.get(0, 0), 76);
        // 2.99 + 117.4 + 3.42 = 123.81
        assert_eq!(levels.get(1, 0), 124);
        assert_eq!(luma(255, 255, 255), 255);
    }

    #[test]
    fn test_grayscale_ignores_channel() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_raw(2, 1, vec![7, 9]).unwrap());
        assert_eq!(levels_from_image(&gray, Channel::Blue).unwrap().as_ref(), &[7, 9]);
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = load_levels("does/not/exist.png", Channel::All).unwrap_err();
        assert!(matches!(err, DitherError::Resource { .. }));
    }

    #[test]
    fn test_binary_roundtrip_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bits.png");
        let bits = Texture::from_vec(3, 1, vec![0u8, 1, 1]).unwrap();

        save_binary(&path, &bits).unwrap();
        let levels = load_levels(&path, Channel::All).unwrap();
        assert_eq!(levels.as_ref(), &[0, 255, 255]);
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("imgs/cat.jpg")),
            PathBuf::from("imgs/catdt.png")
        );
    }
}
