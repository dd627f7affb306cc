use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::texture::{BinaryField, Texture};

pub const TEST_IMAGE_SIZE: u32 = 96;

/// Seeded random 8-bit levels
pub fn gen_random_levels(size: u32, seed: u64) -> Texture<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let levels = (0..size * size).map(|_| rng.random::<u8>()).collect();
    Texture::from_vec(size, size, levels).unwrap()
}

pub fn gray_image(width: u32, height: u32, level: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([level])))
}

/// Horizontal gradient, left black and right white
pub fn gradient_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, _| {
        Luma([(x * 255 / (width - 1)) as u8])
    }))
}

pub fn rgb_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

pub fn ones(bits: &BinaryField) -> usize {
    bits.as_ref().iter().filter(|b| **b == 1).count()
}

pub fn fraction_set(bits: &BinaryField) -> f64 {
    ones(bits) as f64 / bits.as_ref().len() as f64
}
