//! Strategies without a threshold map, kept for comparison.
//!
//! Both work on the 8-bit channel levels directly, gamma is not applied.

use rand::Rng;
use rayon::prelude::*;

use crate::{
    texture::{BinaryField, Shape, Texture, TextureMutSlice, TextureRef, TextureSlice},
    transform::traits::TextureTransform,
};

/// Level above which [quantize] sets a pixel, 127/255.
pub const QUANTIZE_THRESHOLD: u8 = 127;

/// Upper bound (excluded) of the random thresholds drawn by [randomize].
pub const RANDOM_THRESHOLD_END: u8 = 255;

/// Fixed threshold on every pixel.
pub struct QuantizeTransform {
    threshold: u8,
}

impl QuantizeTransform {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for QuantizeTransform {
    fn default() -> Self {
        Self::new(QUANTIZE_THRESHOLD)
    }
}

impl TextureTransform for QuantizeTransform {
    type Input = u8;
    type Output = u8;

    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        mut output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    ) {
        let (width, _) = input.shape();
        let threshold = self.threshold;
        output
            .as_mut()
            .par_chunks_exact_mut(width)
            .zip(input.as_ref().par_chunks_exact(width))
            .for_each(|(out_row, in_row)| {
                out_row
                    .iter_mut()
                    .zip(in_row)
                    .for_each(|(bit, level)| *bit = (*level > threshold) as u8);
            });
        (input, output)
    }

    fn prepare(&mut self, _: Shape, _: Shape) {}
}

/// Independent uniform threshold in `[0, 255)` per pixel.
///
/// Pixels are drawn in raster order so a seeded rng gives the same field.
pub struct RandomizeTransform<'r, R: Rng> {
    rng: &'r mut R,
}

impl<'r, R: Rng> RandomizeTransform<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TextureTransform for RandomizeTransform<'_, R> {
    type Input = u8;
    type Output = u8;

    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        mut output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    ) {
        for (bit, level) in output.as_mut().iter_mut().zip(input.as_ref()) {
            let threshold = self.rng.random_range(0..RANDOM_THRESHOLD_END);
            *bit = (*level > threshold) as u8;
        }
        (input, output)
    }

    fn prepare(&mut self, _: Shape, _: Shape) {}
}

pub fn quantize(levels: &Texture<u8>, threshold: u8) -> BinaryField {
    QuantizeTransform::new(threshold).run(levels)
}

pub fn randomize<R: Rng>(levels: &Texture<u8>, rng: &mut R) -> BinaryField {
    RandomizeTransform::new(rng).run(levels)
}
