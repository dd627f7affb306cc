use rayon::prelude::*;

use crate::{
    texture::{Shape, TextureMutSlice, TextureSlice},
    transform::traits::TextureTransform,
};

/// Mapping from an 8-bit channel level to a [0, 1] brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Brightness {
    /// `level / 255`
    Linear,
    /// sRGB decoding curve, gives physically linear light
    Srgb,
}

impl Brightness {
    pub fn from_gamma_flag(gamma_correct: bool) -> Self {
        if gamma_correct {
            Brightness::Srgb
        } else {
            Brightness::Linear
        }
    }

    pub fn convert(self, level: u8) -> f32 {
        let value = level as f64 / 255.0;
        let value = match self {
            Brightness::Linear => value,
            Brightness::Srgb => srgb_to_linear(value),
        };
        value as f32
    }

    /// Every possible level converted once.
    pub fn lut(self) -> [f32; 256] {
        std::array::from_fn(|level| self.convert(level as u8))
    }
}

#[inline]
fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts 8-bit levels into a brightness field through a lookup table.
///
/// Large images are converted row-parallel, small ones sequentially.
pub struct BrightnessTransform {
    lut: [f32; 256],
    parallel: bool,
}

impl BrightnessTransform {
    pub fn new(brightness: Brightness) -> Self {
        Self {
            lut: brightness.lut(),
            parallel: false,
        }
    }

    fn use_parallel(shape: Shape) -> bool {
        let (width, height) = shape;
        width >= 450 && width * height >= 202500
    }
}

impl TextureTransform for BrightnessTransform {
    type Input = u8;
    type Output = f32;

    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        mut output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    ) {
        let lut = &self.lut;
        if self.parallel {
            output
                .as_mut()
                .par_iter_mut()
                .zip(input.as_ref().par_iter())
                .for_each(|(dst, src)| *dst = lut[*src as usize]);
        } else {
            output
                .as_mut()
                .iter_mut()
                .zip(input.as_ref().iter())
                .for_each(|(dst, src)| *dst = lut[*src as usize]);
        }
        (input, output)
    }

    fn prepare(&mut self, in_shape: Shape, _: Shape) {
        self.parallel = Self::use_parallel(in_shape);
    }
}
