use std::fmt::Display;

use matrices::{ATKINSON, FLOYD_STEINBERG, JARVIS_JUDICE_NINKE, KernelEntry, SIMPLE};

use crate::{
    texture::{BinaryField, BrightnessField, Shape, TextureMutSlice, TextureRef, TextureSlice},
    transform::traits::TextureTransform,
    utils::iterator::GridIterator,
};

pub mod matrices;

/// Brightness above which a pixel is set
pub const DIFFUSION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDiffusionType {
    Simple,
    FloydSteinberg,
    Atkinson,
    JarvisJudiceNinke,
}

impl ErrorDiffusionType {
    pub const ALL: [ErrorDiffusionType; 4] = [
        ErrorDiffusionType::Simple,
        ErrorDiffusionType::FloydSteinberg,
        ErrorDiffusionType::Atkinson,
        ErrorDiffusionType::JarvisJudiceNinke,
    ];

    /// Kernel for a style name, Floyd-Steinberg for unknown names.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(ErrorDiffusionType::FloydSteinberg)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorDiffusionType::Simple => "simple",
            ErrorDiffusionType::FloydSteinberg => "floyd-steinberg",
            ErrorDiffusionType::Atkinson => "atkinson",
            ErrorDiffusionType::JarvisJudiceNinke => "jjn",
        }
    }

    pub fn kernel(&self) -> &'static [KernelEntry] {
        match self {
            ErrorDiffusionType::Simple => &SIMPLE,
            ErrorDiffusionType::FloydSteinberg => &FLOYD_STEINBERG,
            ErrorDiffusionType::Atkinson => &ATKINSON,
            ErrorDiffusionType::JarvisJudiceNinke => &JARVIS_JUDICE_NINKE,
        }
    }

    /// Share of the quantization error passed on to neighbours
    pub fn weight_sum(&self) -> f64 {
        self.kernel().iter().map(|(_, _, weight)| weight).sum()
    }

    pub fn to_transform(self) -> DiffusionTransform {
        DiffusionTransform::new(self.kernel())
    }

    pub fn dither(self, brightness: &BrightnessField) -> BinaryField {
        dither_diffusion(brightness, self.kernel())
    }
}

impl Display for ErrorDiffusionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error diffusion over a brightness field.
///
/// Pixels are visited in raster order. Each one is thresholded at
/// [DIFFUSION_THRESHOLD] and its error spread to the kernel targets; targets
/// outside the image are dropped, nothing wraps around.
pub struct DiffusionTransform {
    kernel: &'static [KernelEntry],
    /// brightness adjusted by the error received so far
    work: Vec<f64>,
}

impl DiffusionTransform {
    pub fn new(kernel: &'static [KernelEntry]) -> Self {
        debug_assert!(
            kernel.iter().all(|(dy, dx, _)| *dy > 0 || *dx > 0),
            "kernel must only reach pixels after the current one"
        );
        Self {
            kernel,
            work: Vec::new(),
        }
    }
}

impl TextureTransform for DiffusionTransform {
    type Input = f32;
    type Output = u8;

    fn apply<'i, 'o>(
        &mut self,
        input: TextureSlice<'i, Self::Input>,
        mut output: TextureMutSlice<'o, Self::Output>,
    ) -> (
        TextureSlice<'i, Self::Input>,
        TextureMutSlice<'o, Self::Output>,
    ) {
        self.work.clear();
        self.work.extend(input.as_ref().iter().map(|v| *v as f64));

        let (width, height) = input.shape();
        diffuse(&mut self.work, output.as_mut(), width, height, self.kernel);
        (input, output)
    }

    fn prepare(&mut self, in_shape: Shape, _: Shape) {
        let (width, height) = in_shape;
        self.work.reserve(width * height);
    }
}

fn diffuse(work: &mut [f64], out: &mut [u8], width: usize, height: usize, kernel: &[KernelEntry]) {
    for (x, y, idx) in GridIterator::new(width, height) {
        let value = work[idx];
        let bit = (value > DIFFUSION_THRESHOLD) as u8;
        out[idx] = bit;

        let error = value - bit as f64;
        for &(dy, dx, weight) in kernel {
            let ty = y + dy;
            if ty >= height {
                continue;
            }
            let tx = x as isize + dx;
            if tx < 0 || tx >= width as isize {
                continue;
            }
            work[ty * width + tx as usize] += error * weight;
        }
    }
}

/// Dither a brightness field with any causal kernel.
pub fn dither_diffusion(brightness: &BrightnessField, kernel: &'static [KernelEntry]) -> BinaryField {
    DiffusionTransform::new(kernel).run(brightness)
}
