use std::{fmt::Display, hint::black_box};

use bitpunker::{
    prelude::{Brightness, TextureTransform},
    texture::{Texture, TextureRef},
};
use criterion::{BenchmarkGroup, BenchmarkId, measurement::WallTime};
use rand::{Rng, SeedableRng, rngs::StdRng};

pub const BENCH_IMAGE_SIZES: [u32; 3] = [100, 300, 500];

/// Seeded noisy gradient, close enough to a photo for threshold work
pub fn bench_levels(size: u32) -> Texture<u8> {
    let mut rng = StdRng::seed_from_u64(size as u64);
    let levels = (0..size * size)
        .map(|idx| {
            let x = idx % size;
            let ramp = (x * 255 / size.max(2)) as i32;
            (ramp + rng.random_range(-24..24)).clamp(0, 255) as u8
        })
        .collect();
    Texture::from_vec(size, size, levels).unwrap()
}

/// Brightness field and a dithered output buffer of the same shape
pub fn bench_data(size: u32) -> (Texture<f32>, Texture<u8>) {
    let lut = Brightness::Srgb.lut();
    let levels = bench_levels(size);
    let values = levels.as_ref().iter().map(|v| lut[*v as usize]).collect();
    (
        black_box(Texture::from_vec(size, size, values).unwrap()),
        black_box(Texture::new(size, size)),
    )
}

pub fn bench_transform<In, Out, T: Display>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    id: BenchmarkId,
    param: T,
    transform: &mut impl TextureTransform<Input = In, Output = Out>,
    input: Texture<In>,
    mut output: Texture<Out>,
) {
    group.bench_with_input(id, &param, |b, _| {
        transform.prepare(input.shape(), output.shape());
        b.iter(|| {
            let res = transform.apply(input.as_texture_slice(), output.as_texture_mut_slice());
            black_box(res);
        });
    });
}
