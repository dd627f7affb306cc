use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use bitpunker::dithering::threshold::{
    OrderedStrategy, OrderedTransform, bayer, blue_noise::BlueNoiseGenerator,
};

mod common;
use common::*;

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_transform");

    let maps = [
        ("bayer-1", bayer::generate(1).unwrap()),
        ("bayer-3", bayer::generate(3).unwrap()),
        (
            "bluenoise-0",
            BlueNoiseGenerator::new(0, 1.9, 7).unwrap().generate().unwrap(),
        ),
    ];

    for (map_name, map) in &maps {
        for strategy in [OrderedStrategy::Scalar, OrderedStrategy::ScalarPar] {
            for size in BENCH_IMAGE_SIZES {
                let (input, output) = bench_data(size);
                let mut transform = OrderedTransform::new(map, false).with_strategy(strategy);
                bench_transform(
                    &mut group,
                    BenchmarkId::new(format!("{}/{}", map_name, strategy), size),
                    size,
                    &mut transform,
                    input,
                    output,
                );
            }
        }
    }

    group.finish();
}

criterion_group!(ordered, criterion_benchmark);
criterion_main!(ordered);
