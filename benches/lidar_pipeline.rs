// LiDAR pipeline benchmark
//
// Synthetic 20k-point plot (flat ground + box canopy), seeded for stable runs.
// Run with: cargo bench --bench lidar_pipeline

use agronomy_core::lidar::hull::convex_hull_volume;
use agronomy_core::lidar::preprocess::{preprocess, PreprocessConfig};
use agronomy_core::lidar::segmentation::{segment_vegetation, SegmentationConfig};
use agronomy_core::PointCloud;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn synthetic_plot(ground: usize, canopy: usize) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(7);
    let mut coords: Vec<[f64; 3]> = (0..ground)
        .map(|_| [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0), rng.gen_range(0.0..0.05)])
        .collect();
    coords.extend((0..canopy).map(|_| {
        [
            rng.gen_range(3.0..7.0),
            rng.gen_range(3.0..7.0),
            rng.gen_range(0.5..2.5),
        ]
    }));
    PointCloud::from_xyz(coords)
}

fn bench_preprocess(c: &mut Criterion) {
    let cloud = synthetic_plot(12_000, 8_000);
    let config = PreprocessConfig::default();
    c.bench_function("preprocess_20k", |b| {
        b.iter(|| preprocess(black_box(cloud.clone()), &config))
    });
}

fn bench_segment(c: &mut Criterion) {
    let cloud = synthetic_plot(12_000, 8_000);
    let config = SegmentationConfig::default();
    c.bench_function("segment_20k", |b| {
        b.iter(|| segment_vegetation(black_box(&cloud), &config))
    });
}

fn bench_hull(c: &mut Criterion) {
    let canopy = synthetic_plot(0, 8_000);
    c.bench_function("hull_volume_8k", |b| {
        b.iter(|| convex_hull_volume(black_box(canopy.points())))
    });
}

criterion_group!(benches, bench_preprocess, bench_segment, bench_hull);
criterion_main!(benches);
