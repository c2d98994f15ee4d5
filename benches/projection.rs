use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fitscan::project_to_unit_sphere;

fn bench_projection(c: &mut Criterion) {
    let n = 100_000;
    let ra: Vec<f64> = (0..n).map(|i| (i as f64 * 0.0036) % 360.0).collect();
    let dec: Vec<f64> = (0..n).map(|i| (i as f64 * 0.0018) % 180.0 - 90.0).collect();

    c.bench_function("project_100k", |b| {
        b.iter(|| project_to_unit_sphere(black_box(&ra), black_box(&dec)).unwrap())
    });
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
