use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parascene::geometry::GeometryParams;

/// Benchmark: sphere tessellation across the slider range the demos expose
fn bench_sphere_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sphere_generation");
    for segments in [8u32, 16, 32, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(segments),
            &segments,
            |b, &segments| {
                let params = GeometryParams::Sphere {
                    radius: 0.5,
                    width_segments: segments,
                    height_segments: segments,
                };
                b.iter(|| black_box(params.generate()))
            },
        );
    }
    group.finish();
}

/// Benchmark: the densest plane the demos register (100x100 segments)
fn bench_dense_plane_generation(c: &mut Criterion) {
    let params = GeometryParams::Plane {
        width: 1.0,
        height: 1.0,
        width_segments: 100,
        height_segments: 100,
    };
    c.bench_function("dense_plane_generation", |b| {
        b.iter(|| black_box(params.generate()))
    });
}

/// Benchmark: partial-arc torus as used by the mesh demos
fn bench_torus_generation(c: &mut Criterion) {
    let params = GeometryParams::Torus {
        radius: 0.45,
        tube: 0.24,
        radial_segments: 16,
        tubular_segments: 32,
        arc: 6.9,
    };
    c.bench_function("torus_generation", |b| {
        b.iter(|| black_box(params.generate()))
    });
}

criterion_group!(
    benches,
    bench_sphere_generation,
    bench_dense_plane_generation,
    bench_torus_generation
);
criterion_main!(benches);
