use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndview_tensor::{layout, shape, LayoutType, Shape};

const SHORT: [usize; 3] = [2, 3, 1];
const LONG: [usize; 16] = [2, 3, 1, 2, 6, 1, 2, 3, 45, 6, 12, 3, 5, 45, 5, 6];

fn bench_initializer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ShapeInit");

    group.bench_function("vec_short", |b| {
        b.iter(|| black_box(SHORT.to_vec()))
    });
    group.bench_function("smallvec_short", |b| {
        b.iter(|| black_box(Shape::from_slice(&SHORT)))
    });
    group.bench_function("array_short", |b| {
        b.iter(|| {
            let mut a = [0usize; 4];
            a[..SHORT.len()].copy_from_slice(&SHORT);
            black_box(a)
        })
    });
    group.bench_function("vec_long", |b| b.iter(|| black_box(LONG.to_vec())));
    group.bench_function("smallvec_long", |b| {
        b.iter(|| black_box(Shape::from_slice(&LONG)))
    });
    group.finish();
}

fn bench_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("ShapeAccess");

    group.bench_function("vec", |b| {
        let mut a = vec![3.0f64, 2.0, 1.0, 3.0];
        b.iter(|| {
            a[0] = a[1] * a[2] + a[3];
            a[3] = a[1];
            a[1] = a[2] + a[3];
            a[2] = a[3];
            black_box(a.as_ptr());
        })
    });
    group.bench_function("smallvec", |b| {
        let mut a: smallvec::SmallVec<[f64; 4]> = smallvec::smallvec![3.0, 2.0, 1.0, 3.0];
        b.iter(|| {
            a[0] = a[1] * a[2] + a[3];
            a[3] = a[1];
            a[1] = a[2] + a[3];
            a[2] = a[3];
            black_box(a.as_ptr());
        })
    });
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("Layout");
    let dims = [8usize, 16, 32, 4];
    let strides = shape::row_major_strides(&dims);

    group.bench_function("classify", |b| {
        b.iter(|| layout::classify(black_box(&dims), black_box(&strides)))
    });
    group.bench_function("permute", |b| {
        b.iter(|| {
            layout::permute(
                black_box(&dims),
                black_box(&strides),
                LayoutType::RowMajor,
                &[2, 0, 3, 1],
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_initializer, bench_access, bench_layout);
criterion_main!(benches);
