use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndview::{adapter, ops, Expression, LayoutType, SliceSpec, StridedSource, Tensor};

fn sample_tensor() -> Tensor<u8> {
    Tensor::from_shape_val(&[1080, 1080, 3], 0_u8)
}

fn bench_views(c: &mut Criterion) {
    let mut group = c.benchmark_group("View");
    let t = sample_tensor();

    group.bench_function("transpose", |b| b.iter(|| black_box(&t).transpose()));
    group.bench_function("permute", |b| {
        b.iter(|| black_box(&t).permute(&[2, 0, 1]))
    });
    group.bench_function("slice", |b| {
        b.iter(|| {
            black_box(&t).slice(&[
                SliceSpec::range(100, 900, 2),
                SliceSpec::step(-1),
                SliceSpec::Index(1),
            ])
        })
    });
    group.finish();
}

fn bench_ravel(c: &mut Criterion) {
    let mut group = c.benchmark_group("Ravel");
    let t = sample_tensor();

    group.bench_function("row_major_view", |b| {
        b.iter(|| black_box(&t).ravel(LayoutType::RowMajor).map(|r| r.len()))
    });
    group.bench_function("permuted_copy", |b| {
        b.iter(|| {
            black_box(&t)
                .permute(&[2, 0, 1])
                .and_then(|v| v.ravel(LayoutType::RowMajor))
                .map(|r| r.len())
        })
    });
    group.bench_function("to_tensor", |b| {
        b.iter_batched(
            sample_tensor,
            |tv| black_box(tv).permute(&[2, 0, 1]).map(|v| v.to_tensor()),
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

fn bench_expression(c: &mut Criterion) {
    let mut group = c.benchmark_group("Expression");
    let a = Tensor::<f32>::from_shape_val(&[256, 256], 1.5);
    let b = Tensor::<f32>::from_shape_val(&[256, 256], 0.5);

    let index: &[usize] = &[17, 42];
    group.bench_function("eval_transposed_sum", |bench| {
        bench.iter(|| {
            let sum = ops::add(&a, &b)?;
            let t = adapter::transpose(sum);
            Ok::<f32, ndview::TensorError>(t.eval(black_box(index)))
        })
    });
    group.bench_function("flatten_dynamic_view", |bench| {
        bench.iter(|| {
            let sum = ops::add(&a, &b)?;
            let v = adapter::dynamic_view(sum, &[SliceSpec::step(3), SliceSpec::step(-5)])?;
            Ok::<usize, ndview::ViewError>(adapter::flatten(&v).numel())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_views, bench_ravel, bench_expression);
criterion_main!(benches);
