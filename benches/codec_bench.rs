//! Throughput benchmarks for the quantization codecs.
//!
//! Compares the ndarray and trueno backends on the hot paths a checkpoint
//! load goes through.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cuantizar::quant::{group, pack_int4, symmetric, unpack_int4, Backend, Shard};
use ndarray::{Array2, ArrayD};

fn weight(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(i, j)| ((i * cols + j) as f32 * 0.013).sin())
}

/// Channel-wise symmetric quantize + dequantize per backend
fn bench_channel_symmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("ChannelSymmetric");

    for size in [64usize, 256, 1024].iter() {
        let x = weight(*size, *size).into_dyn();
        group.throughput(Throughput::Elements((size * size) as u64));

        for backend in [Backend::Ndarray, Backend::Trueno] {
            let id = BenchmarkId::new(format!("{backend:?}"), size);
            group.bench_with_input(id, &x, |b, x| {
                b.iter(|| {
                    let (q, scales) =
                        symmetric::quantize(&x.view(), 8, Some(-1), None, backend).unwrap();
                    let restored =
                        symmetric::dequantize(&q.view(), 8, &scales, Some(-1), Shard::FULL, backend)
                            .unwrap();
                    black_box(restored)
                });
            });
        }
    }
    group.finish();
}

/// Group-wise asymmetric quantize per backend
fn bench_group_asymmetric(c: &mut Criterion) {
    let mut group = c.benchmark_group("GroupAsymmetric");

    for group_size in [32usize, 128].iter() {
        let x = weight(1024, 512);
        group.throughput(Throughput::Elements(x.len() as u64));

        for backend in [Backend::Ndarray, Backend::Trueno] {
            let id = BenchmarkId::new(format!("{backend:?}"), group_size);
            group.bench_with_input(id, group_size, |b, &group_size| {
                b.iter(|| {
                    let quantized = group::quantize_asymmetric(&x.view(), 4, group_size, backend);
                    black_box(quantized.unwrap())
                });
            });
        }
    }
    group.finish();
}

/// Nibble packing along the row axis
fn bench_int4_packing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Int4Packing");

    let q: ArrayD<i8> =
        Array2::from_shape_fn((1024, 1024), |(i, j)| ((i + j) % 16) as i8 - 8).into_dyn();
    group.throughput(Throughput::Elements(q.len() as u64));

    group.bench_function("pack_1024x1024", |b| {
        b.iter(|| black_box(pack_int4(&q.view()).unwrap()));
    });

    let packed = pack_int4(&q.view()).unwrap();
    group.bench_function("unpack_1024x1024", |b| {
        b.iter(|| black_box(unpack_int4(&packed.view()).unwrap()));
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_channel_symmetric,
    bench_group_asymmetric,
    bench_int4_packing
);
criterion_main!(benches);
