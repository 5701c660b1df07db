//! Byte kernel throughput benchmarks
//!
//! Each kernel is measured on short buffers, where the scalar crossover and
//! tail handling dominate, and on long ones, where the main loop does.
//! Every group also runs the `simd::scalar` twin as a baseline.

use bytekern::simd::{self, scalar, NibbleLookupTable};
use bytekern::SimdBuf;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

//==============================================================================
// TEST DATA GENERATION
//==============================================================================

/// Generate test data with a reproducible pattern
fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 17 + 13) % 256) as u8).collect()
}

/// Generate a DNA-like sequence over a four-letter alphabet
fn generate_bases(size: usize) -> Vec<u8> {
    (0..size).map(|i| b"ACGT"[(i * 7 + i / 3) % 4]).collect()
}

const SIZES: [(&str, usize); 6] = [
    ("tiny_15B", 15),
    ("small_31B", 31),
    ("small_150B", 150),
    ("medium_1KB", 1024),
    ("medium_4KB", 4096),
    ("large_64KB", 65536),
];

//==============================================================================
// MAP / ZIP KERNELS
//==============================================================================

fn bench_const_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("Const Byte Ops");

    for (name, size) in SIZES {
        let src = generate_test_data(size);
        let mut dst = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("add_const8", name), &size, |b, _| {
            b.iter(|| simd::add_const8(black_box(&mut dst), black_box(&src), 3))
        });
        group.bench_with_input(BenchmarkId::new("scalar_add_const8", name), &size, |b, _| {
            b.iter(|| scalar::add_const8(black_box(&mut dst), black_box(&src), 3))
        });
        group.bench_with_input(BenchmarkId::new("xor_const8_inplace", name), &size, |b, _| {
            b.iter(|| simd::xor_const8_inplace(black_box(&mut dst), 0x20))
        });
    }

    group.finish();
}

fn bench_bitwise(c: &mut Criterion) {
    let mut group = c.benchmark_group("Bitwise");

    for (name, size) in SIZES {
        let a = generate_test_data(size);
        let m = generate_bases(size);
        let mut dst = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("invmask", name), &size, |b, _| {
            b.iter(|| simd::invmask(black_box(&mut dst), black_box(&a), black_box(&m)))
        });
        group.bench_with_input(BenchmarkId::new("scalar_invmask", name), &size, |b, _| {
            b.iter(|| scalar::invmask(black_box(&mut dst), black_box(&a), black_box(&m)))
        });
    }

    group.finish();
}

fn bench_nibble_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Nibble Lookup");
    let table = NibbleLookupTable::new(*b"=ACMGRSVTWYHKDBN");

    for (name, size) in SIZES {
        let packed = generate_test_data((size + 1) / 2);
        let mut dst = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("packed_nibble_lookup", name), &size, |b, _| {
            b.iter(|| simd::packed_nibble_lookup(black_box(&mut dst), black_box(&packed), &table))
        });
        group.bench_with_input(BenchmarkId::new("scalar_packed_nibble_lookup", name), &size, |b, _| {
            b.iter(|| scalar::packed_nibble_lookup(black_box(&mut dst), black_box(&packed), &table))
        });
    }

    group.finish();
}

//==============================================================================
// SEARCH / COUNT KERNELS
//==============================================================================

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("Compare");

    for (name, size) in SIZES {
        let a = generate_test_data(size);
        let mut b2 = a.clone();
        if let Some(last) = b2.last_mut() {
            *last ^= 1;
        }
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("first_unequal8", name), &size, |b, _| {
            b.iter(|| simd::first_unequal8(black_box(&a), black_box(&b2), 0))
        });
        group.bench_with_input(BenchmarkId::new("scalar_first_unequal8", name), &size, |b, _| {
            b.iter(|| scalar::first_unequal8(black_box(&a), black_box(&b2), 0))
        });
        group.bench_with_input(BenchmarkId::new("first_greater8", name), &size, |b, _| {
            b.iter(|| simd::first_greater8(black_box(&a), 255, 0))
        });
    }

    group.finish();
}

fn bench_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("Counts");
    let gc = NibbleLookupTable::new([0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

    for (name, size) in SIZES {
        let bases = generate_bases(size);
        let data = generate_test_data(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("count2_bytes", name), &size, |b, _| {
            b.iter(|| simd::count2_bytes(black_box(&bases), b'G', b'C'))
        });
        group.bench_with_input(BenchmarkId::new("scalar_count2_bytes", name), &size, |b, _| {
            b.iter(|| scalar::count2_bytes(black_box(&bases), b'G', b'C'))
        });
        group.bench_with_input(BenchmarkId::new("count_nibbles_in_set", name), &size, |b, _| {
            b.iter(|| simd::count_nibbles_in_set(black_box(&data), &gc))
        });
        group.bench_with_input(BenchmarkId::new("popcnt", name), &size, |b, _| {
            b.iter(|| simd::popcnt(black_box(&data)))
        });
        group.bench_with_input(BenchmarkId::new("accumulate8", name), &size, |b, _| {
            b.iter(|| simd::accumulate8(black_box(&data)))
        });
    }

    group.finish();
}

//==============================================================================
// SAFE VS UNCHECKED
//==============================================================================

fn bench_safe_vs_unchecked(c: &mut Criterion) {
    let mut group = c.benchmark_group("Safe vs Unchecked");

    for (name, size) in SIZES {
        let src = SimdBuf::from_slice(&generate_test_data(size));
        let mut dst = SimdBuf::allocate(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("reverse8", name), &size, |b, _| {
            b.iter(|| simd::reverse8(black_box(&mut dst), black_box(&src)))
        });
        group.bench_with_input(BenchmarkId::new("reverse8_unsafe", name), &size, |b, &n| {
            b.iter(|| unsafe { simd::reverse8_unsafe(dst.as_mut_ptr(), black_box(src.as_ptr()), n) })
        });
        group.bench_with_input(BenchmarkId::new("and_inplace", name), &size, |b, _| {
            b.iter(|| simd::and_inplace(black_box(&mut dst), black_box(&src)))
        });
        group.bench_with_input(BenchmarkId::new("and_unsafe_inplace", name), &size, |b, &n| {
            b.iter(|| unsafe { simd::and_unsafe_inplace(dst.as_mut_ptr(), black_box(src.as_ptr()), n) })
        });
        group.bench_with_input(BenchmarkId::new("count3_bytes_unsafe", name), &size, |b, &n| {
            b.iter(|| unsafe { simd::count3_bytes_unsafe(black_box(src.as_ptr()), n, 1, 2, 3) })
        });
    }

    group.finish();
}

criterion_group!(map_ops, bench_const_ops, bench_bitwise, bench_nibble_lookup);

criterion_group!(scan_ops, bench_compare, bench_counts);

criterion_group!(
    name = unchecked;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(std::time::Duration::from_secs(5));
    targets = bench_safe_vs_unchecked
);

criterion_main!(map_ops, scan_ops, unchecked);
