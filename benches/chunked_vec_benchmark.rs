use chunked_seq::ChunkedVec;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for size in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut v = ChunkedVec::new();
                for i in 0..size {
                    v.append(black_box(i as i64));
                }
                v
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut v = ChunkedVec::new();
    for i in 0..100_000i64 {
        v.append(i);
    }
    c.bench_function("get/sequential/100_000", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for i in 0..v.size() {
                sum = sum.wrapping_add(*v.get(i).unwrap());
            }
            black_box(sum)
        });
    });
}

fn bench_middle_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("middle_insert");
    for size in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut v = ChunkedVec::new();
                for i in 0..size {
                    v.append(i as i64);
                }
                let mid = v.size() / 2;
                v.insert(mid, black_box(-1)).unwrap();
                v
            });
        });
    }
    group.finish();
}

fn bench_remove_if(c: &mut Criterion) {
    c.bench_function("remove_if/even/100_000", |b| {
        b.iter_batched(
            || {
                let mut v = ChunkedVec::new();
                for i in 0..100_000i64 {
                    v.append(i);
                }
                v
            },
            |mut v| {
                v.remove_if(|x| x % 2 == 0).unwrap();
                v
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_append, bench_get, bench_middle_insert, bench_remove_if);
criterion_main!(benches);
