use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use bsp_atlas_core::prelude::*;

fn generate_items(count: usize, min_size: u32, max_size: u32) -> Vec<LayoutItem> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(count as u64);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            LayoutItem::new(format!("tex_{}", i), w, h)
        })
        .collect()
}

fn bench_single_trial(c: &mut Criterion) {
    let mut group = c.benchmark_group("bsp_single_trial");
    for count in [50, 100, 200] {
        let items = generate_items(count, 16, 64);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.iter(|| black_box(pack_with_seed(items, 2048, 2048, 0)));
        });
    }
    group.finish();
}

fn bench_seed_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_search");
    group.sample_size(10);
    let items = generate_items(100, 16, 64);
    for trials in [100u32, 1000] {
        group.throughput(Throughput::Elements(trials as u64));
        group.bench_with_input(BenchmarkId::from_parameter(trials), &trials, |b, &trials| {
            let cfg = AtlasConfig::builder()
                .with_dimensions(1024, 1024)
                .trials(trials)
                .build();
            b.iter(|| black_box(pack_layout(&items, &cfg)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_trial, bench_seed_search);
criterion_main!(benches);
