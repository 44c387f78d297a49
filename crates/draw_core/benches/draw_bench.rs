use chrono::{TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use draw_core::{draw_class_seeded, DrawOptions, DrawPolicy, Entry};
use std::hint::black_box;

/// Skewed club sizes, like a real national event: a few big clubs, a long tail.
fn field(n: usize) -> Vec<Entry> {
    (0..n)
        .map(|i| {
            let club = match i % 10 {
                0..=2 => "Big".to_string(),
                3..=4 => "Medium".to_string(),
                k => format!("Small{}", (i / 10) % 40 + k),
            };
            Entry::new(format!("{:05}", i), club, format!("Runner {}", i))
        })
        .collect()
}

fn bench_policies(c: &mut Criterion) {
    let options = DrawOptions::new(Utc.with_ymd_and_hms(2026, 5, 16, 10, 0, 0).unwrap(), 60)
        .with_club_separation(3)
        .with_vacancies(10);

    let mut group = c.benchmark_group("draw_class");
    for n in [100usize, 1_000, 5_000] {
        let entries = field(n);
        group.throughput(Throughput::Elements(n as u64));
        for policy in [DrawPolicy::Random, DrawPolicy::Meos, DrawPolicy::Soft] {
            group.bench_with_input(BenchmarkId::new(policy.name(), n), &entries, |b, entries| {
                b.iter(|| draw_class_seeded(black_box(entries), &policy, &options, 42).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_policies);
criterion_main!(benches);
