//! Criterion benchmark of complete demo round-trips.
//!
//! Run with: cargo bench --bench roundtrip_benchmark

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kernelwalk_backend::GpuContext;
use kernelwalk_demos::{Demo, DemoConfig};
use std::time::Duration;

fn bench_demos(c: &mut Criterion) {
    let config = DemoConfig::default();
    if let Err(e) = GpuContext::new_blocking(&config.device) {
        eprintln!("skipping benchmarks: {}", e);
        return;
    }

    let mut group = c.benchmark_group("demo_round_trip");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for len in [1u32 << 12, 1 << 16, 1 << 20] {
        let config = DemoConfig {
            array_len: len,
            reduce_len: len,
            ..DemoConfig::default()
        };
        group.throughput(Throughput::Elements(len as u64));
        for demo in [Demo::Arrays, Demo::Reduction] {
            group.bench_with_input(BenchmarkId::new(demo.name(), len), &config, |b, config| {
                b.iter(|| pollster::block_on(demo.run(config)).map(|r| r.passed()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_demos);
criterion_main!(benches);
