use criterion::{black_box, criterion_group, criterion_main, Criterion};
use remote_memory_bridge::transport::{MockProbe, MockTransport, ReadFault};
use remote_memory_bridge::SynchronizedAccessor;
use std::sync::Arc;

fn attached_accessor() -> (SynchronizedAccessor<MockTransport>, Arc<MockProbe>) {
    let transport = MockTransport::builder()
        .region(0x1000u32, (0..=255).collect())
        .attached()
        .build();
    let probe = transport.probe();
    (SynchronizedAccessor::new(transport), probe)
}

fn benchmark_read_path(c: &mut Criterion) {
    let (accessor, _) = attached_accessor();
    c.bench_function("fresh_read_64", |b| {
        b.iter(|| accessor.read(black_box(0x1000), black_box(64)))
    });

    let (accessor, probe) = attached_accessor();
    accessor.read(0x1000, 64).unwrap();
    c.bench_function("masked_read_64", |b| {
        b.iter(|| {
            probe.inject([ReadFault::Zeroed]);
            accessor.read(black_box(0x1000), black_box(64))
        })
    });

    let (accessor, _) = attached_accessor();
    c.bench_function("failed_read_unmapped", |b| {
        b.iter(|| accessor.read(black_box(0x9000), black_box(64)))
    });
}

criterion_group!(benches, benchmark_read_path);
criterion_main!(benches);
