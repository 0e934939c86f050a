//! Criterion benchmarks for the relay hot paths
//!
//! Covers: ring staging, raw-to-consumer conversion, and a full
//! send-through-bridge burst with a trivial consumer.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hook_relay::relay::bridge::Bridge;
use hook_relay::relay::ring::RingStore;
use hook_relay::relay::types::{keycode, EventKind, HookEvent, RawEvent};

fn make_key(time: u64) -> RawEvent {
    RawEvent::keyboard(EventKind::KeyPressed, time, 0, keycode::A, 30, 0)
}

fn bench_ring_store(c: &mut Criterion) {
    c.bench_function("ring_store", |b| {
        let mut ring = RingStore::new(256);
        let event = make_key(1);
        b.iter(|| {
            black_box(ring.store(black_box(event)).time);
        });
    });
}

fn bench_convert_event(c: &mut Criterion) {
    c.bench_function("convert_event", |b| {
        let raw = make_key(1);
        b.iter(|| {
            black_box(HookEvent::from_raw(black_box(&raw)));
        });
    });
}

fn bench_bridge_burst(c: &mut Criterion) {
    c.bench_function("bridge_burst_64", |b| {
        b.iter_batched(
            || {
                let mut bridge = Bridge::new(64);
                bridge.open(Box::new(|_event: HookEvent| {})).unwrap();
                bridge
            },
            |mut bridge| {
                let sender = bridge.sender();
                for i in 0..64 {
                    sender.send(make_key(i)).unwrap();
                }
                bridge.close();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_ring_store,
    bench_convert_event,
    bench_bridge_burst
);
criterion_main!(benches);
