//! Criterion benchmarks for the protocol decoder.
//!
//! The decoder runs once per polling tick, so its per-byte cost must stay
//! negligible next to the poll interval.
//!
//! Run with:
//! ```bash
//! cargo bench --package tourbox-core --bench decoder_bench
//! ```

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tourbox_core::Decoder;

/// A burst covering every decoder path: immediate buttons, scroll, a double
/// activation, an interrupted candidate, and an unknown byte.
const BURST: &[u8] = &[0x49, 0x09, 0x90, 0x81, 0x21, 0x82, 0x91, 0xEE, 0x37, 0x44];

fn bench_decoder_single_byte(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");
    let t0 = Instant::now();

    group.bench_function("feed_immediate_button", |b| {
        let mut decoder = Decoder::new();
        b.iter(|| decoder.feed(black_box(Some(0x90)), t0))
    });

    group.bench_function("feed_empty_tick_idle", |b| {
        let mut decoder = Decoder::new();
        b.iter(|| decoder.feed(black_box(None), t0))
    });

    group.bench_function("feed_double_activation_pair", |b| {
        let mut decoder = Decoder::new();
        b.iter(|| {
            decoder.feed(black_box(Some(0x81)), t0);
            decoder.feed(black_box(Some(0x21)), t0 + Duration::from_millis(1))
        })
    });

    group.finish();
}

fn bench_decoder_burst(c: &mut Criterion) {
    let t0 = Instant::now();
    c.bench_function("decoder_burst_10", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            let mut count = 0usize;
            for (i, &byte) in BURST.iter().enumerate() {
                let now = t0 + Duration::from_millis(i as u64);
                count += decoder.feed_all(black_box(Some(byte)), now).count();
            }
            count += decoder.feed_all(None, t0 + Duration::from_secs(1)).count();
            count
        })
    });
}

criterion_group!(benches, bench_decoder_single_byte, bench_decoder_burst);
criterion_main!(benches);
