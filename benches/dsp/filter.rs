//! Benchmarks for the four-pole ladder filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_delay::dsp::filter::{FilterMode, LadderFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    let modes = [
        ("lp24", FilterMode::Lp24),
        ("hp12", FilterMode::Hp12),
        ("phaser24", FilterMode::Phaser24),
    ];

    for &size in BLOCK_SIZES {
        // sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, mode) in modes {
            let mut filter = LadderFilter::with_cutoff(SAMPLE_RATE, 1000.0);
            filter.set_mode(mode);
            filter.set_resonance(0.5);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer));
                })
            });
        }

        // cutoff ramp restarted every block
        let mut filter = LadderFilter::with_cutoff(SAMPLE_RATE, 1000.0);
        let mut high = false;
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("sweeping", size), &size, |b, _| {
            b.iter(|| {
                high = !high;
                filter.set_cutoff(if high { 6000.0 } else { 500.0 });
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
