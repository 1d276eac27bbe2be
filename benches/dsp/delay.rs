//! Benchmarks for the interpolating delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_delay::dsp::delay::DelayLine;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_seconds: &[f32] = &[0.01, 0.1, 1.0];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut output = vec![0.0; size];

        for &seconds in delay_seconds {
            let mut delay = DelayLine::new(SAMPLE_RATE, 2.0);
            delay.set_time(seconds);
            delay.reset();
            group.bench_with_input(
                BenchmarkId::new(format!("static_{}ms", (seconds * 1000.0) as u32), size),
                &size,
                |b, _| b.iter(|| delay.process_block(black_box(&input), black_box(&mut output))),
            );
        }

        // LFO-modulated read position
        let mut delay = DelayLine::new(SAMPLE_RATE, 2.0);
        delay.set_time(0.25);
        delay.reset();
        delay.set_modulation_depth(40.0);
        delay.set_modulation_speed(0.5);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| delay.process_block(black_box(&input), black_box(&mut output)))
        });

        // Permanently crossfading between two read positions
        let mut delay = DelayLine::new(SAMPLE_RATE, 2.0);
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("retiming", size), &size, |b, _| {
            b.iter(|| {
                if !delay.is_retiming() {
                    toggle = !toggle;
                    delay.set_time(if toggle { 0.5 } else { 0.25 });
                }
                delay.process_block(black_box(&input), black_box(&mut output))
            })
        });
    }

    group.finish();
}
