//! Benchmarks for the all-pass diffuser chain.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_delay::dsp::diffuser::DiffuserChain;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_diffuser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/diffuser");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut output = vec![0.0; size];

        let mut diffuser = DiffuserChain::new(SAMPLE_RATE);
        diffuser.set_mix(0.5);
        group.bench_with_input(BenchmarkId::new("chain", size), &size, |b, _| {
            b.iter(|| diffuser.process_block(black_box(&input), black_box(&mut output)))
        });

        // mix at zero takes the bypass path
        let mut diffuser = DiffuserChain::new(SAMPLE_RATE);
        diffuser.set_mix(0.0);
        group.bench_with_input(BenchmarkId::new("bypassed", size), &size, |b, _| {
            b.iter(|| diffuser.process_block(black_box(&input), black_box(&mut output)))
        });
    }

    group.finish();
}
