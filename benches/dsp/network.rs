//! End-to-end benchmarks for the stereo feedback network.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_delay::{DelaySettings, FeedbackNetwork, NetworkConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn network(settings: &DelaySettings) -> FeedbackNetwork {
    let mut network = match FeedbackNetwork::new(NetworkConfig::new(SAMPLE_RATE, 10.0)) {
        Ok(network) => network,
        Err(err) => panic!("bench network: {}", err),
    };
    network.apply_settings(settings);
    network.reset();
    network
}

pub fn bench_network(c: &mut Criterion) {
    let mut group = c.benchmark_group("network");

    let scenarios = [
        ("defaults", DelaySettings::default()),
        (
            "dense",
            DelaySettings {
                feedback: 0.8,
                cross_feedback: 0.4,
                diffuse: 0.7,
                resonance: 0.6,
                modulation_depth: 0.6,
                modulation_speed_hz: 2.0,
                ..DelaySettings::default()
            },
        ),
    ];

    for &size in BLOCK_SIZES {
        let left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.07).sin() * 0.5).collect();
        let right: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).cos() * 0.5).collect();
        let mut out_left = vec![0.0; size];
        let mut out_right = vec![0.0; size];

        for (name, settings) in &scenarios {
            let mut net = network(settings);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    net.process_block(
                        black_box(&left),
                        black_box(&right),
                        black_box(&mut out_left),
                        black_box(&mut out_right),
                    )
                })
            });
        }

        // tempo change every block keeps both lines crossfading
        let mut net = network(&DelaySettings::default());
        let mut fast = false;
        group.bench_with_input(BenchmarkId::new("tempo_changes", size), &size, |b, _| {
            b.iter(|| {
                fast = !fast;
                net.set_bpm(if fast { 140.0 } else { 100.0 });
                net.process_block(
                    black_box(&left),
                    black_box(&right),
                    black_box(&mut out_left),
                    black_box(&mut out_right),
                )
            })
        });
    }

    group.finish();
}
