//! Test signal for the demo: short decaying sine plucks on a fixed beat grid.

use saavy_delay::dsp::mix::db_to_gain;

/// Level of each pluck's attack.
const PLUCK_LEVEL_DB: f32 = -6.0;

/// Plucked sine bursts, alternating between two pitches and panned
/// slightly apart so both delay channels get something to chew on.
pub struct PluckSource {
    sample_rate: f32,
    interval: usize,
    counter: usize,
    phase: f32,
    increment: f32,
    level: f32,
    decay: f32,
    pitches: [f32; 2],
    next_pitch: usize,
}

impl PluckSource {
    pub fn new(sample_rate: f32, bpm: f32, every_beats: f32) -> Self {
        let interval = (60.0 / bpm.max(1.0) * every_beats.max(0.125) * sample_rate) as usize;
        Self {
            sample_rate,
            interval: interval.max(1),
            counter: 0,
            phase: 0.0,
            increment: 0.0,
            level: 0.0,
            // ~80 ms to -60 dB
            decay: (-6.9 / (0.08 * sample_rate)).exp(),
            pitches: [440.0, 659.25],
            next_pitch: 0,
        }
    }

    fn trigger(&mut self) {
        let pitch = self.pitches[self.next_pitch];
        self.next_pitch = (self.next_pitch + 1) % self.pitches.len();
        self.increment = pitch / self.sample_rate;
        self.phase = 0.0;
        self.level = db_to_gain(PLUCK_LEVEL_DB);
    }

    /// Fill both sides. The left side leads slightly in level.
    pub fn render(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            if self.counter == 0 {
                self.trigger();
            }
            self.counter = (self.counter + 1) % self.interval;

            let value = (std::f32::consts::TAU * self.phase).sin() * self.level;
            self.phase = (self.phase + self.increment).fract();
            self.level *= self.decay;

            *l = value;
            *r = value * 0.7;
        }
    }
}
