//! Low Frequency Oscillator (LFO) driving delay-time modulation.

/*
Slow Sine LFO
=============

The delay line wobbles its read head with a slow sine so repeats drift in
pitch slightly, like tape. This oscillator is built for that one job.

Vocabulary
----------

  phase       Position inside one cycle, 0.0 to 1.0. Kept in f64 so a
              0.01 Hz LFO still advances by a representable amount each
              sample and does not drift over hours of playback.

  advance     Phase increment per sample: frequency / sample_rate.

  amplitude   Peak output value. For delay modulation this is measured in
              samples of read-head displacement.


Frequency vs Amplitude Changes
------------------------------

Frequency changes apply immediately. The phase is continuous, so a new
speed only bends the waveform; there is no jump in the output value.

Amplitude changes are different: switching from 2.0 to 20.0 in one sample
would move the read head by 18 samples at once, an audible click. Instead
the amplitude ramps linearly over AMPLITUDE_SMOOTHING_STEPS samples and
then snaps to the exact target so rounding in the ramp never accumulates.

    amplitude
      20 ┤            ╭──────────
         │          ╱
         │        ╱    1024 samples
       2 ┤──────╯
         └──────┬───────────────→ time
           change_amplitude()


Quadrature Output
-----------------

tick_sine() and tick_cosine() read the same phase 90° apart. Each call
advances the oscillator, so call exactly one of them per sample.


Limits
------

Only meant for slow modulation, well below sample_rate / 6. reset() moves
the phase back to zero on purpose, which is a discontinuity.
*/

use std::f64::consts::TAU;

/// Number of samples an amplitude change is spread over.
pub const AMPLITUDE_SMOOTHING_STEPS: usize = 1024;

#[derive(Debug, Clone)]
pub struct Lfo {
    sample_rate: f32,
    phase: f64,
    advance: f64,
    amplitude: f32,
    target_amplitude: f32,
    amplitude_step: f32,
    smoothing_remaining: usize,
    last_sine: f32,
    last_cosine: f32,
}

impl Lfo {
    /// A silent oscillator (0 Hz, amplitude 0) at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            advance: 0.0,
            amplitude: 0.0,
            target_amplitude: 0.0,
            amplitude_step: 0.0,
            smoothing_remaining: 0,
            last_sine: 0.0,
            last_cosine: 0.0,
        }
    }

    /// Restart at phase zero with a new frequency and amplitude (no smoothing).
    pub fn reset(&mut self, frequency: f32, amplitude: f32) {
        self.phase = 0.0;
        self.amplitude = amplitude;
        self.target_amplitude = amplitude;
        self.amplitude_step = 0.0;
        self.smoothing_remaining = 0;
        self.last_sine = 0.0;
        self.last_cosine = amplitude;
        self.change_frequency(frequency);
    }

    pub fn change_frequency(&mut self, frequency: f32) {
        self.advance = frequency as f64 / self.sample_rate as f64;
    }

    /// Ramp towards `target` over [`AMPLITUDE_SMOOTHING_STEPS`] samples.
    pub fn change_amplitude(&mut self, target: f32) {
        self.target_amplitude = target;
        self.smoothing_remaining = AMPLITUDE_SMOOTHING_STEPS;
        self.amplitude_step = (target - self.amplitude) / AMPLITUDE_SMOOTHING_STEPS as f32;
    }

    pub fn frequency(&self) -> f32 {
        (self.advance * self.sample_rate as f64) as f32
    }

    /// Current (possibly mid-ramp) amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn target_amplitude(&self) -> f32 {
        self.target_amplitude
    }

    pub fn is_smoothing(&self) -> bool {
        self.smoothing_remaining > 0
    }

    /// Advance one sample.
    #[inline]
    pub fn tick(&mut self) {
        if self.smoothing_remaining > 0 {
            self.amplitude += self.amplitude_step;
            self.smoothing_remaining -= 1;
            if self.smoothing_remaining == 0 {
                self.amplitude = self.target_amplitude;
            }
        }

        self.phase += self.advance;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        } else if self.phase < 0.0 {
            self.phase += 1.0;
        }

        let (sin, cos) = (self.phase * TAU).sin_cos();
        self.last_sine = sin as f32 * self.amplitude;
        self.last_cosine = cos as f32 * self.amplitude;
    }

    /// Advance and return the sine output. Call once per sample.
    #[inline]
    pub fn tick_sine(&mut self) -> f32 {
        self.tick();
        self.last_sine
    }

    /// Advance and return the cosine output. Call once per sample.
    #[inline]
    pub fn tick_cosine(&mut self) -> f32 {
        self.tick();
        self.last_cosine
    }

    #[inline]
    pub fn last_sine(&self) -> f32 {
        self.last_sine
    }

    #[inline]
    pub fn last_cosine(&self) -> f32 {
        self.last_cosine
    }

    /// Fill `buffer` with consecutive sine outputs.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.tick_sine();
        }
    }
}
