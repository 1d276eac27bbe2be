#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::one_pole::{pole_for_cutoff, OnePole};

/*
Four-Stage Ladder Filter
========================

Four one-pole lowpass stages in series, all sharing one pole coefficient.
Each stage adds 6 dB/octave of rolloff, so tapping the chain after stage N
gives an N × 6 dB lowpass. Mixing the taps with signed weights turns the
same four stages into highpass, bandpass, notch and phaser responses.

                  ┌──────────────(× resonance)──────────────────┐
                  ▼                                             │
    input ──→ (-) ── feed ─→ [LP] ─ s1 ─→ [LP] ─ s2 ─→ [LP] ─ s3 ─→ [LP] ─ s4 ─┘
                      │              │             │             │           │
                      c0             c1            c2            c3          c4
                      └──────────────┴─────── Σ ───┴─────────────┴───────────┘ → output

Vocabulary
----------

  pole          Shared one-pole coefficient, exp(-2π · cutoff / sample_rate).
                Zero at or above Nyquist, which turns every stage into a wire.

  resonance     Normalized 0..1, scaled ×4. The fourth stage output is
                subtracted from the input; near 1.0 the filter self-oscillates.
                The fed-back tap is clamped to ±4 so it stays bounded.

  coefficients  Five weights {c0..c4} applied to {feed, s1, s2, s3, s4}.
                They are plain data; see FilterMode for the named sets.


Coefficient Sets
----------------

    mode          feed  s1   s2   s3   s4
    Lp6            0    1    0    0    0
    Lp24           0    0    0    0    1
    Hp6            1   -1    0    0    0      input minus its lowpass
    Hp24           1   -4    6   -4    1      binomial expansion of (1 - LP)^4
    Bp6            0   -2    2    0    0

Highpass weights come from expanding (1 - H)^n where H is one lowpass stage;
bandpass and notch sets combine highpass and lowpass terms the same way.


Pole Smoothing
--------------

A jump in cutoff is a jump in the pole, which clicks when the stages hold a
lot of energy. set_cutoff() ramps the pole linearly over `smoothing_steps`
samples (256 by default) and then snaps it to the exact target. With
smoothing_steps = 0 the change is immediate.
*/

/// Samples a cutoff change is spread over unless configured otherwise.
pub const DEFAULT_SMOOTHING_STEPS: usize = 256;

/// Feedback tap bound.
const STAGE_CLAMP: f32 = 4.0;

/// Named coefficient sets for the ladder's output mixer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FilterMode {
    Lp6,
    Lp12,
    Lp18,
    #[default]
    Lp24,
    Bp6,
    Bp12,
    Hp6,
    Hp12,
    Hp18,
    Hp24,
    Phaser12,
    Phaser24,
    DoubleNotch,
    Notch12,
    Hp12Lp6,
    Hp18Lp6,
    Notch12Lp6,
    Allpass18Lp6,
    Custom([f32; 5]),
}

impl FilterMode {
    /// Every named preset, in display order.
    pub const PRESETS: [FilterMode; 18] = [
        FilterMode::Lp6,
        FilterMode::Lp12,
        FilterMode::Lp18,
        FilterMode::Lp24,
        FilterMode::Bp6,
        FilterMode::Bp12,
        FilterMode::Hp6,
        FilterMode::Hp12,
        FilterMode::Hp18,
        FilterMode::Hp24,
        FilterMode::Phaser12,
        FilterMode::Phaser24,
        FilterMode::DoubleNotch,
        FilterMode::Notch12,
        FilterMode::Hp12Lp6,
        FilterMode::Hp18Lp6,
        FilterMode::Notch12Lp6,
        FilterMode::Allpass18Lp6,
    ];

    /// Weights for {feed, stage1, stage2, stage3, stage4}.
    pub fn coefficients(&self) -> [f32; 5] {
        match self {
            FilterMode::Lp6 => [0.0, 1.0, 0.0, 0.0, 0.0],
            FilterMode::Lp12 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::Lp18 => [0.0, 0.0, 0.0, 1.0, 0.0],
            FilterMode::Lp24 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::Bp6 => [0.0, -2.0, 2.0, 0.0, 0.0],
            FilterMode::Bp12 => [0.0, 0.0, 4.0, -8.0, 4.0],
            FilterMode::Hp6 => [1.0, -1.0, 0.0, 0.0, 0.0],
            FilterMode::Hp12 => [1.0, -2.0, 1.0, 0.0, 0.0],
            FilterMode::Hp18 => [1.0, -3.0, 3.0, -1.0, 0.0],
            FilterMode::Hp24 => [1.0, -4.0, 6.0, -4.0, 1.0],
            FilterMode::Phaser12 => [1.0, -2.0, 2.0, 0.0, 0.0],
            FilterMode::Phaser24 => [1.0, -4.0, 12.0, -16.0, 8.0],
            FilterMode::DoubleNotch => [1.0, -4.0, 11.0, -14.0, 7.0],
            FilterMode::Notch12 => [1.0, -2.0, 2.0, 0.0, 0.0],
            FilterMode::Hp12Lp6 => [0.0, -3.0, 6.0, -3.0, 0.0],
            FilterMode::Hp18Lp6 => [0.0, -3.0, 9.0, -9.0, 3.0],
            FilterMode::Notch12Lp6 => [0.0, -1.0, 2.0, -2.0, 0.0],
            FilterMode::Allpass18Lp6 => [0.0, -1.0, 3.0, -6.0, 4.0],
            FilterMode::Custom(c) => *c,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::Lp6 => "LP 6",
            FilterMode::Lp12 => "LP 12",
            FilterMode::Lp18 => "LP 18",
            FilterMode::Lp24 => "LP 24",
            FilterMode::Bp6 => "BP 6",
            FilterMode::Bp12 => "BP 12",
            FilterMode::Hp6 => "HP 6",
            FilterMode::Hp12 => "HP 12",
            FilterMode::Hp18 => "HP 18",
            FilterMode::Hp24 => "HP 24",
            FilterMode::Phaser12 => "Phaser 12",
            FilterMode::Phaser24 => "Phaser 24",
            FilterMode::DoubleNotch => "Double Notch",
            FilterMode::Notch12 => "Notch 12",
            FilterMode::Hp12Lp6 => "HP 12 + LP 6",
            FilterMode::Hp18Lp6 => "HP 18 + LP 6",
            FilterMode::Notch12Lp6 => "Notch 12 + LP 6",
            FilterMode::Allpass18Lp6 => "Allpass 18 + LP 6",
            FilterMode::Custom(_) => "Custom",
        }
    }
}

pub struct LadderFilter {
    sample_rate: f32,
    stages: [OnePole; 4],
    pole: f32,
    target_pole: f32,
    pole_step: f32,
    smoothing_steps: usize,
    smoothing_remaining: usize,
    cutoff_hz: f32,
    resonance: f32,
    feedback_tap: f32,
    mode: FilterMode,
    coefficients: [f32; 5],
}

impl LadderFilter {
    /// A 24 dB lowpass at 1 kHz, no resonance. The initial pole is not ramped.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_cutoff(sample_rate, 1000.0)
    }

    pub fn with_cutoff(sample_rate: f32, cutoff_hz: f32) -> Self {
        let pole = pole_for_cutoff(cutoff_hz, sample_rate);
        let mode = FilterMode::default();
        let mut stages: [OnePole; 4] = std::array::from_fn(|_| OnePole::new(sample_rate));
        for stage in &mut stages {
            stage.set_pole(pole);
        }

        Self {
            sample_rate,
            stages,
            pole,
            target_pole: pole,
            pole_step: 0.0,
            smoothing_steps: DEFAULT_SMOOTHING_STEPS,
            smoothing_remaining: 0,
            cutoff_hz,
            resonance: 0.0,
            feedback_tap: 0.0,
            mode,
            coefficients: mode.coefficients(),
        }
    }

    pub fn set_smoothing_steps(&mut self, steps: usize) {
        self.smoothing_steps = steps;
    }

    /// New cutoff in Hz. Values at or above Nyquist bypass the stages.
    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(0.0);
        self.target_pole = pole_for_cutoff(self.cutoff_hz, self.sample_rate);

        if self.smoothing_steps == 0 {
            self.apply_pole(self.target_pole);
            self.smoothing_remaining = 0;
        } else {
            self.pole_step = (self.target_pole - self.pole) / self.smoothing_steps as f32;
            self.smoothing_remaining = self.smoothing_steps;
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    /// Normalized resonance in [0, 1].
    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.0, 1.0) * STAGE_CLAMP;
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.coefficients = mode.coefficients();
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Pole currently in use (mid-ramp while smoothing).
    pub fn current_pole(&self) -> f32 {
        self.pole
    }

    pub fn target_pole(&self) -> f32 {
        self.target_pole
    }

    pub fn is_smoothing(&self) -> bool {
        self.smoothing_remaining > 0
    }

    #[inline]
    fn apply_pole(&mut self, pole: f32) {
        self.pole = pole;
        for stage in &mut self.stages {
            stage.set_pole(pole);
        }
    }

    #[inline]
    pub fn step(&mut self, input: f32) -> f32 {
        if self.smoothing_remaining > 0 {
            self.smoothing_remaining -= 1;
            let pole = if self.smoothing_remaining == 0 {
                self.target_pole
            } else {
                self.pole + self.pole_step
            };
            self.apply_pole(pole);
        }

        let feed = input - self.feedback_tap * self.resonance;
        let s1 = self.stages[0].next_sample(feed);
        let s2 = self.stages[1].next_sample(s1);
        let s3 = self.stages[2].next_sample(s2);
        let s4 = self.stages[3].next_sample(s3).clamp(-STAGE_CLAMP, STAGE_CLAMP);
        self.feedback_tap = s4;

        let c = &self.coefficients;
        c[0] * feed + c[1] * s1 + c[2] * s2 + c[3] * s3 + c[4] * s4
    }

    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());

        for (out, &sample) in output.iter_mut().zip(input.iter()) {
            *out = self.step(sample);
        }
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.step(*sample);
        }
    }

    /// Clear stage memory and finish any pole ramp.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.feedback_tap = 0.0;
        if self.smoothing_remaining > 0 {
            self.smoothing_remaining = 0;
            self.apply_pole(self.target_pole);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    /// Peak amplitude after the first half of the buffer (skip transient).
    fn peak_after_transient(buffer: &[f32]) -> f32 {
        buffer[buffer.len() / 2..]
            .iter()
            .fold(0.0f32, |peak, x| peak.max(x.abs()))
    }

    #[test]
    fn test_cutoff_above_nyquist_passes_input_unchanged() {
        for mode in [FilterMode::Lp24, FilterMode::Lp6, FilterMode::Lp12] {
            let mut filter = LadderFilter::with_cutoff(48_000.0, 100_000.0);
            filter.set_mode(mode);
            assert_eq!(filter.current_pole(), 0.0);

            let input = sine(1234.0, 48_000.0, 512);
            let mut output = vec![0.0; 512];
            filter.process_block(&input, &mut output);
            assert_eq!(input, output, "{} should be a wire", mode.name());
        }
    }

    #[test]
    fn test_lowpass_rejects_high_frequencies() {
        let mut filter = LadderFilter::with_cutoff(48_000.0, 500.0);

        let mut low = sine(100.0, 48_000.0, 9600);
        let mut high = sine(10_000.0, 48_000.0, 9600);
        filter.render(&mut low);
        filter.reset();
        filter.render(&mut high);

        let low_peak = peak_after_transient(&low);
        let high_peak = peak_after_transient(&high);
        assert!(low_peak > 0.8, "passband peak {}", low_peak);
        assert!(high_peak < 0.001, "stopband peak {}", high_peak);
    }

    #[test]
    fn test_highpass_rejects_dc() {
        let mut filter = LadderFilter::with_cutoff(48_000.0, 1000.0);
        filter.set_mode(FilterMode::Hp24);

        let mut buffer = vec![1.0; 48_000];
        filter.render(&mut buffer);
        assert!(buffer[47_999].abs() < 1e-3, "DC leak {}", buffer[47_999]);
    }

    #[test]
    fn test_dc_gain_follows_coefficient_sum() {
        let lowpasses = [
            FilterMode::Lp6,
            FilterMode::Lp12,
            FilterMode::Lp18,
            FilterMode::Lp24,
        ];
        for mode in lowpasses {
            assert_eq!(mode.coefficients().iter().sum::<f32>(), 1.0);
        }
        let rejecting = [
            FilterMode::Hp6,
            FilterMode::Hp12,
            FilterMode::Hp18,
            FilterMode::Hp24,
            FilterMode::Bp6,
            FilterMode::Bp12,
        ];
        for mode in rejecting {
            assert_eq!(mode.coefficients().iter().sum::<f32>(), 0.0);
        }
    }

    #[test]
    fn test_presets_are_distinct_data() {
        assert_eq!(FilterMode::PRESETS.len(), 18);
        assert_eq!(
            FilterMode::Phaser24.coefficients(),
            [1.0, -4.0, 12.0, -16.0, 8.0]
        );
        assert_eq!(
            FilterMode::Custom([0.5, 0.0, 0.0, 0.0, 0.5]).coefficients(),
            [0.5, 0.0, 0.0, 0.0, 0.5]
        );
    }

    #[test]
    fn test_pole_ramps_linearly_then_snaps() {
        let mut filter = LadderFilter::with_cutoff(48_000.0, 1000.0);
        let start = filter.current_pole();

        filter.set_cutoff(4000.0);
        let target = filter.target_pole();
        assert!(filter.is_smoothing());

        for _ in 0..DEFAULT_SMOOTHING_STEPS / 2 {
            filter.step(0.0);
        }
        let halfway = (start + target) * 0.5;
        assert!(
            (filter.current_pole() - halfway).abs() < 1e-4,
            "pole {} expected near {}",
            filter.current_pole(),
            halfway
        );

        for _ in 0..DEFAULT_SMOOTHING_STEPS / 2 {
            filter.step(0.0);
        }
        assert!(!filter.is_smoothing());
        assert_eq!(filter.current_pole(), target);
    }

    #[test]
    fn test_zero_smoothing_steps_is_immediate() {
        let mut filter = LadderFilter::with_cutoff(48_000.0, 1000.0);
        filter.set_smoothing_steps(0);
        filter.set_cutoff(30_000.0);
        assert!(!filter.is_smoothing());
        assert_eq!(filter.current_pole(), 0.0);
    }

    #[test]
    fn test_full_resonance_stays_bounded() {
        let mut filter = LadderFilter::with_cutoff(48_000.0, 2000.0);
        filter.set_resonance(1.0);

        let mut buffer = vec![0.0; 48_000];
        buffer[0] = 1.0;
        filter.render(&mut buffer);

        for (i, &x) in buffer.iter().enumerate() {
            assert!(x.is_finite(), "non-finite output at {}", i);
            assert!(x.abs() <= STAGE_CLAMP, "output {} escaped clamp at {}", x, i);
        }
    }

    #[test]
    fn test_resonance_boosts_cutoff_region() {
        let mut plain = LadderFilter::with_cutoff(48_000.0, 1000.0);
        let mut resonant = LadderFilter::with_cutoff(48_000.0, 1000.0);
        resonant.set_resonance(0.5);

        // Each stage shifts 45° at the cutoff, so the feedback adds in phase there.
        let mut a = sine(1000.0, 48_000.0, 9600);
        let mut b = a.clone();
        plain.render(&mut a);
        resonant.render(&mut b);

        assert!(peak_after_transient(&b) > peak_after_transient(&a));
    }
}
