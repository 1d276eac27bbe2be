//! Series chain of damped all-pass stages with an equal-power dry/wet blend.
//!
//! ```text
//! input ──┬──→ [AP 1] → [AP 2] → [AP 3] → [AP 4] → [AP 5] ──(× wet)──┐
//!         │                                                           ▼
//!         └──────────────────────────────────────────(× dry)──────→ (+) ──→ output
//! ```
//!
//! Each stage length is a prime picked from a width quoted at 48 kHz, so the
//! chain sounds the same at any sample rate. The two stereo channels use
//! different widths ([`LEFT_WIDTHS_48K`], [`RIGHT_WIDTHS_48K`]) which keeps
//! their tails decorrelated.
//!
//! When either the stage feedback or the wet factor is exactly zero the
//! chain is skipped and the input is copied through unchanged.

use crate::dsp::allpass::AllPassStage;
use crate::dsp::mix::{apply_dry_wet, mix_factors, PanFactors};
use crate::REFERENCE_SAMPLE_RATE;

/// Number of all-pass stages in a chain.
pub const DIFFUSER_STAGES: usize = 5;

/// Longest stage the chain allocates for, quoted at 48 kHz.
pub const MAX_STAGE_LENGTH_48K: usize = 5000;

pub const DEFAULT_FEEDBACK: f32 = 0.65;
pub const DEFAULT_CUTOFF_HZ: f32 = 8000.0;

/// Stage widths for the left channel at 48 kHz.
pub const LEFT_WIDTHS_48K: [usize; DIFFUSER_STAGES] = [172, 229, 447, 611, 1176];
/// Stage widths for the right channel at 48 kHz.
pub const RIGHT_WIDTHS_48K: [usize; DIFFUSER_STAGES] = [182, 219, 437, 631, 1098];

pub struct DiffuserChain {
    sample_rate: f32,
    stages: [AllPassStage; DIFFUSER_STAGES],
    feedback: f32,
    mix: PanFactors,
}

impl DiffuserChain {
    /// A chain with default feedback and damping, stages at their minimum length.
    pub fn new(sample_rate: f32) -> Self {
        let max_length = (MAX_STAGE_LENGTH_48K as f32 * sample_rate / REFERENCE_SAMPLE_RATE)
            as usize;
        let stages = std::array::from_fn(|_| {
            let mut stage = AllPassStage::new(sample_rate, max_length);
            stage.set_feedback(DEFAULT_FEEDBACK);
            stage.set_lowpass_cutoff(DEFAULT_CUTOFF_HZ);
            stage
        });

        Self {
            sample_rate,
            stages,
            feedback: DEFAULT_FEEDBACK,
            mix: PanFactors::default(),
        }
    }

    /// A chain with every stage sized from `widths_48k`.
    pub fn with_widths(sample_rate: f32, widths_48k: &[usize; DIFFUSER_STAGES]) -> Self {
        let mut chain = Self::new(sample_rate);
        for (index, &width) in widths_48k.iter().enumerate() {
            chain.set_element_size(index, width);
        }
        chain
    }

    /// Resize stage `index` to the prime nearest above `width_48k`, rescaled
    /// to this chain's sample rate. Out-of-range indices are ignored.
    pub fn set_element_size(&mut self, index: usize, width_48k: usize) {
        let Some(stage) = self.stages.get_mut(index) else {
            return;
        };
        let width = (width_48k as f32 * self.sample_rate / REFERENCE_SAMPLE_RATE) as usize;
        stage.set_size_prime(width);
    }

    pub fn element_sizes(&self) -> [usize; DIFFUSER_STAGES] {
        std::array::from_fn(|i| self.stages[i].size())
    }

    /// Damping cutoff of every stage.
    pub fn set_cutoff(&mut self, hz: f32) {
        for stage in &mut self.stages {
            stage.set_lowpass_cutoff(hz);
        }
    }

    /// All-pass gain of every stage, clamped strictly inside (-1, 1).
    pub fn set_feedback(&mut self, gain: f32) {
        for stage in &mut self.stages {
            stage.set_feedback(gain);
        }
        self.feedback = self.stages[0].feedback();
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Dry/wet amount in [0, 1], mapped through the equal-power law.
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix_factors(mix.clamp(0.0, 1.0));
    }

    pub fn mix(&self) -> PanFactors {
        self.mix
    }

    fn is_bypassed(&self) -> bool {
        self.feedback == 0.0 || self.mix.right == 0.0
    }

    #[inline]
    pub fn step(&mut self, input: f32) -> f32 {
        if self.is_bypassed() {
            return input;
        }
        let mut wet = input;
        for stage in &mut self.stages {
            wet = stage.step(wet);
        }
        self.mix.blend(input, wet)
    }

    /// Diffuse `input` into `output`. Both slices must have the same length.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());

        output.copy_from_slice(input);
        if self.is_bypassed() {
            return;
        }
        for stage in &mut self.stages {
            stage.render(output);
        }
        apply_dry_wet(input, output, self.mix);
    }

    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(len: usize) -> Vec<f32> {
        let mut seed = 0x1234_5678u32;
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (seed >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_zero_mix_is_exact_bypass() {
        let mut chain = DiffuserChain::with_widths(48_000.0, &LEFT_WIDTHS_48K);
        chain.set_mix(0.0);

        let input = noise(2048);
        let mut output = vec![0.0; 2048];
        chain.process_block(&input, &mut output);
        assert_eq!(input, output);
    }

    #[test]
    fn test_zero_feedback_is_exact_bypass() {
        let mut chain = DiffuserChain::with_widths(48_000.0, &RIGHT_WIDTHS_48K);
        chain.set_mix(0.8);
        chain.set_feedback(0.0);

        let input = noise(2048);
        let mut output = vec![0.0; 2048];
        chain.process_block(&input, &mut output);
        assert_eq!(input, output);

        for &x in input.iter().take(64) {
            assert_eq!(chain.step(x), x);
        }
    }

    #[test]
    fn test_stage_sizes_are_primes_per_channel() {
        let left = DiffuserChain::with_widths(48_000.0, &LEFT_WIDTHS_48K);
        assert_eq!(left.element_sizes(), [173, 229, 449, 613, 1181]);

        let right = DiffuserChain::with_widths(48_000.0, &RIGHT_WIDTHS_48K);
        assert_eq!(right.element_sizes(), [191, 223, 439, 631, 1103]);
    }

    #[test]
    fn test_stage_sizes_scale_with_sample_rate() {
        let chain = DiffuserChain::with_widths(96_000.0, &LEFT_WIDTHS_48K);
        let sizes = chain.element_sizes();
        for (size, width) in sizes.iter().zip(LEFT_WIDTHS_48K.iter()) {
            assert!(
                *size >= width * 2 && *size < width * 2 + 60,
                "size {} for width {}",
                size,
                width
            );
            assert!(crate::dsp::allpass::is_prime(*size));
        }
    }

    #[test]
    fn test_impulse_is_spread_in_time() {
        let mut chain = DiffuserChain::with_widths(48_000.0, &LEFT_WIDTHS_48K);
        chain.set_mix(1.0);

        let mut input = vec![0.0; 8192];
        input[0] = 1.0;
        let mut output = vec![0.0; 8192];
        chain.process_block(&input, &mut output);

        let busy = output.iter().filter(|x| x.abs() > 1e-4).count();
        assert!(busy > 500, "only {} non-silent samples", busy);
        assert!(output.iter().all(|x| x.is_finite() && x.abs() < 2.0));
    }

    #[test]
    fn test_block_and_step_agree() {
        let mut by_block = DiffuserChain::with_widths(48_000.0, &LEFT_WIDTHS_48K);
        let mut by_step = DiffuserChain::with_widths(48_000.0, &LEFT_WIDTHS_48K);
        by_block.set_mix(0.5);
        by_step.set_mix(0.5);

        let input = noise(1024);
        let mut output = vec![0.0; 1024];
        by_block.process_block(&input, &mut output);

        for (i, (&x, &expected)) in input.iter().zip(output.iter()).enumerate() {
            let got = by_step.step(x);
            assert!(
                (got - expected).abs() < 1e-6,
                "mismatch at {}: {} vs {}",
                i,
                got,
                expected
            );
        }
    }
}
