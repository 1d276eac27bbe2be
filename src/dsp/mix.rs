//! Equal-power pan and dry/wet factors, plus decibel helpers.

/*
Equal-Power Mixing
==================

A linear crossfade (dry × (1 - m) + wet × m) dips in loudness around the
middle: two uncorrelated signals at 50% amplitude carry only half the power
of one signal at 100%. The delay's dry/wet and the diffuser's blend both
use the equal-power (pan-law) curve instead.

Vocabulary
----------

  pan angle   Normalized position from -1.0 (all left) to +1.0 (all right).
              For dry/wet blending "left" means dry and "right" means wet.

  mix         Normalized dry/wet amount, 0.0 to 1.0. Mapped onto the pan
              angle as angle = 2 × mix - 1.

  factors     The pair of gains {left, right} the two signals are scaled by.


The Math
--------

    θ     = angle × π/4
    left  = √2/2 × (cos θ - sin θ)
    right = √2/2 × (cos θ + sin θ)

    angle  -1.0   →  left 1.000, right 0.000
    angle   0.0   →  left 0.707, right 0.707   (-3 dB each)
    angle  +1.0   →  left 0.000, right 1.000

left² + right² = 1 for every angle, so the summed power of two uncorrelated
signals stays constant across the sweep:

    gain
      1.0 ┤╲___                 ___╱
          │    ╲__         __╱
     .707 ┤       ╲╳╳╳╳╳╱          ← both at -3 dB in the middle
          │    __╱       ╲__
      0.0 ┤___╱             ╲___
          └─────────────────────→ mix
          0.0       0.5       1.0

Angles at or beyond ±1 return the exact end-point factors so "fully dry"
multiplies the wet signal by a true zero.
*/

use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

/// Gain pair produced by the pan law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanFactors {
    pub left: f32,
    pub right: f32,
}

impl PanFactors {
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// `a × left + b × right`
    #[inline]
    pub fn blend(&self, a: f32, b: f32) -> f32 {
        a * self.left + b * self.right
    }
}

impl Default for PanFactors {
    fn default() -> Self {
        Self::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2)
    }
}

/// Equal-power pan factors for `angle` in [-1, 1].
pub fn pan_factors(angle: f32) -> PanFactors {
    if angle <= -1.0 {
        return PanFactors::new(1.0, 0.0);
    }
    if angle >= 1.0 {
        return PanFactors::new(0.0, 1.0);
    }
    let (sin, cos) = (angle * FRAC_PI_4).sin_cos();
    PanFactors::new(FRAC_1_SQRT_2 * (cos - sin), FRAC_1_SQRT_2 * (cos + sin))
}

/// Equal-power dry/wet factors for `mix` in [0, 1]. `left` scales the dry path.
pub fn mix_factors(mix: f32) -> PanFactors {
    pan_factors(mix * 2.0 - 1.0)
}

/// Blend `dry` into `wet` in place: `wet = dry × left + wet × right`.
#[inline]
pub fn apply_dry_wet(dry: &[f32], wet: &mut [f32], factors: PanFactors) {
    debug_assert_eq!(dry.len(), wet.len());

    for (wet_sample, &dry_sample) in wet.iter_mut().zip(dry.iter()) {
        *wet_sample = factors.blend(dry_sample, *wet_sample);
    }
}

pub fn db_to_gain(db: f32) -> f32 {
    10.0f32.powf(db / 20.0)
}

/// Gain to decibels. Zero or negative gain maps to negative infinity.
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        return f32::NEG_INFINITY;
    }
    20.0 * gain.log10()
}
