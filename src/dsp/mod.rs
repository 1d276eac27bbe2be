//! Low-level DSP primitives the feedback network is assembled from.
//!
//! Every component allocates once in its constructor and is realtime-safe
//! afterwards: no allocation, locking or logging on the per-sample path.
//! Parameter setters clamp instead of failing.

/// Damped lattice all-pass stage and prime length search.
pub mod allpass;
/// Modulated fractional delay line with crossfaded retiming.
pub mod delay;
/// Five-stage all-pass diffuser with equal-power blend.
pub mod diffuser;
/// Four-stage ladder filter with data-driven response presets.
pub mod filter;
/// Cubic B-spline readers for fractional positions.
pub mod interpolation;
/// Slow sine oscillator with smoothed amplitude.
pub mod lfo;
/// Equal-power pan/mix factors and decibel helpers.
pub mod mix;
/// One-pole smoothing stage.
pub mod one_pole;

pub use allpass::AllPassStage;
pub use delay::DelayLine;
pub use diffuser::DiffuserChain;
pub use filter::{FilterMode, LadderFilter};
pub use lfo::Lfo;
pub use mix::PanFactors;
pub use one_pole::OnePole;
