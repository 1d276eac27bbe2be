use std::f32::consts::TAU;

/*
One-Pole Smoothing Stage
========================

The smallest recursive filter there is: each output moves a fixed fraction of
the way from the previous output towards the input.

    y[n] = x[n] + p * (y[n-1] - x[n])

  p = 0     output follows input exactly (bypass)
  p → 1     output barely moves (very low cutoff)

The pole is derived from the cutoff with the impulse-invariant mapping

    p = exp(-2π · cutoff / sample_rate)

Anything at or above Nyquist collapses to p = 0, so "cutoff = sample_rate"
is an exact, lag-free bypass rather than a numerically tiny pole.

The stage is reused in three places:
  - the four cascaded stages of the ladder filter (sharing one pole)
  - the damping filter inside each all-pass diffuser stage
  - anywhere a cheap lowpass / DC tracker is handy
*/

/// Compute the one-pole coefficient for `cutoff_hz` at `sample_rate`.
///
/// Returns `0.0` (exact bypass) when the cutoff is at or above Nyquist.
#[inline]
pub fn pole_for_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    if cutoff_hz >= sample_rate * 0.5 {
        0.0
    } else {
        (-TAU * cutoff_hz.max(0.0) / sample_rate).exp()
    }
}

/// Exponential smoothing filter with a single persisted state value.
#[derive(Debug, Clone)]
pub struct OnePole {
    sample_rate: f32,
    pole: f32,
    state: f32,
}

impl OnePole {
    /// A bypassed stage (pole = 0) at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            pole: 0.0,
            state: 0.0,
        }
    }

    pub fn with_cutoff(sample_rate: f32, cutoff_hz: f32) -> Self {
        let mut stage = Self::new(sample_rate);
        stage.set_cutoff(cutoff_hz);
        stage
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.pole = pole_for_cutoff(cutoff_hz, self.sample_rate);
    }

    /// Set the raw pole coefficient directly (used by the ladder's smoothing ramp).
    #[inline]
    pub fn set_pole(&mut self, pole: f32) {
        self.pole = pole;
    }

    #[inline]
    pub fn pole(&self) -> f32 {
        self.pole
    }

    #[inline]
    pub fn state(&self) -> f32 {
        self.state
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        self.state = input + self.pole * (self.state - input);
        self.state
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
