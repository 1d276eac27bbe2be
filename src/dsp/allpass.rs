//! Damped lattice all-pass stage, the building block of the diffuser chain.
//!
//! ```text
//!            ┌──────────────(× -g)───────────────┐
//!            ▼                                   │
//! input ──→ (+) ── feed_in ──┬──→ [damping] ──→ [z^-N] ──┬──→ (+) ──→ output
//!                            │                           │     ▲
//!                            └──────────(× g)────────────┼─────┘
//!                                                        │
//!                                                  delayed
//! ```
//!
//! ```text
//! delayed  = buffer[read]
//! feed_in  = input - g * delayed
//! output   = g * feed_in + delayed
//! buffer[write] = damping(feed_in)
//! ```
//!
//! With the damping stage bypassed this is a textbook all-pass: flat
//! magnitude, smeared phase. The one-pole in the loop makes high frequencies
//! decay faster than lows, which is what gives a diffuser tail its darker
//! colour over time.
//!
//! Stage lengths should be prime so that several stages in series never
//! line up their echoes on a common period. [`AllPassStage::set_size_prime`]
//! picks the next suitable prime; [`AllPassStage::set_size`] takes an exact
//! length.

use crate::dsp::one_pole::OnePole;
use crate::REFERENCE_SAMPLE_RATE;

/// Shortest stage length accepted by [`AllPassStage::set_size`].
pub const MIN_STAGE_LENGTH: usize = 51;

/// Lower bound of the prime search, quoted at 48 kHz.
pub const MIN_PRIME_LENGTH_48K: usize = 101;

/// Feedback gain is kept strictly inside (-1, 1).
pub const MAX_FEEDBACK: f32 = 0.999_999;

const PRIME_SEARCH_ATTEMPTS: usize = 250;

/// Trial-division primality test over 6k ± 1.
pub fn is_prime(n: usize) -> bool {
    if n == 2 || n == 3 {
        return true;
    }
    if n <= 1 || n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// First odd prime at or above `max(minimum, width)`.
///
/// Gives up after a bounded number of candidates and returns the last odd
/// value tried; prime gaps in the range a diffuser uses are far smaller.
pub fn useful_prime(minimum: usize, width: usize) -> usize {
    let mut candidate = minimum.max(width) | 1;
    for _ in 0..PRIME_SEARCH_ATTEMPTS {
        if is_prime(candidate) {
            return candidate;
        }
        candidate += 2;
    }
    candidate
}

/// Single recursive all-pass with a one-pole damping filter in its loop.
#[derive(Debug, Clone)]
pub struct AllPassStage {
    sample_rate: f32,
    buffer: Vec<f32>,
    size: usize,
    read: usize,
    write: usize,
    feedback: f32,
    damping: OnePole,
}

impl AllPassStage {
    /// Allocate a stage that can grow up to `max_length` samples.
    ///
    /// Starts at the minimum length, feedback 0, damping bypassed.
    pub fn new(sample_rate: f32, max_length: usize) -> Self {
        let max_length = max_length.max(MIN_STAGE_LENGTH);
        let mut stage = Self {
            sample_rate,
            buffer: vec![0.0; max_length],
            size: MIN_STAGE_LENGTH,
            read: 0,
            write: 0,
            feedback: 0.0,
            damping: OnePole::new(sample_rate),
        };
        stage.set_size(MIN_STAGE_LENGTH);
        stage
    }

    pub fn max_length(&self) -> usize {
        self.buffer.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Set the exact loop length, clamped to `[51, max_length]`.
    ///
    /// Buffer content is kept: the first pass after a resize replays
    /// whatever the old length left behind.
    pub fn set_size(&mut self, length: usize) {
        let max = self.buffer.len();
        self.size = length.clamp(MIN_STAGE_LENGTH, max);
        self.read = (max + self.write - self.size) % max;
    }

    /// Set the loop length to the next prime at or above `target`.
    ///
    /// The search starts no lower than 101 samples at 48 kHz, scaled to the
    /// stage's sample rate.
    pub fn set_size_prime(&mut self, target: usize) {
        let minimum =
            (MIN_PRIME_LENGTH_48K as f32 * self.sample_rate / REFERENCE_SAMPLE_RATE) as usize;
        self.set_size(useful_prime(minimum, target));
    }

    pub fn set_feedback(&mut self, gain: f32) {
        self.feedback = gain.clamp(-MAX_FEEDBACK, MAX_FEEDBACK);
    }

    /// Cutoff of the damping filter in the loop. Nyquist or above disables it.
    pub fn set_lowpass_cutoff(&mut self, hz: f32) {
        self.damping.set_cutoff(hz);
    }

    #[inline]
    pub fn step(&mut self, input: f32) -> f32 {
        let max = self.buffer.len();

        let delayed = self.buffer[self.read];
        self.read += 1;
        if self.read == max {
            self.read = 0;
        }

        let feed_in = input - delayed * self.feedback;
        let output = feed_in * self.feedback + delayed;

        self.buffer[self.write] = self.damping.next_sample(feed_in);
        self.write += 1;
        if self.write == max {
            self.write = 0;
        }

        output
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

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.damping.reset();
    }
}
