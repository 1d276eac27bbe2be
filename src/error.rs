//! Setup-time and control-side errors.
//!
//! The processing path never returns these: out-of-range parameters are
//! clamped there. Errors only surface while building a network, rendering
//! test signals, or pushing control messages from a non-audio thread.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),

    #[error("maximum delay of {seconds} s holds {samples} samples, need more than {guard}")]
    DelayTooShort {
        seconds: f32,
        samples: usize,
        guard: usize,
    },

    #[error("maximum delay of {seconds} s exceeds the {limit} s limit")]
    DelayTooLong { seconds: f32, limit: f32 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("control queue is full, message dropped")]
    QueueFull,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("cannot render a signal with zero channels")]
    NoChannels,

    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),
}
