pub mod config;
pub mod dsp;
pub mod error;
pub mod io;
pub mod network; // Stereo feedback network built from the dsp primitives
pub mod sequencing; // Tempo-synced beat divisions

pub use config::{DelaySettings, NetworkConfig};
pub use error::{ConfigError, ControlError, SignalError};
pub use network::FeedbackNetwork;

/// Largest block the demo binary hands to the network in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Fixed length of the network's inner processing block, in samples.
pub const INTERNAL_BLOCK_SIZE: usize = 16;

/// Sample rate that diffuser lengths and other tuning constants are quoted at.
pub const REFERENCE_SAMPLE_RATE: f32 = 48_000.0;
