//! State passed from the audio thread to the UI
//!
//! Copy and allocation-free so the callback can push it into a ring buffer.

/// Snapshot of the running network.
#[derive(Clone, Copy, Debug, Default)]
pub struct AudioStatus {
    /// Current delay time per channel, in milliseconds.
    pub delay_ms: [f32; 2],
    /// Whether a channel is crossfading to a new delay time.
    pub retiming: [bool; 2],
    /// Output peak per channel since the previous snapshot.
    pub peak: [f32; 2],
}
