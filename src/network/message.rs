#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::dsp::filter::FilterMode;
#[cfg(feature = "rtrb")]
use crate::error::ControlError;

/// Which delay channel a per-channel message addresses.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Channel {
    Left,
    Right,
    Both,
}

/// One parameter change, applied by the audio thread at the start of a block.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DelayMessage {
    Feedback(f32),
    CrossFeedback(f32),
    Mix(f32),
    Bpm(f32),
    BeatIndex { channel: Channel, index: usize },
    TimeMs { channel: Channel, milliseconds: f32 },
    FilterCutoff(f32),
    FilterResonance(f32),
    FilterMode(FilterMode),
    Diffuse(f32),
    ModulationDepth(f32),
    ModulationSpeed(f32),
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<DelayMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<DelayMessage> {
    fn pop(&mut self) -> Option<DelayMessage> {
        Consumer::pop(self).ok()
    }
}

/// Default queue length used by the demo binary.
pub const CONTROL_QUEUE_SIZE: usize = 256;

/// Create a single-writer/single-reader control channel.
///
/// The controller stays on the UI/control thread; the consumer is handed to
/// the audio callback and drained with
/// [`FeedbackNetwork::process_messages`](crate::network::FeedbackNetwork::process_messages).
#[cfg(feature = "rtrb")]
pub fn channel(capacity: usize) -> (DelayController, Consumer<DelayMessage>) {
    let (tx, rx) = RingBuffer::<DelayMessage>::new(capacity);
    (DelayController { tx }, rx)
}

/// Control-thread handle that pushes [`DelayMessage`]s without blocking.
#[cfg(feature = "rtrb")]
pub struct DelayController {
    tx: Producer<DelayMessage>,
}

#[cfg(feature = "rtrb")]
impl DelayController {
    pub fn send(&mut self, message: DelayMessage) -> Result<(), ControlError> {
        self.tx.push(message).map_err(|_| {
            log::warn!("control queue full, dropping {:?}", message);
            ControlError::QueueFull
        })
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }

    pub fn set_feedback(&mut self, feedback: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::Feedback(feedback))
    }

    pub fn set_cross_feedback(&mut self, feedback: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::CrossFeedback(feedback))
    }

    pub fn set_mix(&mut self, mix: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::Mix(mix))
    }

    pub fn set_bpm(&mut self, bpm: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::Bpm(bpm))
    }

    pub fn set_rhythm(&mut self, channel: Channel, index: usize) -> Result<(), ControlError> {
        self.send(DelayMessage::BeatIndex { channel, index })
    }

    pub fn set_time_ms(&mut self, channel: Channel, milliseconds: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::TimeMs {
            channel,
            milliseconds,
        })
    }

    pub fn set_filter_cutoff(&mut self, hz: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::FilterCutoff(hz))
    }

    pub fn set_filter_resonance(&mut self, resonance: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::FilterResonance(resonance))
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) -> Result<(), ControlError> {
        self.send(DelayMessage::FilterMode(mode))
    }

    pub fn set_diffuse(&mut self, diffuse: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::Diffuse(diffuse))
    }

    pub fn set_modulation_depth(&mut self, depth: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::ModulationDepth(depth))
    }

    pub fn set_modulation_speed(&mut self, hz: f32) -> Result<(), ControlError> {
        self.send(DelayMessage::ModulationSpeed(hz))
    }
}
