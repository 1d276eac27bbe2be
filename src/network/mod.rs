//! Cross-coupled stereo feedback delay.
//!
//! ```text
//!            ┌────────────── × feedback ──────────────────────┐
//!            │        ┌───── × cross ───────────┐             │
//!            │        │                         │             │
//! in L ──→ (+) ──→ [ladder] ──→ [diffuser] ──→ [delay L] ──┬──┴─────→ wet L
//!                     │                         │          │
//! in R ──→ (+) ──→ [ladder] ──→ [diffuser] ──→ [delay R] ──┼──┬─────→ wet R
//!            │        │                                    │  │
//!            │        └───── × cross ──────────────────────┘  │
//!            └────────────── × feedback ──────────────────────┘
//!
//! out = in × dry + wet × wet_gain        (equal-power mix)
//! ```
//!
//! Work happens in fixed blocks of [`INTERNAL_BLOCK_SIZE`] samples no matter
//! what block size the host calls with. Incoming samples are staged until a
//! full inner block is available, so the network adds exactly
//! `INTERNAL_BLOCK_SIZE` samples of latency. The feedback term for sample
//! `i` of an inner block reads sample `i` of the previous inner block's
//! delay output.
//!
//! Parameter setters clamp and never fail. From another thread, send
//! [`DelayMessage`]s through a [`message::channel`] and drain them with
//! [`FeedbackNetwork::process_messages`] at the top of each audio callback.

pub mod message;

use crate::config::{
    max_cutoff_hz, DelaySettings, NetworkConfig, MAX_BPM, MAX_MODULATION_SPEED_HZ, MIN_BPM,
    MIN_CUTOFF_HZ, MIN_MODULATION_SPEED_HZ,
};
use crate::dsp::delay::DelayLine;
use crate::dsp::diffuser::{DiffuserChain, LEFT_WIDTHS_48K, RIGHT_WIDTHS_48K};
use crate::dsp::filter::{FilterMode, LadderFilter};
use crate::dsp::mix::{mix_factors, PanFactors};
use crate::error::ConfigError;
use crate::sequencing::beats::{BeatTable, BEAT_COUNT};
use crate::INTERNAL_BLOCK_SIZE;

pub use message::{Channel, DelayMessage, MessageReceiver};

/// Read-head displacement, in samples, at modulation depth 1.0.
pub const MAX_MODULATION_DEPTH_SAMPLES: f32 = 100.0;

/// The right channel's LFO runs at this fraction of the left channel's speed.
pub const RIGHT_MODULATION_RATIO: f32 = 0.9;

type Block = [f32; INTERNAL_BLOCK_SIZE];

/// Processing chain of one stereo side.
struct ChannelChain {
    filter: LadderFilter,
    diffuser: DiffuserChain,
    delay: DelayLine,
}

impl ChannelChain {
    fn new(config: &NetworkConfig, widths: &[usize; 5]) -> Self {
        // Headroom so a full-depth LFO never pushes the read head past the
        // oldest sample at maximum delay.
        let headroom = (MAX_MODULATION_DEPTH_SAMPLES + 1.0) / config.sample_rate;
        Self {
            filter: LadderFilter::new(config.sample_rate),
            diffuser: DiffuserChain::with_widths(config.sample_rate, widths),
            delay: DelayLine::new(config.sample_rate, config.max_delay_seconds + headroom),
        }
    }

    fn reset(&mut self) {
        self.filter.reset();
        self.diffuser.reset();
        self.delay.reset();
    }
}

pub struct FeedbackNetwork {
    config: NetworkConfig,
    settings: DelaySettings,
    mix: PanFactors,
    channels: [ChannelChain; 2],

    staged_input: [Block; 2],
    staged_output: [Block; 2],
    fill: usize,

    delayed: [Block; 2],
    feedback_in: [Block; 2],
    diffused: [Block; 2],
}

impl FeedbackNetwork {
    /// Build a network and allocate every buffer it will ever use.
    ///
    /// Starts with [`DelaySettings::default`] already in effect.
    pub fn new(config: NetworkConfig) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log::error!("rejected network config {:?}: {}", config, err);
            return Err(err);
        }

        let channels = [
            ChannelChain::new(&config, &LEFT_WIDTHS_48K),
            ChannelChain::new(&config, &RIGHT_WIDTHS_48K),
        ];

        log::info!(
            "feedback network at {} Hz: delay capacity {} samples per channel",
            config.sample_rate,
            channels[0].delay.capacity()
        );
        log::debug!(
            "diffuser stage lengths: left {:?}, right {:?}",
            channels[0].diffuser.element_sizes(),
            channels[1].diffuser.element_sizes()
        );

        let settings = DelaySettings::default();
        let mut network = Self {
            config,
            settings,
            mix: mix_factors(settings.mix),
            channels,
            staged_input: [[0.0; INTERNAL_BLOCK_SIZE]; 2],
            staged_output: [[0.0; INTERNAL_BLOCK_SIZE]; 2],
            fill: 0,
            delayed: [[0.0; INTERNAL_BLOCK_SIZE]; 2],
            feedback_in: [[0.0; INTERNAL_BLOCK_SIZE]; 2],
            diffused: [[0.0; INTERNAL_BLOCK_SIZE]; 2],
        };
        network.apply_settings(&settings);
        network.reset();
        Ok(network)
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Current parameter values, after clamping.
    pub fn settings(&self) -> &DelaySettings {
        &self.settings
    }

    /// Samples between an input sample and its dry copy at the output.
    pub fn latency_samples(&self) -> usize {
        INTERNAL_BLOCK_SIZE
    }

    /// Delay time currently read by `channel` (0 = left, 1 = right), in samples.
    pub fn delay_samples(&self, channel: usize) -> Option<f32> {
        self.channels.get(channel).map(|c| c.delay.delay_samples())
    }

    /// Delay time `channel` is heading to, in samples.
    pub fn target_delay_samples(&self, channel: usize) -> Option<f32> {
        self.channels.get(channel).map(|c| c.delay.target_delay_samples())
    }

    /// Push a whole parameter snapshot. Delay times are requested once per channel.
    pub fn apply_settings(&mut self, settings: &DelaySettings) {
        let settings = settings.clamped_to(self.config.sample_rate);

        self.set_feedback(settings.feedback);
        self.set_cross_feedback(settings.cross_feedback);
        self.set_mix(settings.mix);
        self.set_filter_cutoff(settings.cutoff_hz);
        self.set_filter_resonance(settings.resonance);
        self.set_filter_mode(settings.filter_mode);
        self.set_diffuse(settings.diffuse);
        self.set_modulation_depth(settings.modulation_depth);
        self.set_modulation_speed(settings.modulation_speed_hz);

        self.settings.bpm = settings.bpm;
        self.settings.beat_left = settings.beat_left;
        self.settings.beat_right = settings.beat_right;
        self.retime_channel(0);
        self.retime_channel(1);
    }

    /// Drain every pending control message. Wait-free; call once per callback.
    pub fn process_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(message) = rx.pop() {
            self.apply_message(message);
        }
    }

    pub fn apply_message(&mut self, message: DelayMessage) {
        match message {
            DelayMessage::Feedback(value) => self.set_feedback(value),
            DelayMessage::CrossFeedback(value) => self.set_cross_feedback(value),
            DelayMessage::Mix(value) => self.set_mix(value),
            DelayMessage::Bpm(bpm) => self.set_bpm(bpm),
            DelayMessage::BeatIndex { channel, index } => match channel {
                Channel::Left => self.set_rhythm_left(index),
                Channel::Right => self.set_rhythm_right(index),
                Channel::Both => self.set_rhythm(index),
            },
            DelayMessage::TimeMs {
                channel,
                milliseconds,
            } => match channel {
                Channel::Left => self.set_time_ms_left(milliseconds),
                Channel::Right => self.set_time_ms_right(milliseconds),
                Channel::Both => {
                    self.set_time_ms_left(milliseconds);
                    self.set_time_ms_right(milliseconds);
                }
            },
            DelayMessage::FilterCutoff(hz) => self.set_filter_cutoff(hz),
            DelayMessage::FilterResonance(value) => self.set_filter_resonance(value),
            DelayMessage::FilterMode(mode) => self.set_filter_mode(mode),
            DelayMessage::Diffuse(value) => self.set_diffuse(value),
            DelayMessage::ModulationDepth(value) => self.set_modulation_depth(value),
            DelayMessage::ModulationSpeed(hz) => self.set_modulation_speed(hz),
        }
    }

    /// Same-channel feedback gain in [0, 1].
    pub fn set_feedback(&mut self, feedback: f32) {
        self.settings.feedback = clamp_unit(feedback);
    }

    /// Opposite-channel feedback gain in [0, 1].
    pub fn set_cross_feedback(&mut self, feedback: f32) {
        self.settings.cross_feedback = clamp_unit(feedback);
    }

    /// Dry/wet amount in [0, 1], equal-power.
    pub fn set_mix(&mut self, mix: f32) {
        self.settings.mix = clamp_unit(mix);
        self.mix = mix_factors(self.settings.mix);
    }

    pub fn set_bpm(&mut self, bpm: f32) {
        if !bpm.is_finite() {
            return;
        }
        self.settings.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        self.retime_channel(0);
        self.retime_channel(1);
    }

    /// Select the beat division for both channels.
    pub fn set_rhythm(&mut self, index: usize) {
        self.set_rhythm_left(index);
        self.set_rhythm_right(index);
    }

    pub fn set_rhythm_left(&mut self, index: usize) {
        self.settings.beat_left = index.min(BEAT_COUNT - 1);
        self.retime_channel(0);
    }

    pub fn set_rhythm_right(&mut self, index: usize) {
        self.settings.beat_right = index.min(BEAT_COUNT - 1);
        self.retime_channel(1);
    }

    /// Free-running delay time for the left channel. Replaced again by the
    /// next tempo or beat change.
    ///
    /// Clamped to `[0, max_delay_seconds]`. Keep it above two samples plus
    /// the modulation depth: shorter times wrap around the ring, so a 0 ms
    /// request echoes after roughly the whole buffer instead of at once.
    pub fn set_time_ms_left(&mut self, milliseconds: f32) {
        self.set_time_seconds(0, milliseconds / 1000.0);
    }

    /// Right-channel counterpart of [`set_time_ms_left`](Self::set_time_ms_left).
    pub fn set_time_ms_right(&mut self, milliseconds: f32) {
        self.set_time_seconds(1, milliseconds / 1000.0);
    }

    /// Ladder cutoff in Hz, clamped to [0, Nyquist].
    pub fn set_filter_cutoff(&mut self, hz: f32) {
        if !hz.is_finite() {
            return;
        }
        let hz = hz.clamp(MIN_CUTOFF_HZ, max_cutoff_hz(self.config.sample_rate));
        self.settings.cutoff_hz = hz;
        for channel in &mut self.channels {
            channel.filter.set_cutoff(hz);
        }
    }

    pub fn set_filter_resonance(&mut self, resonance: f32) {
        self.settings.resonance = clamp_unit(resonance);
        for channel in &mut self.channels {
            channel.filter.set_resonance(self.settings.resonance);
        }
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.settings.filter_mode = mode;
        for channel in &mut self.channels {
            channel.filter.set_mode(mode);
        }
    }

    /// Samples a cutoff change is ramped over (0 = immediate).
    pub fn set_filter_smoothing_steps(&mut self, steps: usize) {
        for channel in &mut self.channels {
            channel.filter.set_smoothing_steps(steps);
        }
    }

    /// Diffuser dry/wet amount in [0, 1].
    pub fn set_diffuse(&mut self, diffuse: f32) {
        self.settings.diffuse = clamp_unit(diffuse);
        for channel in &mut self.channels {
            channel.diffuser.set_mix(self.settings.diffuse);
        }
    }

    /// Normalized modulation depth in [0, 1].
    pub fn set_modulation_depth(&mut self, depth: f32) {
        self.settings.modulation_depth = clamp_unit(depth);
        let samples = self.settings.modulation_depth * MAX_MODULATION_DEPTH_SAMPLES;
        for channel in &mut self.channels {
            channel.delay.set_modulation_depth(samples);
        }
    }

    /// LFO speed in Hz for the left channel; the right runs slightly slower.
    pub fn set_modulation_speed(&mut self, hz: f32) {
        if !hz.is_finite() {
            return;
        }
        let hz = hz.clamp(MIN_MODULATION_SPEED_HZ, MAX_MODULATION_SPEED_HZ);
        self.settings.modulation_speed_hz = hz;
        self.channels[0].delay.set_modulation_speed(hz);
        self.channels[1]
            .delay
            .set_modulation_speed(hz * RIGHT_MODULATION_RATIO);
    }

    fn retime_channel(&mut self, channel: usize) {
        let index = if channel == 0 {
            self.settings.beat_left
        } else {
            self.settings.beat_right
        };
        let seconds = BeatTable::delay_seconds(self.settings.bpm, index);
        self.set_time_seconds(channel, seconds);
    }

    fn set_time_seconds(&mut self, channel: usize, seconds: f32) {
        if !seconds.is_finite() {
            return;
        }
        let seconds = seconds.clamp(0.0, self.config.max_delay_seconds);
        self.channels[channel].delay.set_time(seconds);
    }

    /// Process one host block. All four slices must have the same length;
    /// outputs are fully overwritten.
    pub fn process_block(
        &mut self,
        in_left: &[f32],
        in_right: &[f32],
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) {
        debug_assert_eq!(in_left.len(), in_right.len());
        debug_assert_eq!(in_left.len(), out_left.len());
        debug_assert_eq!(in_left.len(), out_right.len());

        let frames = in_left
            .len()
            .min(in_right.len())
            .min(out_left.len())
            .min(out_right.len());

        for i in 0..frames {
            let fill = self.fill;
            self.staged_input[0][fill] = in_left[i];
            self.staged_input[1][fill] = in_right[i];
            out_left[i] = self.staged_output[0][fill];
            out_right[i] = self.staged_output[1][fill];

            self.fill += 1;
            if self.fill == INTERNAL_BLOCK_SIZE {
                self.process_inner_block();
                self.fill = 0;
            }
        }
    }

    fn process_inner_block(&mut self) {
        let feedback = self.settings.feedback;
        let cross = self.settings.cross_feedback;

        for i in 0..INTERNAL_BLOCK_SIZE {
            let left = self.delayed[0][i];
            let right = self.delayed[1][i];
            self.feedback_in[0][i] = left * feedback + right * cross + self.staged_input[0][i];
            self.feedback_in[1][i] = right * feedback + left * cross + self.staged_input[1][i];
        }

        for (c, channel) in self.channels.iter_mut().enumerate() {
            channel.filter.render(&mut self.feedback_in[c]);
            channel
                .diffuser
                .process_block(&self.feedback_in[c], &mut self.diffused[c]);
            channel
                .delay
                .process_block(&self.diffused[c], &mut self.delayed[c]);
        }

        for c in 0..2 {
            for i in 0..INTERNAL_BLOCK_SIZE {
                self.staged_output[c][i] = self.mix.blend(self.staged_input[c][i], self.delayed[c][i]);
            }
        }
    }

    /// Silence every buffer and filter without reallocating. Pending delay
    /// time changes are applied immediately.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        for block in self
            .staged_input
            .iter_mut()
            .chain(self.staged_output.iter_mut())
            .chain(self.delayed.iter_mut())
            .chain(self.feedback_in.iter_mut())
            .chain(self.diffused.iter_mut())
        {
            block.fill(0.0);
        }
        self.fill = 0;
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
