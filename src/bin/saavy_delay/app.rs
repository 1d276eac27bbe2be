//! DelayDemo - builder that wires the test source, the delay and the TUI

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use saavy_delay::{
    io::StereoBlock,
    network::message::{channel, CONTROL_QUEUE_SIZE},
    DelaySettings, FeedbackNetwork, NetworkConfig, MAX_BLOCK_SIZE,
};

use super::source::PluckSource;
use super::ui::{AudioStatus, UiApp, VIS_BUFFER_SIZE};

/// Status updates are throttled to roughly this many per second.
const STATUS_RATE_HZ: f32 = 30.0;

/// Main application builder
pub struct DelayDemo {
    settings: DelaySettings,
    max_delay_seconds: f32,
    pluck_every_beats: f32,
}

impl DelayDemo {
    pub fn new() -> Self {
        Self {
            settings: DelaySettings::default(),
            max_delay_seconds: NetworkConfig::default().max_delay_seconds,
            pluck_every_beats: 1.0,
        }
    }

    /// Initial delay parameters, clamped once the device sample rate is known.
    pub fn settings(mut self, settings: DelaySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Spacing of the test plucks, in quarter-note beats at the initial tempo.
    pub fn pluck_every_beats(mut self, beats: f32) -> Self {
        self.pluck_every_beats = beats;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("output: {} Hz, {} channels", sample_rate, channels);
        let settings = self.settings.clamped_to(sample_rate);

        let mut network = FeedbackNetwork::new(NetworkConfig::new(sample_rate, self.max_delay_seconds))
            .wrap_err("failed to build the delay network")?;
        network.apply_settings(&settings);
        network.reset();

        let mut source = PluckSource::new(sample_rate, settings.bpm, self.pluck_every_beats);
        let (controller, mut control_rx) = channel(CONTROL_QUEUE_SIZE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
        let (mut status_tx, status_rx) = RingBuffer::<AudioStatus>::new(16);

        let status_interval = (sample_rate / STATUS_RATE_HZ) as usize;
        let mut since_status = 0usize;
        let mut dry = StereoBlock::new(MAX_BLOCK_SIZE);
        let mut wet = StereoBlock::new(MAX_BLOCK_SIZE);
        let mut peak = [0.0f32; 2];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                network.process_messages(&mut control_rx);

                for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                    let frames = chunk.len() / channels;
                    source.render(&mut dry.left[..frames], &mut dry.right[..frames]);
                    network.process_block(
                        &dry.left[..frames],
                        &dry.right[..frames],
                        &mut wet.left[..frames],
                        &mut wet.right[..frames],
                    );
                    wet.interleave_into(chunk, channels);

                    for i in 0..frames {
                        peak[0] = peak[0].max(wet.left[i].abs());
                        peak[1] = peak[1].max(wet.right[i].abs());
                        // the scope drops frames when the UI falls behind
                        if scope_tx.slots() >= 2 {
                            let _ = scope_tx.push(wet.left[i]);
                            let _ = scope_tx.push(wet.right[i]);
                        }
                    }

                    since_status += frames;
                    if since_status >= status_interval {
                        since_status = 0;
                        let status = AudioStatus {
                            delay_ms: [0, 1].map(|c| {
                                network.delay_samples(c).unwrap_or(0.0) / sample_rate * 1000.0
                            }),
                            retiming: [0, 1].map(|c| {
                                network.delay_samples(c) != network.target_delay_samples(c)
                            }),
                            peak,
                        };
                        let _ = status_tx.push(status);
                        peak = [0.0; 2];
                    }
                }
            },
            |err| log::error!("audio stream error: {}", err),
            None,
        )?;

        stream.play().wrap_err("failed to start the output stream")?;

        let mut app = UiApp::new(controller, scope_rx, status_rx, settings, sample_rate);
        let mut terminal = ratatui::init();
        let result = app.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for DelayDemo {
    fn default() -> Self {
        Self::new()
    }
}
