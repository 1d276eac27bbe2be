//! TUI module for saavy_delay
//!
//! Shows the delay parameters, an oscilloscope and a spectrum of the
//! output. Key presses update a local copy of the settings and forward the
//! change to the audio thread over the control queue.

mod panel;
mod spectrum;
pub mod state;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

use saavy_delay::{
    dsp::filter::FilterMode,
    network::message::{Channel, DelayController},
    ControlError, DelaySettings,
};

pub use state::AudioStatus;

use panel::render_panel;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Samples kept for the scope and the FFT
pub const VIS_BUFFER_SIZE: usize = 2048;

const HELP: &str = " [Q] Quit  [←/→] Left beat  [,/.] Right beat  [+/-] BPM  [↑/↓] Feedback  \
[x/X] Cross  [m/M] Mix  [c/C] Cutoff  [r/R] Reso  [f] Filter  [d/D] Diffuse  [w/W] Depth  [s/S] Speed";

pub struct UiApp {
    controller: DelayController,
    audio_rx: Consumer<f32>,
    status_rx: Consumer<AudioStatus>,
    /// What the UI last asked for; the audio thread clamps the same way.
    settings: DelaySettings,
    status: AudioStatus,
    /// Interleaved left/right frames, oldest first
    audio_buffer: Vec<f32>,
    mono: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    sample_rate: f32,
    last_error: Option<ControlError>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        controller: DelayController,
        audio_rx: Consumer<f32>,
        status_rx: Consumer<AudioStatus>,
        settings: DelaySettings,
        sample_rate: f32,
    ) -> Self {
        Self {
            controller,
            audio_rx,
            status_rx,
            settings,
            status: AudioStatus::default(),
            audio_buffer: vec![0.0; 2 * VIS_BUFFER_SIZE],
            mono: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            sample_rate,
            last_error: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_status();
            for (mono, frame) in self.mono.iter_mut().zip(self.audio_buffer.chunks(2)) {
                *mono = 0.5 * (frame[0] + frame[1]);
            }
            self.spectrum.update(&self.mono);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the newest VIS_BUFFER_SIZE frames.
    fn poll_audio(&mut self) {
        // whole frames only, so left and right never swap places
        let available = self.audio_rx.slots() & !1;
        if available == 0 {
            return;
        }
        if let Ok(chunk) = self.audio_rx.read_chunk(available) {
            self.audio_buffer.extend(chunk);
        }
        let keep = 2 * VIS_BUFFER_SIZE;
        if self.audio_buffer.len() > keep {
            let excess = self.audio_buffer.len() - keep;
            self.audio_buffer.drain(0..excess);
        }
    }

    fn poll_status(&mut self) {
        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let before = self.settings;
        let s = &mut self.settings;

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Left => s.beat_left = s.beat_left.saturating_sub(1),
            KeyCode::Right => s.beat_left += 1,
            KeyCode::Char(',') => s.beat_right = s.beat_right.saturating_sub(1),
            KeyCode::Char('.') => s.beat_right += 1,
            KeyCode::Char('+') | KeyCode::Char('=') => s.bpm += 5.0,
            KeyCode::Char('-') => s.bpm -= 5.0,
            KeyCode::Up => s.feedback += 0.05,
            KeyCode::Down => s.feedback -= 0.05,
            KeyCode::Char('x') => s.cross_feedback -= 0.05,
            KeyCode::Char('X') => s.cross_feedback += 0.05,
            KeyCode::Char('m') => s.mix -= 0.05,
            KeyCode::Char('M') => s.mix += 0.05,
            KeyCode::Char('c') => s.cutoff_hz /= 1.25,
            KeyCode::Char('C') => s.cutoff_hz *= 1.25,
            KeyCode::Char('r') => s.resonance -= 0.05,
            KeyCode::Char('R') => s.resonance += 0.05,
            KeyCode::Char('f') => s.filter_mode = next_filter_mode(s.filter_mode),
            KeyCode::Char('d') => s.diffuse -= 0.05,
            KeyCode::Char('D') => s.diffuse += 0.05,
            KeyCode::Char('w') => s.modulation_depth -= 0.05,
            KeyCode::Char('W') => s.modulation_depth += 0.05,
            KeyCode::Char('s') => s.modulation_speed_hz /= 1.25,
            KeyCode::Char('S') => s.modulation_speed_hz *= 1.25,
            _ => return,
        }

        self.settings = self.settings.clamped_to(self.sample_rate);
        self.last_error = self.send_changes(&before).err();
    }

    /// Forward every field that differs from `before`.
    fn send_changes(&mut self, before: &DelaySettings) -> Result<(), ControlError> {
        let after = self.settings;
        let c = &mut self.controller;

        if after.beat_left != before.beat_left {
            c.set_rhythm(Channel::Left, after.beat_left)?;
        }
        if after.beat_right != before.beat_right {
            c.set_rhythm(Channel::Right, after.beat_right)?;
        }
        if after.bpm != before.bpm {
            c.set_bpm(after.bpm)?;
        }
        if after.feedback != before.feedback {
            c.set_feedback(after.feedback)?;
        }
        if after.cross_feedback != before.cross_feedback {
            c.set_cross_feedback(after.cross_feedback)?;
        }
        if after.mix != before.mix {
            c.set_mix(after.mix)?;
        }
        if after.cutoff_hz != before.cutoff_hz {
            c.set_filter_cutoff(after.cutoff_hz)?;
        }
        if after.resonance != before.resonance {
            c.set_filter_resonance(after.resonance)?;
        }
        if after.filter_mode != before.filter_mode {
            c.set_filter_mode(after.filter_mode)?;
        }
        if after.diffuse != before.diffuse {
            c.set_diffuse(after.diffuse)?;
        }
        if after.modulation_depth != before.modulation_depth {
            c.set_modulation_depth(after.modulation_depth)?;
        }
        if after.modulation_speed_hz != before.modulation_speed_hz {
            c.set_modulation_speed(after.modulation_speed_hz)?;
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8), // Parameters
                Constraint::Min(6),    // Waveform
                Constraint::Min(8),    // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_panel(
            frame,
            chunks[0],
            &self.settings,
            &self.status,
            self.sample_rate,
        );
        render_waveform(frame, chunks[1], &self.audio_buffer);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = match &self.last_error {
            Some(err) => Paragraph::new(format!(" {}", err)).style(Style::default().fg(Color::Red)),
            None => Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(help, chunks[3]);
    }
}

fn next_filter_mode(mode: FilterMode) -> FilterMode {
    let presets = &FilterMode::PRESETS;
    let next = presets
        .iter()
        .position(|&preset| preset == mode)
        .map_or(0, |i| (i + 1) % presets.len());
    presets[next]
}

#[cfg(test)]
mod tests {
    use super::*;
    use saavy_delay::sequencing::BEAT_TABLE;

    #[test]
    fn test_filter_mode_cycles_through_presets() {
        let mut mode = FilterMode::PRESETS[0];
        for _ in 0..FilterMode::PRESETS.len() {
            mode = next_filter_mode(mode);
        }
        assert_eq!(mode, FilterMode::PRESETS[0]);
        assert_eq!(
            next_filter_mode(FilterMode::Custom([0.0; 5])),
            FilterMode::PRESETS[0]
        );
    }

    #[test]
    fn test_beat_keys_stay_inside_the_table() {
        let mut settings = DelaySettings {
            beat_left: BEAT_TABLE.len() - 1,
            ..DelaySettings::default()
        };
        settings.beat_left += 1;
        assert_eq!(settings.clamped_to(48_000.0).beat_left, BEAT_TABLE.len() - 1);
    }
}
