//! Parameter panel - current settings plus live delay times and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_delay::{dsp::mix::gain_to_db, sequencing::BeatTable, DelaySettings};

use super::AudioStatus;

fn label(text: &str) -> Span<'static> {
    Span::styled(format!("{:<10}", text), Style::default().fg(Color::DarkGray))
}

fn value(text: String, color: Color) -> Span<'static> {
    Span::styled(format!("{:<24}", text), Style::default().fg(color))
}

fn channel_line(
    name: &str,
    beat: usize,
    bpm: f32,
    status: &AudioStatus,
    c: usize,
) -> Line<'static> {
    let division = BeatTable::get_clamped(beat);
    // while a fade runs the audible time still belongs to the old division
    let heard_beats = status.delay_ms[c] / 1000.0 * bpm / 60.0;
    let heard = BeatTable::get_clamped(BeatTable::nearest(heard_beats));
    let time_color = if status.retiming[c] {
        Color::Yellow
    } else {
        Color::White
    };
    Line::from(vec![
        label(name),
        value(division.name.to_string(), Color::Cyan),
        value(
            format!("{:.1} ms (~{})", status.delay_ms[c], heard.name),
            time_color,
        ),
        Span::styled(
            format!("peak {:.1} dB", gain_to_db(status.peak[c]).max(-96.0)),
            Style::default().fg(if status.peak[c] > 0.99 {
                Color::Red
            } else {
                Color::Magenta
            }),
        ),
    ])
}

/// Render the parameter panel
pub fn render_panel(
    frame: &mut Frame,
    area: Rect,
    settings: &DelaySettings,
    status: &AudioStatus,
    sample_rate: f32,
) {
    let block = Block::default()
        .title(format!(" saavy_delay  {:.1}kHz ", sample_rate / 1000.0))
        .borders(Borders::ALL);

    let lines = vec![
        Line::from(vec![
            label("tempo"),
            value(format!("{:.0} bpm", settings.bpm), Color::Cyan),
            label("mix"),
            value(format!("{:.2}", settings.mix), Color::White),
        ]),
        channel_line("left", settings.beat_left, settings.bpm, status, 0),
        channel_line("right", settings.beat_right, settings.bpm, status, 1),
        Line::from(vec![
            label("feedback"),
            value(format!("{:.2}", settings.feedback), Color::White),
            label("cross"),
            value(format!("{:.2}", settings.cross_feedback), Color::White),
        ]),
        Line::from(vec![
            label("filter"),
            value(settings.filter_mode.name().to_string(), Color::Green),
            label("cutoff"),
            value(format!("{:.0} Hz", settings.cutoff_hz), Color::White),
            label("reso"),
            value(format!("{:.2}", settings.resonance), Color::White),
        ]),
        Line::from(vec![
            label("diffuse"),
            value(format!("{:.2}", settings.diffuse), Color::White),
            label("mod"),
            value(
                format!(
                    "{:.2} @ {:.2} Hz",
                    settings.modulation_depth, settings.modulation_speed_hz
                ),
                Color::White,
            ),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
