//! Stereo oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Render interleaved left/right frames as two overlaid traces
pub fn render_waveform(frame: &mut Frame, area: Rect, interleaved: &[f32]) {
    let block = Block::default()
        .title(" Output (L cyan, R magenta) ")
        .borders(Borders::ALL);

    let frames = (interleaved.len() / 2).max(1) as f64;
    let trace = |side: usize| -> Vec<(f64, f64)> {
        interleaved
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| (i as f64 / frames, pair[side] as f64))
            .collect()
    };
    let left = trace(0);
    let right = trace(1);

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&left),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&right),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
