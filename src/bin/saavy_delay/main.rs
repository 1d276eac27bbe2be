//! saavy_delay - terminal demo for the stereo feedback delay
//!
//! Run with: cargo run --release
//!
//! A plucked test tone is fed through the delay; the keyboard drives the
//! delay parameters over a lock-free control queue.

mod app;
mod source;
mod ui;

use app::DelayDemo;
use saavy_delay::DelaySettings;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = DelaySettings {
        mix: 0.35,
        feedback: 0.45,
        beat_right: 18,
        ..DelaySettings::default()
    };

    DelayDemo::new()
        .settings(settings)
        .pluck_every_beats(2.0)
        .run()
}
