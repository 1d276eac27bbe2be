// Purpose - stereo block containers, interleaving, and test signals

use std::f64::consts::TAU;

use crate::error::SignalError;

/// Owned left/right sample blocks of equal length.
#[derive(Debug, Default, Clone)]
pub struct StereoBlock {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBlock {
    /// Allocate `frames` samples of silence per channel.
    pub fn new(frames: usize) -> Self {
        Self {
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    /// Copy from an interleaved buffer. Mono input feeds both sides; channels
    /// past the second are ignored. Stops at whichever side is shorter.
    pub fn deinterleave_from(&mut self, data: &[f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for (i, frame) in data.chunks(channels).take(self.frames()).enumerate() {
            self.left[i] = frame[0];
            self.right[i] = if channels > 1 { frame[1] } else { frame[0] };
        }
    }

    /// Write into an interleaved buffer. Mono output gets the average of
    /// both sides; extra channels are silenced.
    pub fn interleave_into(&self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        for (i, frame) in data.chunks_mut(channels).take(self.frames()).enumerate() {
            if channels == 1 {
                frame[0] = 0.5 * (self.left[i] + self.right[i]);
                continue;
            }
            frame[0] = self.left[i];
            frame[1] = self.right[i];
            for extra in frame.iter_mut().skip(2) {
                *extra = 0.0;
            }
        }
    }
}

/// Fill `target` with an interleaved unit-amplitude sine, the same value on
/// every channel of a frame. Setup-time helper; never call it from the
/// audio callback.
pub fn render_sine(
    target: &mut [f32],
    sample_rate: f32,
    frequency: f32,
    channels: usize,
) -> Result<(), SignalError> {
    if channels == 0 {
        return Err(SignalError::NoChannels);
    }
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(SignalError::InvalidSampleRate(sample_rate));
    }

    let advance = frequency as f64 / sample_rate as f64;
    for (n, frame) in target.chunks_mut(channels).enumerate() {
        let value = (TAU * advance * n as f64).sin() as f32;
        frame.fill(value);
    }
    Ok(())
}

/// First index where the signal crosses from negative to non-negative.
fn first_rising_crossing(data: &[f32]) -> Option<usize> {
    (1..data.len()).find(|&i| data[i - 1] < 0.0 && data[i] >= 0.0)
}

/// Average period length, in samples, measured between rising zero
/// crossings. Returns 0.0 when fewer than two crossings exist.
pub fn period_by_zero_crossings(data: &[f32]) -> f32 {
    let Some(first) = first_rising_crossing(data) else {
        return 0.0;
    };

    let mut count = 0usize;
    let mut last = first;
    for i in first + 1..data.len() {
        if data[i - 1] < 0.0 && data[i] >= 0.0 {
            count += 1;
            last = i;
        }
    }

    if count == 0 {
        return 0.0;
    }
    (last - first) as f32 / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_channels_is_an_error() {
        let mut buffer = vec![0.0; 64];
        assert_eq!(
            render_sine(&mut buffer, 48_000.0, 440.0, 0),
            Err(SignalError::NoChannels)
        );
        assert_eq!(
            render_sine(&mut buffer, 0.0, 440.0, 1),
            Err(SignalError::InvalidSampleRate(0.0))
        );
    }

    #[test]
    fn test_interleaved_channels_carry_the_same_value() {
        let mut buffer = vec![0.0; 3 * 100];
        render_sine(&mut buffer, 48_000.0, 1000.0, 3).unwrap();
        for frame in buffer.chunks(3) {
            assert_eq!(frame[0], frame[1]);
            assert_eq!(frame[1], frame[2]);
        }
        assert_eq!(buffer[0], 0.0);
        assert!(buffer[3] > 0.0);
    }

    #[test]
    fn test_period_of_rendered_sine() {
        let mut buffer = vec![0.0; 48_000];
        render_sine(&mut buffer, 48_000.0, 100.0, 1).unwrap();
        let period = period_by_zero_crossings(&buffer);
        assert!((period - 480.0).abs() < 0.5, "period {}", period);
    }

    #[test]
    fn test_period_without_crossings_is_zero() {
        assert_eq!(period_by_zero_crossings(&[1.0; 100]), 0.0);
        assert_eq!(period_by_zero_crossings(&[]), 0.0);
        // a single crossing has no period to measure
        assert_eq!(period_by_zero_crossings(&[-1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_stereo_interleave_round_trip() {
        let interleaved = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let mut block = StereoBlock::new(3);
        block.deinterleave_from(&interleaved, 2);
        assert_eq!(block.left, vec![0.1, 0.2, 0.3]);
        assert_eq!(block.right, vec![-0.1, -0.2, -0.3]);

        let mut out = [9.0; 6];
        block.interleave_into(&mut out, 2);
        assert_eq!(out, interleaved);

        let mut mono = [9.0; 3];
        block.interleave_into(&mut mono, 1);
        assert_eq!(mono, [0.0; 3]);
    }
}
