//! Construction parameters and parameter snapshots for the feedback network.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::delay::INTERPOLATION_GUARD;
use crate::dsp::filter::FilterMode;
use crate::error::ConfigError;
use crate::sequencing::beats::{BEAT_COUNT, QUARTER_NOTE_INDEX};

/// Upper bound on `NetworkConfig::max_delay_seconds`.
pub const MAX_DELAY_SECONDS: f32 = 60.0;

pub const MIN_BPM: f32 = 40.0;
pub const MAX_BPM: f32 = 250.0;
pub const MIN_CUTOFF_HZ: f32 = 0.0;
pub const MIN_MODULATION_SPEED_HZ: f32 = 0.0;
pub const MAX_MODULATION_SPEED_HZ: f32 = 20.0;

/// Highest filter cutoff at `sample_rate`. At this value the filter is bypassed.
pub fn max_cutoff_hz(sample_rate: f32) -> f32 {
    sample_rate * 0.5
}

/// Fixed at construction; changing either means building a new network.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkConfig {
    pub sample_rate: f32,
    /// Longest delay time either channel can be set to.
    pub max_delay_seconds: f32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_delay_seconds: 10.0,
        }
    }
}

impl NetworkConfig {
    pub fn new(sample_rate: f32, max_delay_seconds: f32) -> Self {
        Self {
            sample_rate,
            max_delay_seconds,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }

        if self.max_delay_seconds.is_finite() && self.max_delay_seconds > MAX_DELAY_SECONDS {
            return Err(ConfigError::DelayTooLong {
                seconds: self.max_delay_seconds,
                limit: MAX_DELAY_SECONDS,
            });
        }

        let samples = if self.max_delay_seconds.is_finite() {
            (self.sample_rate * self.max_delay_seconds).max(0.0) as usize
        } else {
            0
        };
        if samples <= INTERPOLATION_GUARD {
            return Err(ConfigError::DelayTooShort {
                seconds: self.max_delay_seconds,
                samples,
                guard: INTERPOLATION_GUARD,
            });
        }
        Ok(())
    }
}

/// A full set of user-facing parameters.
///
/// Normalized fields live in [0, 1]; the rest are in engineering units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelaySettings {
    /// Dry/wet amount, equal-power.
    pub mix: f32,
    pub bpm: f32,
    pub beat_left: usize,
    pub beat_right: usize,
    pub feedback: f32,
    pub cross_feedback: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub filter_mode: FilterMode,
    /// Diffuser dry/wet amount.
    pub diffuse: f32,
    pub modulation_depth: f32,
    pub modulation_speed_hz: f32,
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            mix: 0.2,
            bpm: 120.0,
            beat_left: QUARTER_NOTE_INDEX,
            beat_right: QUARTER_NOTE_INDEX,
            feedback: 0.3,
            cross_feedback: 0.1,
            cutoff_hz: 8000.0,
            resonance: 0.0,
            filter_mode: FilterMode::Lp24,
            diffuse: 0.1,
            modulation_depth: 0.2,
            modulation_speed_hz: 0.3,
        }
    }
}

impl DelaySettings {
    /// Copy with every field pulled into the range the network accepts at
    /// `sample_rate`. Non-finite values fall back to the default for that field.
    pub fn clamped_to(&self, sample_rate: f32) -> Self {
        let defaults = Self::default();
        let unit = |value: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let range = |value: f32, min: f32, max: f32, fallback: f32| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            }
        };

        Self {
            mix: unit(self.mix, defaults.mix),
            bpm: range(self.bpm, MIN_BPM, MAX_BPM, defaults.bpm),
            beat_left: self.beat_left.min(BEAT_COUNT - 1),
            beat_right: self.beat_right.min(BEAT_COUNT - 1),
            feedback: unit(self.feedback, defaults.feedback),
            cross_feedback: unit(self.cross_feedback, defaults.cross_feedback),
            cutoff_hz: range(
                self.cutoff_hz,
                MIN_CUTOFF_HZ,
                max_cutoff_hz(sample_rate),
                defaults.cutoff_hz,
            ),
            resonance: unit(self.resonance, defaults.resonance),
            filter_mode: self.filter_mode,
            diffuse: unit(self.diffuse, defaults.diffuse),
            modulation_depth: unit(self.modulation_depth, defaults.modulation_depth),
            modulation_speed_hz: range(
                self.modulation_speed_hz,
                MIN_MODULATION_SPEED_HZ,
                MAX_MODULATION_SPEED_HZ,
                defaults.modulation_speed_hz,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(NetworkConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_sample_rate_is_rejected() {
        for rate in [0.0, -44_100.0, f32::NAN, f32::INFINITY] {
            let config = NetworkConfig::new(rate, 1.0);
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidSampleRate(_))
            ));
        }
    }

    #[test]
    fn test_delay_shorter_than_guard_is_rejected() {
        let config = NetworkConfig::new(48_000.0, 0.0001);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DelayTooShort { samples: 4, .. })
        ));
    }

    #[test]
    fn test_huge_delay_is_rejected_before_allocating() {
        let config = NetworkConfig::new(48_000.0, 1.0e6);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DelayTooLong {
                seconds: 1.0e6,
                limit: MAX_DELAY_SECONDS,
            })
        );
        assert_eq!(NetworkConfig::new(48_000.0, MAX_DELAY_SECONDS).validate(), Ok(()));
        // infinity is not a length either
        assert!(NetworkConfig::new(48_000.0, f32::INFINITY).validate().is_err());
    }

    #[test]
    fn test_defaults_are_already_in_range() {
        let settings = DelaySettings::default();
        assert_eq!(settings.clamped_to(44_100.0), settings);
        assert_eq!(settings.beat_left, 23);
    }

    #[test]
    fn test_clamped_pulls_fields_into_range() {
        let wild = DelaySettings {
            mix: 3.0,
            bpm: 1000.0,
            beat_left: 80,
            beat_right: 2,
            feedback: -1.0,
            cross_feedback: f32::NAN,
            cutoff_hz: -5.0,
            resonance: 2.0,
            filter_mode: FilterMode::Hp12,
            diffuse: 0.5,
            modulation_depth: 1.5,
            modulation_speed_hz: 100.0,
        };
        let clamped = wild.clamped_to(48_000.0);

        assert_eq!(clamped.mix, 1.0);
        assert_eq!(clamped.bpm, MAX_BPM);
        assert_eq!(clamped.beat_left, BEAT_COUNT - 1);
        assert_eq!(clamped.beat_right, 2);
        assert_eq!(clamped.feedback, 0.0);
        assert_eq!(clamped.cross_feedback, 0.1);
        assert_eq!(clamped.cutoff_hz, MIN_CUTOFF_HZ);
        assert_eq!(clamped.resonance, 1.0);
        assert_eq!(clamped.filter_mode, FilterMode::Hp12);
        assert_eq!(clamped.modulation_depth, 1.0);
        assert_eq!(clamped.modulation_speed_hz, MAX_MODULATION_SPEED_HZ);
    }

    #[test]
    fn test_cutoff_ceiling_follows_sample_rate() {
        let open = DelaySettings {
            cutoff_hz: 1e9,
            modulation_speed_hz: 0.0,
            ..DelaySettings::default()
        };

        assert_eq!(open.clamped_to(48_000.0).cutoff_hz, 24_000.0);
        assert_eq!(open.clamped_to(44_100.0).cutoff_hz, 22_050.0);
        // a stopped LFO is a valid setting
        assert_eq!(open.clamped_to(48_000.0).modulation_speed_hz, 0.0);
    }
}
