use std::fmt;

/// Musical note duration represented as a rational fraction of a whole note.
/// All operations preserve exact ratios, so table entries built from them
/// carry no floating point drift until converted to beats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Numerator: how many parts
    pub numerator: u32,
    /// Denominator: of what size (4 = quarter, 8 = eighth, etc.)
    pub denominator: u32,
}

impl Duration {
    // Standard note values
    pub const WHOLE: Duration = Duration::new(1, 1);
    pub const HALF: Duration = Duration::new(1, 2);
    pub const QUARTER: Duration = Duration::new(1, 4);
    pub const EIGHTH: Duration = Duration::new(1, 8);
    pub const SIXTEENTH: Duration = Duration::new(1, 16);

    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Duration {
            numerator,
            denominator,
        }
    }

    /// One dot adds half the value: × 3/2.
    pub const fn dotted(self) -> Self {
        Duration {
            numerator: self.numerator * 3,
            denominator: self.denominator * 2,
        }
    }

    /// Two dots add a half and a quarter: × 7/4.
    pub const fn double_dotted(self) -> Self {
        Duration {
            numerator: self.numerator * 7,
            denominator: self.denominator * 4,
        }
    }

    /// Three in the time of two.
    pub const fn triplet(self) -> Self {
        self.tuplet(2, 3)
    }

    /// Five in the time of four.
    pub const fn quintuplet(self) -> Self {
        self.tuplet(4, 5)
    }

    /// `played` notes squeezed into the span of `in_time_of`.
    pub const fn tuplet(self, in_time_of: u32, played: u32) -> Self {
        Duration {
            numerator: self.numerator * in_time_of,
            denominator: self.denominator * played,
        }
    }

    /// Lowest terms.
    pub const fn reduce(self) -> Self {
        let gcd = const_gcd(self.numerator, self.denominator);
        Duration {
            numerator: self.numerator / gcd,
            denominator: self.denominator / gcd,
        }
    }

    /// Length in quarter-note beats (whole note = 4.0).
    pub fn beats(&self) -> f32 {
        (self.numerator as f32 * 4.0) / self.denominator as f32
    }

    /// Length in seconds at `bpm` quarter notes per minute.
    pub fn seconds_at(&self, bpm: f32) -> f32 {
        60.0 / bpm * self.beats()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reduced = self.reduce();
        write!(f, "{}/{}", reduced.numerator, reduced.denominator)
    }
}

/// Euclid, usable in const context.
const fn const_gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        const_gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_durations_in_beats() {
        assert_eq!(Duration::WHOLE.beats(), 4.0);
        assert_eq!(Duration::HALF.beats(), 2.0);
        assert_eq!(Duration::QUARTER.beats(), 1.0);
        assert_eq!(Duration::EIGHTH.beats(), 0.5);
        assert_eq!(Duration::SIXTEENTH.beats(), 0.25);
    }

    #[test]
    fn test_dotted_notes() {
        // Dotted quarter = 1.5 quarters
        assert_eq!(Duration::QUARTER.dotted().beats(), 1.5);
        // Double-dotted quarter = 1 + 1/2 + 1/4 quarters
        assert_eq!(Duration::QUARTER.double_dotted().beats(), 1.75);
        assert_eq!(Duration::EIGHTH.dotted().beats(), 0.75);
    }

    #[test]
    fn test_triplets_and_quintuplets() {
        assert!((Duration::QUARTER.triplet().beats() - 2.0 / 3.0).abs() < 1e-6);
        assert!((Duration::EIGHTH.quintuplet().beats() - 0.4).abs() < 1e-6);
        assert_eq!(Duration::EIGHTH.quintuplet(), Duration::EIGHTH.tuplet(4, 5));
    }

    #[test]
    fn test_reduce() {
        assert_eq!(Duration::new(4, 8).reduce(), Duration::HALF);
        assert_eq!(Duration::new(6, 9).reduce(), Duration::new(2, 3));
        assert_eq!(Duration::new(7, 32).reduce(), Duration::new(7, 32));
    }

    #[test]
    fn test_display_is_reduced() {
        assert_eq!(Duration::SIXTEENTH.triplet().to_string(), "1/24");
        assert_eq!(Duration::new(2, 1).dotted().to_string(), "3/1");
    }

    #[test]
    fn test_seconds_at_tempo() {
        assert_eq!(Duration::QUARTER.seconds_at(120.0), 0.5);
        assert_eq!(Duration::WHOLE.seconds_at(120.0), 2.0);
        assert_eq!(Duration::EIGHTH.seconds_at(60.0), 0.5);
    }

    #[test]
    fn test_builds_in_const_context() {
        // dotted-quarter triplet is a plain quarter
        const VALUE: Duration = Duration::QUARTER.dotted().triplet().reduce();
        assert_eq!(VALUE, Duration::QUARTER);
    }
}
