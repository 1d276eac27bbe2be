//! Tempo-synced delay times.
//!
//! A fixed, ascending table of 59 note divisions from a 1/64 triplet up to
//! four double-dotted whole notes. The delay time for an entry is
//!
//! ```text
//! seconds = 60 / bpm × beats
//! ```
//!
//! where `beats` counts quarter notes. Entries named `n/16` (without a
//! modifier) are fractions of a quarter-note beat and fill the gaps between
//! the straight, dotted and tuplet values.

use super::duration::Duration;

/// One selectable note division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatDivision {
    /// Musical name, e.g. `"1/8 dot"`.
    pub name: &'static str,
    /// Equivalent plain fraction of a whole note, empty when `name` already is one.
    pub alias: &'static str,
    pub duration: Duration,
}

impl BeatDivision {
    const fn new(name: &'static str, alias: &'static str, duration: Duration) -> Self {
        Self {
            name,
            alias,
            duration,
        }
    }

    /// Length in quarter-note beats.
    pub fn beats(&self) -> f32 {
        self.duration.beats()
    }

    pub fn seconds_at(&self, bpm: f32) -> f32 {
        self.duration.seconds_at(bpm)
    }
}

/// Fraction of a quarter-note beat, expressed as a whole-note duration.
const fn beat_sixteenths(n: u32) -> Duration {
    Duration::new(n, 64)
}

const fn note(numerator: u32, denominator: u32) -> Duration {
    Duration::new(numerator, denominator)
}

pub const BEAT_COUNT: usize = 59;

/// Index of the quarter note.
pub const QUARTER_NOTE_INDEX: usize = 23;

pub static BEAT_TABLE: [BeatDivision; BEAT_COUNT] = [
    BeatDivision::new("1/64 triplet", "1/96", note(1, 64).triplet()),
    BeatDivision::new("1/64", "", note(1, 64)),
    BeatDivision::new("1/32 triplet", "1/48", note(1, 32).triplet()),
    BeatDivision::new("1/32", "", note(1, 32)),
    BeatDivision::new("1/16 triplet", "1/24", note(1, 16).triplet()),
    BeatDivision::new("1/32 dot", "3/64", note(1, 32).dotted()),
    BeatDivision::new("1/16 quintuplet", "1/20", note(1, 16).quintuplet()),
    BeatDivision::new("1/16", "", note(1, 16)),
    BeatDivision::new("5/16", "", beat_sixteenths(5)),
    BeatDivision::new("1/8 triplet", "1/12", note(1, 8).triplet()),
    BeatDivision::new("1/16 dot", "3/32", note(1, 16).dotted()),
    BeatDivision::new("1/8 quintuplet", "1/10", note(1, 8).quintuplet()),
    BeatDivision::new("1/16 doubledot", "7/64", note(1, 16).double_dotted()),
    BeatDivision::new("1/8", "", note(1, 8)),
    BeatDivision::new("9/16", "", beat_sixteenths(9)),
    BeatDivision::new("5/8", "", beat_sixteenths(10)),
    BeatDivision::new("1/4 triplet", "1/6", note(1, 4).triplet()),
    BeatDivision::new("11/16", "", beat_sixteenths(11)),
    BeatDivision::new("1/8 dot", "3/16", note(1, 8).dotted()),
    BeatDivision::new("1/4 quintuplet", "1/5", note(1, 4).quintuplet()),
    BeatDivision::new("13/16", "", beat_sixteenths(13)),
    BeatDivision::new("1/8 doubledot", "7/32", note(1, 8).double_dotted()),
    BeatDivision::new("15/16", "", beat_sixteenths(15)),
    BeatDivision::new("1/4", "", note(1, 4)),
    BeatDivision::new("17/16", "", beat_sixteenths(17)),
    BeatDivision::new("9/8", "", beat_sixteenths(18)),
    BeatDivision::new("19/16", "", beat_sixteenths(19)),
    BeatDivision::new("5/4", "", beat_sixteenths(20)),
    BeatDivision::new("21/16", "", beat_sixteenths(21)),
    BeatDivision::new("1/2 triplet", "1/3", note(1, 2).triplet()),
    BeatDivision::new("11/8", "", beat_sixteenths(22)),
    BeatDivision::new("23/16", "", beat_sixteenths(23)),
    BeatDivision::new("1/4 dot", "3/8", note(1, 4).dotted()),
    BeatDivision::new("25/16", "", beat_sixteenths(25)),
    BeatDivision::new("1/2 quintuplet", "2/5", note(1, 2).quintuplet()),
    BeatDivision::new("13/8", "", beat_sixteenths(26)),
    BeatDivision::new("27/16", "", beat_sixteenths(27)),
    BeatDivision::new("1/4 doubledot", "7/16", note(1, 4).double_dotted()),
    BeatDivision::new("29/16", "", beat_sixteenths(29)),
    BeatDivision::new("15/8", "", beat_sixteenths(30)),
    BeatDivision::new("31/16", "", beat_sixteenths(31)),
    BeatDivision::new("1/2", "", note(1, 2)),
    BeatDivision::new("1 triplet", "2/3", note(1, 1).triplet()),
    BeatDivision::new("1/2 dot", "3/4", note(1, 2).dotted()),
    BeatDivision::new("1 quintuplet", "4/5", note(1, 1).quintuplet()),
    BeatDivision::new("1/2 doubledot", "7/8", note(1, 2).double_dotted()),
    BeatDivision::new("1", "", note(1, 1)),
    BeatDivision::new("2 triplet", "4/3", note(2, 1).triplet()),
    BeatDivision::new("1 dot", "3/2", note(1, 1).dotted()),
    BeatDivision::new("2 quintuplet", "8/5", note(2, 1).quintuplet()),
    BeatDivision::new("1 doubledot", "7/4", note(1, 1).double_dotted()),
    BeatDivision::new("2", "", note(2, 1)),
    BeatDivision::new("4 triplet", "8/3", note(4, 1).triplet()),
    BeatDivision::new("2 dot", "3/1", note(2, 1).dotted()),
    BeatDivision::new("4 quintuplet", "16/5", note(4, 1).quintuplet()),
    BeatDivision::new("2 doubledot", "7/2", note(2, 1).double_dotted()),
    BeatDivision::new("4", "", note(4, 1)),
    BeatDivision::new("4 dot", "6/1", note(4, 1).dotted()),
    BeatDivision::new("4 doubledot", "7/1", note(4, 1).double_dotted()),
];

/// Read-only view over [`BEAT_TABLE`].
pub struct BeatTable;

impl BeatTable {
    pub fn len() -> usize {
        BEAT_COUNT
    }

    pub fn get(index: usize) -> Option<&'static BeatDivision> {
        BEAT_TABLE.get(index)
    }

    /// Entry at `index`, clamped into the table.
    pub fn get_clamped(index: usize) -> &'static BeatDivision {
        &BEAT_TABLE[index.min(BEAT_COUNT - 1)]
    }

    /// Index of the entry whose name or alias equals `name`.
    pub fn find(name: &str) -> Option<usize> {
        BEAT_TABLE
            .iter()
            .position(|entry| entry.name == name || (!entry.alias.is_empty() && entry.alias == name))
    }

    /// Index of the entry closest to `beats` quarter notes.
    pub fn nearest(beats: f32) -> usize {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (index, entry) in BEAT_TABLE.iter().enumerate() {
            let distance = (entry.beats() - beats).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }

    /// Delay time in seconds for entry `index` at `bpm`. Out-of-range
    /// indices use the last entry.
    pub fn delay_seconds(bpm: f32, index: usize) -> f32 {
        Self::get_clamped(index).seconds_at(bpm)
    }
}
