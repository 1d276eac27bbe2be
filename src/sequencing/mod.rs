pub mod beats;
pub mod duration;

pub use beats::{BeatDivision, BeatTable, BEAT_TABLE};
pub use duration::Duration;
