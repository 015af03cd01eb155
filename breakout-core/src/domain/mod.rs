//! Domain types for the breakout scanner

pub mod bar;
pub mod candidate;
pub mod series;

pub use bar::Bar;
pub use candidate::{Candidate, Interval, ScanMode};
pub use series::{Series, SeriesError};
