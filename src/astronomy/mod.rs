//! Astronomy Module
//!
//! Computes which of the Sun, Moon and seven planets are above the horizon
//! for an observer, when they next rise, set and transit, how bright they
//! are and when they are best seen against a dark sky.

pub mod body;
pub mod coords;
pub mod ephemeris;
pub mod error;
pub mod events;
pub mod observer;
pub mod phase;
pub mod time;
pub mod viewing;
pub mod visibility;

// Re-exports
pub use body::Body;
pub use coords::{Horizontal, to_horizontal};
pub use ephemeris::{BodyPosition, Ephemeris, VsopEphemeris};
pub use error::{AstronomyError, Result};
pub use events::{EventTimes, find_events, find_rise, find_set, find_transit};
pub use observer::Observer;
pub use phase::MoonPhase;
pub use viewing::{ViewingAdvice, ViewingKind, plan_viewing};
pub use visibility::{
    CelestialBodyInfo, VisibilityCalculator, VisibilityReport, VisibilityRequest,
};
