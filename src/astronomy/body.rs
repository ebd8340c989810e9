//! The fixed set of bodies the bot reports on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A solar-system body tracked by the visibility report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    /// Every body in report order.
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }

    /// Topocentric altitude (degrees) of the body's center at rise and set.
    ///
    /// Includes standard refraction (34') and, for the Sun and Moon, the
    /// apparent semidiameter so that rise/set refer to the upper limb.
    pub fn standard_altitude(self) -> f64 {
        match self {
            Body::Sun | Body::Moon => -0.833,
            _ => -0.5667,
        }
    }

    /// Planets only (everything except the Sun and Moon).
    pub fn is_planet(self) -> bool {
        !matches!(self, Body::Sun | Body::Moon)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_bodies_unique_and_named() {
        let names: std::collections::HashSet<_> = Body::ALL.iter().map(|b| b.name()).collect();
        assert_eq!(names.len(), 9);
        assert_eq!(Body::ALL[0], Body::Sun);
        assert_eq!(Body::Neptune.to_string(), "Neptune");
    }

    #[test]
    fn test_planets() {
        assert!(!Body::Sun.is_planet());
        assert!(!Body::Moon.is_planet());
        assert_eq!(Body::ALL.iter().filter(|b| b.is_planet()).count(), 7);
    }
}
