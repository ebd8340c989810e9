//! Astronomy error types.

use thiserror::Error;

use super::Body;

/// Errors produced while computing positions and events.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AstronomyError {
    /// Observer coordinate outside its valid range (or not a number).
    #[error("{field} must be within {min}..={max}, got {value}")]
    InvalidObserver {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A computation produced NaN or infinity.
    #[error("non-finite {quantity} computed for {body}")]
    NonFinite { body: Body, quantity: &'static str },

    /// A Julian day that cannot be represented as a UTC timestamp.
    #[error("julian day {0} is outside the representable time range")]
    TimeOutOfRange(f64),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AstronomyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_observer_display() {
        let err = AstronomyError::InvalidObserver {
            field: "latitude",
            value: 91.0,
            min: -90.0,
            max: 90.0,
        };
        assert_eq!(err.to_string(), "latitude must be within -90..=90, got 91");
    }

    #[test]
    fn test_non_finite_display() {
        let err = AstronomyError::NonFinite {
            body: Body::Mars,
            quantity: "altitude",
        };
        assert_eq!(err.to_string(), "non-finite altitude computed for Mars");
    }
}
