//! Observer location.

use serde::{Deserialize, Serialize};

use super::error::{AstronomyError, Result};

/// A place on Earth from which the sky is observed.
///
/// Construct through [`Observer::new`] to get range validation; the fields
/// are public for serialization of already-validated values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Geodetic latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Height above sea level in meters.
    #[serde(default)]
    pub elevation: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Result<Self> {
        check_range("latitude", latitude, -90.0, 90.0)?;
        check_range("longitude", longitude, -180.0, 180.0)?;
        check_range("elevation", elevation, -500.0, 100_000.0)?;
        Ok(Self {
            latitude,
            longitude,
            elevation,
        })
    }

    /// Dip of the sea horizon in degrees for the observer's height.
    pub fn horizon_dip(&self) -> f64 {
        0.0293 * self.elevation.max(0.0).sqrt()
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    // NaN fails both comparisons, so it is rejected here too.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(AstronomyError::InvalidObserver {
            field,
            value,
            min,
            max,
        })
    }
}
