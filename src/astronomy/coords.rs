//! Angle helpers and the equatorial to horizontal transform.

use astro::coords::{alt_frm_eq, az_frm_eq};
use astro::time::mn_sidr;

use super::ephemeris::BodyPosition;
use super::observer::Observer;

/// Equatorial radius of the Earth in astronomical units.
const EARTH_RADIUS_AU: f64 = 6_378.14 / 149_597_870.7;

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(x: f64) -> f64 {
    let r = x.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 { 0.0 } else { r }
}

/// Wraps an angle into `(-180, 180]`.
pub fn signed_degrees(x: f64) -> f64 {
    let r = normalize_degrees(x);
    if r > 180.0 { r - 360.0 } else { r }
}

pub(crate) fn sin_deg(x: f64) -> f64 {
    x.to_radians().sin()
}

pub(crate) fn cos_deg(x: f64) -> f64 {
    x.to_radians().cos()
}

pub(crate) fn asin_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin().to_degrees()
}

pub(crate) fn acos_deg(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Greenwich mean sidereal time in degrees.
pub fn greenwich_sidereal_time(jd: f64) -> f64 {
    normalize_degrees(mn_sidr(jd).to_degrees())
}

/// Position of a body in the observer's local sky.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    /// Topocentric altitude above the horizon in degrees (no refraction).
    pub altitude: f64,
    /// Azimuth in degrees, measured from north through east.
    pub azimuth: f64,
    /// Local hour angle in degrees, `(-180, 180]`, zero at upper transit.
    pub hour_angle: f64,
}

/// Converts an equatorial position of date into horizontal coordinates.
///
/// `jd` is UT. The altitude is corrected for diurnal parallax, which only
/// matters for the Moon (up to ~1 degree).
pub fn to_horizontal(position: &BodyPosition, observer: &Observer, jd: f64) -> Horizontal {
    let lst = greenwich_sidereal_time(jd) + observer.longitude;
    let hour_angle = signed_degrees(lst - position.right_ascension);

    let (h, dec, lat) = (
        hour_angle.to_radians(),
        position.declination.to_radians(),
        observer.latitude.to_radians(),
    );
    let geocentric_altitude = alt_frm_eq(h, dec, lat).to_degrees();
    // Meeus measures azimuth westward from the south.
    let azimuth = normalize_degrees(az_frm_eq(h, dec, lat).to_degrees() + 180.0);

    let parallax = asin_deg(EARTH_RADIUS_AU / position.distance_au);
    let altitude = geocentric_altitude - parallax * cos_deg(geocentric_altitude);

    Horizontal {
        altitude,
        azimuth,
        hour_angle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distant(ra: f64, dec: f64) -> BodyPosition {
        BodyPosition {
            right_ascension: ra,
            declination: dec,
            ecliptic_longitude: 0.0,
            ecliptic_latitude: 0.0,
            distance_au: 10.0,
            phase_angle: 0.0,
            magnitude: 0.0,
        }
    }

    fn local_sidereal_time(jd: f64, observer: &Observer) -> f64 {
        normalize_degrees(greenwich_sidereal_time(jd) + observer.longitude)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_degrees(370.0), 10.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(-1e-15), 0.0);
        assert_eq!(signed_degrees(350.0), -10.0);
        assert_eq!(signed_degrees(180.0), 180.0);
    }

    #[test]
    fn test_sidereal_time_at_j2000() {
        // GMST at J2000.0 is 18h41m50.5s = 280.4606 degrees.
        assert!((greenwich_sidereal_time(2_451_545.0) - 280.4606).abs() < 1e-3);
    }

    #[test]
    fn test_zenith_at_transit() {
        let jd = 2_460_335.125;
        let observer = Observer::new(30.0, 45.0, 0.0).expect("valid");
        let lst = local_sidereal_time(jd, &observer);
        let h = to_horizontal(&distant(lst, 30.0), &observer, jd);
        assert!((h.altitude - 90.0).abs() < 1e-3, "altitude {}", h.altitude);
        assert!(h.hour_angle.abs() < 1e-9);
    }

    #[test]
    fn test_setting_in_the_west() {
        let jd = 2_460_335.125;
        let observer = Observer::new(0.0, 0.0, 0.0).expect("valid");
        let lst = local_sidereal_time(jd, &observer);
        // Hour angle +90 on the celestial equator: on the western horizon.
        let h = to_horizontal(&distant(lst - 90.0, 0.0), &observer, jd);
        assert!(h.altitude.abs() < 1e-3);
        assert!((h.azimuth - 270.0).abs() < 1e-6);
        assert!((h.hour_angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rising_in_the_east() {
        let jd = 2_460_335.125;
        let observer = Observer::new(0.0, 0.0, 0.0).expect("valid");
        let lst = local_sidereal_time(jd, &observer);
        let h = to_horizontal(&distant(lst + 90.0, 0.0), &observer, jd);
        assert!((h.azimuth - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_of_zenith_is_azimuth_zero() {
        let jd = 2_460_335.125;
        let observer = Observer::new(30.0, 10.0, 0.0).expect("valid");
        let lst = local_sidereal_time(jd, &observer);
        let h = to_horizontal(&distant(lst, 60.0), &observer, jd);
        assert!((h.altitude - 60.0).abs() < 1e-3);
        assert!(h.azimuth < 1e-6 || h.azimuth > 360.0 - 1e-6, "azimuth {}", h.azimuth);
    }

    #[test]
    fn test_moon_parallax_lowers_altitude() {
        let jd = 2_460_335.125;
        let observer = Observer::new(0.0, 0.0, 0.0).expect("valid");
        let lst = local_sidereal_time(jd, &observer);
        let mut moon = distant(lst - 90.0, 0.0);
        moon.distance_au = 0.00257;
        let h = to_horizontal(&moon, &observer, jd);
        // Horizontal parallax of the Moon is close to one degree.
        assert!(h.altitude < -0.9 && h.altitude > -1.0, "altitude {}", h.altitude);
    }
}
