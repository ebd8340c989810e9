//! Positions of the Sun, Moon and planets.
//!
//! [`VsopEphemeris`] takes its series from the `astro` crate: VSOP87 for the
//! Earth and planets, ELP-2000/82 as abridged by Meeus for the Moon, and the
//! IAU 1980 nutation. This module moves those results from heliocentric to
//! geocentric and from ecliptic to equatorial coordinates, and derives phase
//! and brightness.

use astro::coords::{asc_frm_ecl, dec_frm_ecl};
use astro::planet::{Planet, heliocent_coords};
use astro::{ecliptic, lunar, nutation};

use super::body::Body;
use super::coords::{acos_deg, asin_deg, cos_deg, normalize_degrees, sin_deg};
use super::error::{AstronomyError, Result};
use super::time::ephemeris_day;

/// Kilometers per astronomical unit.
const AU_KM: f64 = 149_597_870.7;
/// Light travel time across one astronomical unit, in days.
const LIGHT_DAYS_PER_AU: f64 = 0.005_775_518_3;
/// Constant of annual aberration in degrees.
const ABERRATION_DEG: f64 = 20.4898 / 3_600.0;

/// Apparent position and brightness of a body at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPosition {
    /// Geocentric right ascension of date in degrees, `[0, 360)`.
    pub right_ascension: f64,
    /// Geocentric declination of date in degrees.
    pub declination: f64,
    /// Geocentric ecliptic longitude of date in degrees.
    pub ecliptic_longitude: f64,
    /// Geocentric ecliptic latitude in degrees.
    pub ecliptic_latitude: f64,
    /// Distance from the Earth's center in astronomical units.
    pub distance_au: f64,
    /// Sun-body-Earth angle in degrees (zero for the Sun).
    pub phase_angle: f64,
    /// Apparent visual magnitude.
    pub magnitude: f64,
}

impl BodyPosition {
    /// Fraction of the visible disk that is lit, `0.0..=1.0`.
    pub fn illuminated_fraction(&self) -> f64 {
        (1.0 + cos_deg(self.phase_angle)) / 2.0
    }
}

/// Source of body positions.
///
/// Event search and reporting only depend on this trait, so another
/// astronomy library can be dropped in behind it.
pub trait Ephemeris: Send + Sync {
    /// Position of `body` at the UT Julian day `jd`.
    fn position(&self, body: Body, jd: f64) -> Result<BodyPosition>;
}

/// Ephemeris backed by the VSOP87 and ELP series of the `astro` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct VsopEphemeris;

impl VsopEphemeris {
    pub fn new() -> Self {
        Self
    }
}

impl Ephemeris for VsopEphemeris {
    fn position(&self, body: Body, jd: f64) -> Result<BodyPosition> {
        if !jd.is_finite() {
            return Err(AstronomyError::NonFinite {
                body,
                quantity: "time",
            });
        }
        let frame = Frame::at(jd);
        let position = match body {
            Body::Sun => frame.sun(),
            Body::Moon => frame.moon(),
            Body::Mercury => frame.planet(&Planet::Mercury, &MERCURY),
            Body::Venus => frame.planet(&Planet::Venus, &VENUS),
            Body::Mars => frame.planet(&Planet::Mars, &MARS),
            Body::Jupiter => frame.planet(&Planet::Jupiter, &JUPITER),
            Body::Saturn => frame.planet(&Planet::Saturn, &SATURN),
            Body::Uranus => frame.planet(&Planet::Uranus, &URANUS),
            Body::Neptune => frame.planet(&Planet::Neptune, &NEPTUNE),
        };
        check_finite(body, position)
    }
}

fn check_finite(body: Body, p: BodyPosition) -> Result<BodyPosition> {
    let fields = [
        ("right ascension", p.right_ascension),
        ("declination", p.declination),
        ("distance", p.distance_au),
        ("magnitude", p.magnitude),
        ("phase angle", p.phase_angle),
    ];
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some((quantity, _)) => Err(AstronomyError::NonFinite {
            body,
            quantity: *quantity,
        }),
        None => Ok(p),
    }
}

// ── Photometry ───────────────────────────────────────────────────

/// Magnitude at unit distances and its phase-angle coefficients.
struct Photometry {
    base: f64,
    linear: f64,
    /// Higher order phase term as (coefficient, power).
    extra: Option<(f64, i32)>,
    rings: bool,
}

const fn photometry(base: f64, linear: f64, extra: Option<(f64, i32)>) -> Photometry {
    Photometry {
        base,
        linear,
        extra,
        rings: false,
    }
}

const MERCURY: Photometry = photometry(-0.36, 0.027, Some((2.2e-13, 6)));
const VENUS: Photometry = photometry(-4.34, 0.013, Some((4.2e-7, 3)));
const MARS: Photometry = photometry(-1.51, 0.016, None);
const JUPITER: Photometry = photometry(-9.25, 0.014, None);
const SATURN: Photometry = Photometry {
    rings: true,
    ..photometry(-9.0, 0.044, None)
};
const URANUS: Photometry = photometry(-7.15, 0.001, None);
const NEPTUNE: Photometry = photometry(-6.90, 0.001, None);

/// Brightening from Saturn's rings given its geocentric ecliptic position.
fn saturn_ring_term(lon: f64, lat: f64, jde: f64) -> f64 {
    let d = jde - 2_451_543.5;
    let ring_inclination = 28.06;
    let ring_node = 169.51 + 3.82e-5 * d;
    let tilt = asin_deg(
        sin_deg(lat) * cos_deg(ring_inclination)
            - cos_deg(lat) * sin_deg(ring_inclination) * sin_deg(lon - ring_node),
    );
    -2.6 * sin_deg(tilt.abs()) + 1.2 * sin_deg(tilt).powi(2)
}

// ── Frames ───────────────────────────────────────────────────────

/// Ecliptic spherical (radians, AU) to rectangular coordinates.
fn rectangular(longitude: f64, latitude: f64, radius: f64) -> [f64; 3] {
    [
        radius * latitude.cos() * longitude.cos(),
        radius * latitude.cos() * longitude.sin(),
        radius * latitude.sin(),
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Quantities shared by every body at one instant.
struct Frame {
    /// Julian ephemeris day (TT).
    jde: f64,
    /// Nutation in longitude, radians.
    nutation_longitude: f64,
    /// True obliquity of the ecliptic, radians.
    obliquity: f64,
    /// Heliocentric longitude, latitude (radians) and distance (AU) of the Earth.
    earth: (f64, f64, f64),
}

impl Frame {
    fn at(jd: f64) -> Self {
        let jde = ephemeris_day(jd);
        let (nutation_longitude, nutation_obliquity) = nutation::nutation(jde);
        Self {
            jde,
            nutation_longitude,
            obliquity: ecliptic::mn_oblq_laskar(jde) + nutation_obliquity,
            earth: heliocent_coords(&Planet::Earth, jde),
        }
    }

    /// Right ascension and declination (degrees) of an apparent ecliptic direction (degrees).
    fn equatorial(&self, longitude: f64, latitude: f64) -> (f64, f64) {
        let (lon, lat) = (longitude.to_radians(), latitude.to_radians());
        let ra = asc_frm_ecl(lon, lat, self.obliquity).to_degrees();
        let dec = dec_frm_ecl(lon, lat, self.obliquity).to_degrees();
        (normalize_degrees(ra), dec)
    }

    fn position(
        &self,
        longitude: f64,
        latitude: f64,
        distance_au: f64,
        phase_angle: f64,
        magnitude: f64,
    ) -> BodyPosition {
        let (right_ascension, declination) = self.equatorial(longitude, latitude);
        BodyPosition {
            right_ascension,
            declination,
            ecliptic_longitude: longitude,
            ecliptic_latitude: latitude,
            distance_au,
            phase_angle,
            magnitude,
        }
    }

    fn sun_distance(&self) -> f64 {
        self.earth.2
    }

    /// Apparent geocentric longitude of the Sun in degrees.
    fn sun_longitude(&self) -> f64 {
        let (l, _, r) = self.earth;
        normalize_degrees(
            l.to_degrees() + 180.0 + self.nutation_longitude.to_degrees() - ABERRATION_DEG / r,
        )
    }

    fn sun(&self) -> BodyPosition {
        let (_, b, r) = self.earth;
        self.position(
            self.sun_longitude(),
            -b.to_degrees(),
            r,
            0.0,
            -26.74 + 5.0 * r.log10(),
        )
    }

    fn moon(&self) -> BodyPosition {
        let (point, distance_km) = lunar::geocent_ecl_pos(self.jde);
        let longitude = normalize_degrees((point.long + self.nutation_longitude).to_degrees());
        let latitude = point.lat.to_degrees();

        let sun_km = self.sun_distance() * AU_KM;
        let elongation = acos_deg(cos_deg(latitude) * cos_deg(longitude - self.sun_longitude()));
        let phase_angle = (sun_km * sin_deg(elongation))
            .atan2(distance_km - sun_km * cos_deg(elongation))
            .to_degrees();

        let distance_au = distance_km / AU_KM;
        let magnitude = 0.23
            + 5.0 * (self.sun_distance() * distance_au).log10()
            + 0.026 * phase_angle
            + 4.0e-9 * phase_angle.powi(4);
        self.position(longitude, latitude, distance_au, phase_angle, magnitude)
    }

    /// Geocentric vector (AU) of a planet as seen now, so displaced by the
    /// light travel time, and the planet's distance from the Sun.
    fn planet_vector(&self, planet: &Planet) -> ([f64; 3], f64) {
        let (l, b, r) = self.earth;
        let earth = rectangular(l, b, r);
        let mut light_time = 0.0;
        let mut vector = ([0.0; 3], 0.0);
        for _ in 0..2 {
            let (pl, pb, pr) = heliocent_coords(planet, self.jde - light_time);
            let p = rectangular(pl, pb, pr);
            let v = [p[0] - earth[0], p[1] - earth[1], p[2] - earth[2]];
            light_time = norm(v) * LIGHT_DAYS_PER_AU;
            vector = (v, pr);
        }
        vector
    }

    fn planet(&self, planet: &Planet, photometry: &Photometry) -> BodyPosition {
        let ([x, y, z], r) = self.planet_vector(planet);
        let distance = norm([x, y, z]);
        let longitude =
            normalize_degrees(y.atan2(x).to_degrees() + self.nutation_longitude.to_degrees());
        let latitude = z.atan2(x.hypot(y)).to_degrees();

        let s = self.sun_distance();
        let phase_angle = acos_deg((r * r + distance * distance - s * s) / (2.0 * r * distance));

        let mut magnitude =
            photometry.base + 5.0 * (r * distance).log10() + photometry.linear * phase_angle;
        if let Some((coefficient, power)) = photometry.extra {
            magnitude += coefficient * phase_angle.powi(power);
        }
        if photometry.rings {
            magnitude += saturn_ring_term(longitude, latitude, self.jde);
        }
        self.position(longitude, latitude, distance, phase_angle, magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomy::time::julian_day;
    use chrono::{TimeZone, Utc};

    fn jd(y: i32, m: u32, d: u32, h: u32, min: u32) -> f64 {
        julian_day(
            Utc.with_ymd_and_hms(y, m, d, h, min, 0)
                .single()
                .expect("date"),
        )
    }

    /// UT Julian day whose ephemeris day is `jde`.
    fn ut_for(jde: f64) -> f64 {
        jde - (ephemeris_day(jde) - jde)
    }

    fn angle_diff(a: f64, b: f64) -> f64 {
        let d = normalize_degrees(a - b);
        d.min(360.0 - d)
    }

    fn hms(h: f64, m: f64, s: f64) -> f64 {
        (h + m / 60.0 + s / 3_600.0) * 15.0
    }

    fn dms(d: f64, m: f64, s: f64) -> f64 {
        d.signum() * (d.abs() + m / 60.0 + s / 3_600.0)
    }

    #[test]
    fn test_sun_1992_october_13() {
        // Meeus, Astronomical Algorithms, example 25.b.
        let sun = VsopEphemeris::new()
            .position(Body::Sun, ut_for(2_448_908.5))
            .expect("sun");
        assert!(angle_diff(sun.right_ascension, hms(13.0, 13.0, 30.749)) < 0.01);
        assert!((sun.declination - dms(-7.0, 47.0, 1.74)).abs() < 0.01);
        assert!((sun.distance_au - 0.997_608).abs() < 1e-4);
    }

    #[test]
    fn test_moon_1992_april_12() {
        // Meeus example 47.a.
        let moon = VsopEphemeris::new()
            .position(Body::Moon, ut_for(2_448_724.5))
            .expect("moon");
        assert!(angle_diff(moon.ecliptic_longitude, 133.167_265) < 0.01);
        assert!((moon.ecliptic_latitude + 3.229_126).abs() < 0.01);
        assert!((moon.distance_au * AU_KM - 368_409.7).abs() < 10.0);
        assert!(angle_diff(moon.right_ascension, 134.688_470) < 0.01);
        assert!((moon.declination - 13.768_368).abs() < 0.01);
    }

    #[test]
    fn test_venus_1992_december_20() {
        // Meeus example 33.a.
        let venus = VsopEphemeris::new()
            .position(Body::Venus, ut_for(2_448_976.5))
            .expect("venus");
        assert!(angle_diff(venus.right_ascension, hms(21.0, 4.0, 41.454)) < 0.02);
        assert!((venus.declination - dms(-18.0, 53.0, 16.84)).abs() < 0.02);
        assert!((venus.distance_au - 0.910_947).abs() < 1e-3);
    }

    #[test]
    fn test_june_solstice_declination() {
        let sun = VsopEphemeris::new()
            .position(Body::Sun, jd(2024, 6, 20, 20, 51))
            .expect("sun");
        assert!((sun.declination - 23.436).abs() < 0.02, "dec {}", sun.declination);
        assert!(angle_diff(sun.ecliptic_longitude, 90.0) < 0.01);
    }

    #[test]
    fn test_march_equinox() {
        let sun = VsopEphemeris::new()
            .position(Body::Sun, jd(2024, 3, 20, 3, 6))
            .expect("sun");
        assert!(sun.declination.abs() < 0.02, "dec {}", sun.declination);
        assert!((sun.magnitude + 26.74).abs() < 0.05);
    }

    #[test]
    fn test_full_moon_illumination() {
        let moon = VsopEphemeris::new()
            .position(Body::Moon, jd(2024, 1, 25, 17, 54))
            .expect("moon");
        assert!(moon.illuminated_fraction() > 0.99);
        assert!(moon.magnitude < -12.0);
        assert!(moon.distance_au > 0.0023 && moon.distance_au < 0.0028);
    }

    #[test]
    fn test_first_quarter_moon() {
        let eph = VsopEphemeris::new();
        let t = jd(2024, 1, 18, 3, 53);
        let moon = eph.position(Body::Moon, t).expect("moon");
        let sun = eph.position(Body::Sun, t).expect("sun");
        assert!((moon.illuminated_fraction() - 0.5).abs() < 0.02);
        let elong = normalize_degrees(moon.ecliptic_longitude - sun.ecliptic_longitude);
        assert!((elong - 90.0).abs() < 0.5, "first quarter is 90 degrees east, got {elong}");
    }

    #[test]
    fn test_great_conjunction_2020() {
        let eph = VsopEphemeris::new();
        let t = jd(2020, 12, 21, 18, 0);
        let jupiter = eph.position(Body::Jupiter, t).expect("jupiter");
        let saturn = eph.position(Body::Saturn, t).expect("saturn");
        assert!(angle_diff(jupiter.right_ascension, saturn.right_ascension) < 0.3);
        assert!((jupiter.declination - saturn.declination).abs() < 0.3);
    }

    #[test]
    fn test_mars_opposition_2022() {
        let eph = VsopEphemeris::new();
        let t = jd(2022, 12, 8, 5, 0);
        let mars = eph.position(Body::Mars, t).expect("mars");
        let sun = eph.position(Body::Sun, t).expect("sun");
        assert!(angle_diff(mars.ecliptic_longitude, sun.ecliptic_longitude + 180.0) < 0.2);
        assert!(mars.phase_angle < 2.0);
        assert!(mars.magnitude < -1.5 && mars.magnitude > -2.2, "mag {}", mars.magnitude);
    }

    #[test]
    fn test_all_bodies_finite_over_centuries() {
        let eph = VsopEphemeris::new();
        for t in [2_415_020.5, 2_451_545.0, 2_488_069.5] {
            for body in Body::ALL {
                let p = eph.position(body, t).expect("finite position");
                assert!((0.0..360.0).contains(&p.right_ascension));
                assert!(p.declination.abs() <= 90.0);
                assert!((0.0..=1.0).contains(&p.illuminated_fraction()));
            }
        }
    }

    #[test]
    fn test_non_finite_time_is_an_error() {
        let err = VsopEphemeris::new()
            .position(Body::Mars, f64::NAN)
            .expect_err("nan time");
        assert!(matches!(
            err,
            AstronomyError::NonFinite {
                body: Body::Mars,
                quantity: "time"
            }
        ));
    }
}
