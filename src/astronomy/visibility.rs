//! Per-body visibility report.
//!
//! [`VisibilityCalculator::compute`] is the single entry point used by the
//! agent tool, the HTTP API and the CLI. A failure in one body's event
//! search is logged and reported as unknown fields; only an invalid
//! observer fails the whole call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::coords::{normalize_degrees, to_horizontal};
use super::ephemeris::{BodyPosition, Ephemeris, VsopEphemeris};
use super::error::Result;
use super::events::{EventTimes, find_events};
use super::observer::Observer;
use super::phase::MoonPhase;
use super::time::{display_time, from_julian_day, julian_day};
use super::viewing::{SUN_SAFETY_WARNING, plan_viewing};

/// Visibility facts for one body at the query instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CelestialBodyInfo {
    pub name: String,
    pub is_visible: bool,
    /// Degrees above the horizon (negative below).
    pub altitude: f64,
    /// Degrees from north through east.
    pub azimuth: f64,
    pub rise_time: Option<DateTime<Utc>>,
    pub set_time: Option<DateTime<Utc>>,
    pub transit_time: Option<DateTime<Utc>>,
    pub magnitude: Option<f64>,
    /// Lit percentage of the disk, Moon only.
    pub illumination: Option<f64>,
    pub moon_phase: Option<MoonPhase>,
    pub visibility_window: String,
    pub best_viewing_time: String,
}

/// Input of the visibility tool and the `/api/visibility` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level; zero when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
    /// RFC 3339 instant; the current time when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
}

impl VisibilityRequest {
    /// Validates the observer and fills in defaults.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<(Observer, DateTime<Utc>)> {
        let observer = Observer::new(
            self.latitude,
            self.longitude,
            self.elevation.unwrap_or(0.0),
        )?;
        Ok((observer, self.time.unwrap_or(now)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityReport {
    pub observer: Observer,
    pub time: DateTime<Utc>,
    pub bodies: Vec<CelestialBodyInfo>,
    pub summary: String,
}

impl VisibilityReport {
    pub fn body(&self, name: &str) -> Option<&CelestialBodyInfo> {
        self.bodies.iter().find(|b| b.name == name)
    }
}

/// Computes [`VisibilityReport`]s from an [`Ephemeris`].
#[derive(Debug, Clone, Default)]
pub struct VisibilityCalculator<E = VsopEphemeris> {
    ephemeris: E,
}

impl VisibilityCalculator<VsopEphemeris> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: Ephemeris> VisibilityCalculator<E> {
    pub fn with_ephemeris(ephemeris: E) -> Self {
        Self { ephemeris }
    }

    pub fn compute(&self, observer: &Observer, at: DateTime<Utc>) -> Result<VisibilityReport> {
        // Fields are public, so re-check values that bypassed Observer::new.
        let observer = Observer::new(observer.latitude, observer.longitude, observer.elevation)?;
        let jd = julian_day(at);

        let sun = match self.ephemeris.position(Body::Sun, jd) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(error = %e, "Sun position unavailable, phase and viewing omitted");
                None
            }
        };

        let mut bodies: Vec<CelestialBodyInfo> = Body::ALL
            .iter()
            .filter_map(|&body| match self.body_info(body, &observer, jd, sun.as_ref()) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!(body = %body, error = %e, "Skipping body without a position");
                    None
                }
            })
            .collect();
        sort_bodies(&mut bodies);
        let summary = summarize(&bodies);

        tracing::debug!(
            latitude = observer.latitude,
            longitude = observer.longitude,
            time = %at,
            visible = bodies.iter().filter(|b| b.is_visible).count(),
            "Computed visibility report"
        );

        Ok(VisibilityReport {
            observer,
            time: at,
            bodies,
            summary,
        })
    }

    fn body_info(
        &self,
        body: Body,
        observer: &Observer,
        jd: f64,
        sun: Option<&BodyPosition>,
    ) -> Result<CelestialBodyInfo> {
        let position = self.ephemeris.position(body, jd)?;
        let horizontal = to_horizontal(&position, observer, jd);
        // Visibility follows the reported altitude, so both agree at the horizon.
        let altitude = round_to(horizontal.altitude, 2);
        let is_visible = altitude > 0.0;

        let events = find_events(&self.ephemeris, body, observer, jd).unwrap_or_else(|e| {
            tracing::warn!(body = %body, error = %e, "Event search failed");
            EventTimes::default()
        });

        let (illumination, moon_phase) = match (body, sun) {
            (Body::Moon, Some(sun)) => {
                let percent = position.illuminated_fraction() * 100.0;
                let waxing =
                    normalize_degrees(position.ecliptic_longitude - sun.ecliptic_longitude) < 180.0;
                (
                    Some(round_to(percent, 1)),
                    Some(MoonPhase::from_illumination(percent, waxing)),
                )
            }
            _ => (None, None),
        };

        let best_viewing_time = if body == Body::Sun {
            SUN_SAFETY_WARNING.to_string()
        } else {
            plan_viewing(&self.ephemeris, body, observer, jd)
                .and_then(|advice| advice.describe())
                .unwrap_or_else(|e| {
                    tracing::warn!(body = %body, error = %e, "Viewing plan failed");
                    "Unknown".to_string()
                })
        };

        Ok(CelestialBodyInfo {
            name: body.name().to_string(),
            is_visible,
            altitude,
            azimuth: normalize_degrees(round_to(horizontal.azimuth, 2)),
            rise_time: to_utc(body, events.rise),
            set_time: to_utc(body, events.set),
            transit_time: to_utc(body, events.transit),
            magnitude: Some(round_to(position.magnitude, 2)),
            illumination,
            moon_phase,
            visibility_window: visibility_window(is_visible, &events),
            best_viewing_time,
        })
    }
}

fn to_utc(body: Body, jd: Option<f64>) -> Option<DateTime<Utc>> {
    jd.and_then(|jd| {
        from_julian_day(jd)
            .inspect_err(|e| tracing::warn!(body = %body, error = %e, "Dropping event time"))
            .ok()
    })
}

/// Rounds to `decimals` places; never returns negative zero.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale + 0.0
}

/// Free-text description of when the body is above the horizon.
pub fn visibility_window(is_visible: bool, events: &EventTimes) -> String {
    let show = |jd: f64| display_time(jd).unwrap_or_else(|_| "unknown".to_string());
    match (is_visible, events.rise, events.set) {
        (true, None, None) => "Circumpolar: above the horizon all day".to_string(),
        (false, None, None) => "Not visible".to_string(),
        (true, _, Some(set)) => format!("Above the horizon now, sets {}", show(set)),
        (true, Some(rise), None) => {
            format!("Above the horizon now, next rise {}", show(rise))
        }
        (false, Some(rise), Some(set)) if set > rise => {
            format!("Rises {}, sets {}", show(rise), show(set))
        }
        (false, Some(rise), _) => format!("Rises {}", show(rise)),
        (false, None, Some(set)) => {
            format!("Below the horizon, does not rise before {}", show(set))
        }
    }
}

/// Visible bodies first, then by descending altitude.
pub fn sort_bodies(bodies: &mut [CelestialBodyInfo]) {
    bodies.sort_by(|a, b| {
        b.is_visible
            .cmp(&a.is_visible)
            .then_with(|| b.altitude.total_cmp(&a.altitude))
    });
}

/// One-line overview of the Moon and planets, ignoring the Sun.
pub fn summarize(bodies: &[CelestialBodyInfo]) -> String {
    let describe = |b: &CelestialBodyInfo| match (&b.moon_phase, b.illumination) {
        (Some(phase), Some(pct)) => format!("{} ({phase}, {pct:.0}% lit)", b.name),
        _ => b.name.clone(),
    };
    let (up, down): (Vec<_>, Vec<_>) = bodies
        .iter()
        .filter(|b| b.name != Body::Sun.name())
        .partition(|b| b.is_visible);

    let up: Vec<String> = up.into_iter().map(describe).collect();
    let down: Vec<String> = down.into_iter().map(|b| b.name.clone()).collect();
    match (up.is_empty(), down.is_empty()) {
        (true, _) => "Neither the Moon nor any planet is above the horizon right now.".to_string(),
        (false, true) => format!("Above the horizon: {}.", up.join(", ")),
        (false, false) => format!(
            "Above the horizon: {}. Below the horizon: {}.",
            up.join(", "),
            down.join(", ")
        ),
    }
}
