//! Best viewing time.
//!
//! A body is observable when it stands at least [`MIN_BODY_ALTITUDE`] above
//! the horizon while the Sun is below [`DARK_SKY_SUN_ALTITUDE`]. The next 24
//! hours are sampled every ten minutes and the first observable stretch is
//! classified by whether it is bounded by dusk, dawn, both or neither.

use serde::Serialize;

use super::body::Body;
use super::ephemeris::Ephemeris;
use super::error::Result;
use super::events::horizontal_at;
use super::observer::Observer;
use super::time::display_time;

/// Minimum body altitude in degrees for comfortable viewing.
pub const MIN_BODY_ALTITUDE: f64 = 5.0;
/// Sun altitude in degrees below which the sky counts as dark (civil twilight).
pub const DARK_SKY_SUN_ALTITUDE: f64 = -6.0;

const STEP_DAYS: f64 = 10.0 / 1_440.0;
const SAMPLES_PER_DAY: usize = 144;

pub const SUN_SAFETY_WARNING: &str =
    "Never look at the Sun directly or through optics without a certified solar filter.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewingKind {
    /// Observable from dusk until dawn.
    AllNight,
    /// Observable after dusk, sets before dawn.
    Evening,
    /// Rises in the dark, observable until dawn.
    Morning,
    /// Rises and sets within the night.
    Night,
    /// Never high enough in a dark sky during the next day.
    NotObservable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingAdvice {
    pub kind: ViewingKind,
    /// First and last observable sample at or after the query instant.
    pub window: Option<(f64, f64)>,
    /// Sample with the greatest body altitude inside the window.
    pub best: Option<(f64, f64)>,
}

impl ViewingAdvice {
    fn not_observable() -> Self {
        Self {
            kind: ViewingKind::NotObservable,
            window: None,
            best: None,
        }
    }

    /// Text for the `bestViewingTime` field.
    pub fn describe(&self) -> Result<String> {
        let (Some((start, end)), Some((best, altitude))) = (self.window, self.best) else {
            return Ok("Not observable in a dark sky during the next 24 hours".to_string());
        };
        let best = display_time(best)?;
        let start = display_time(start)?;
        let end = display_time(end)?;
        Ok(match self.kind {
            ViewingKind::AllNight => {
                format!("Visible all night, highest around {best} ({altitude:.0}° up)")
            }
            ViewingKind::Evening => format!(
                "Evening object: best around {best} ({altitude:.0}° up), observable until {end}"
            ),
            ViewingKind::Morning => format!(
                "Morning object: observable from {start} until dawn, best around {best} ({altitude:.0}° up)"
            ),
            ViewingKind::Night => format!(
                "Observable {start} to {end}, best around {best} ({altitude:.0}° up)"
            ),
            ViewingKind::NotObservable => {
                "Not observable in a dark sky during the next 24 hours".to_string()
            }
        })
    }
}

struct Sample {
    jd: f64,
    body_altitude: f64,
    observable: bool,
}

/// Plans the next dark-sky viewing opportunity for a body other than the Sun.
pub fn plan_viewing<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    start: f64,
) -> Result<ViewingAdvice> {
    if body == Body::Sun {
        return Ok(ViewingAdvice::not_observable());
    }

    let sun_altitude =
        |jd: f64| -> Result<f64> { Ok(horizontal_at(ephemeris, Body::Sun, observer, jd)?.altitude) };
    let sample = |jd: f64| -> Result<Sample> {
        let body_altitude = horizontal_at(ephemeris, body, observer, jd)?.altitude;
        let observable =
            body_altitude > MIN_BODY_ALTITUDE && sun_altitude(jd)? < DARK_SKY_SUN_ALTITUDE;
        Ok(Sample {
            jd,
            body_altitude,
            observable,
        })
    };

    let samples = (0..=SAMPLES_PER_DAY)
        .map(|k| sample(start + k as f64 * STEP_DAYS))
        .collect::<Result<Vec<_>>>()?;

    let Some(first) = samples.iter().position(|s| s.observable) else {
        return Ok(ViewingAdvice::not_observable());
    };
    let last = samples[first..]
        .iter()
        .take_while(|s| s.observable)
        .count()
        + first
        - 1;

    // Already observable at the query instant: find where this stretch began.
    let mut run_start = samples[first].jd;
    if first == 0 {
        for _ in 0..SAMPLES_PER_DAY {
            let previous = sample(run_start - STEP_DAYS)?;
            if !previous.observable {
                break;
            }
            run_start = previous.jd;
        }
    }

    let after_dusk = sun_altitude(run_start - STEP_DAYS)? >= DARK_SKY_SUN_ALTITUDE;
    let before_dawn = sun_altitude(samples[last].jd + STEP_DAYS)? >= DARK_SKY_SUN_ALTITUDE;
    let kind = match (after_dusk, before_dawn) {
        (true, true) => ViewingKind::AllNight,
        (true, false) => ViewingKind::Evening,
        (false, true) => ViewingKind::Morning,
        (false, false) => ViewingKind::Night,
    };

    let best = samples[first..=last]
        .iter()
        .max_by(|a, b| a.body_altitude.total_cmp(&b.body_altitude))
        .map(|s| (s.jd, s.body_altitude));

    Ok(ViewingAdvice {
        kind,
        window: Some((samples[first].jd, samples[last].jd)),
        best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomy::ephemeris::VsopEphemeris;
    use crate::astronomy::time::julian_day;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn patna_evening() -> (Observer, f64) {
        let observer = Observer::new(25.6, 85.1, 0.0).expect("valid");
        let t = Utc
            .with_ymd_and_hms(2024, 1, 25, 15, 0, 0)
            .single()
            .expect("date");
        (observer, julian_day(t))
    }

    #[rstest]
    #[case(Body::Moon, ViewingKind::AllNight)]
    #[case(Body::Mercury, ViewingKind::Morning)]
    #[case(Body::Venus, ViewingKind::Morning)]
    #[case(Body::Mars, ViewingKind::Morning)]
    #[case(Body::Jupiter, ViewingKind::Evening)]
    #[case(Body::Saturn, ViewingKind::Evening)]
    #[case(Body::Uranus, ViewingKind::Evening)]
    #[case(Body::Neptune, ViewingKind::Evening)]
    fn test_classification_at_patna(#[case] body: Body, #[case] expected: ViewingKind) {
        let (observer, jd) = patna_evening();
        let advice = plan_viewing(&VsopEphemeris::new(), body, &observer, jd).expect("plan");
        assert_eq!(advice.kind, expected, "{body}");
        let (start, end) = advice.window.expect("window");
        let (best, altitude) = advice.best.expect("best");
        assert!(start >= jd && start <= best && best <= end);
        assert!(altitude > MIN_BODY_ALTITUDE);
    }

    #[test]
    fn test_sun_is_never_planned() {
        let (observer, jd) = patna_evening();
        let advice = plan_viewing(&VsopEphemeris::new(), Body::Sun, &observer, jd).expect("plan");
        assert_eq!(advice.kind, ViewingKind::NotObservable);
        assert!(advice.describe().expect("text").starts_with("Not observable"));
    }

    #[test]
    fn test_midnight_sun_leaves_nothing_observable() {
        let observer = Observer::new(78.2, 15.6, 0.0).expect("valid");
        let t = Utc
            .with_ymd_and_hms(2024, 6, 21, 0, 0, 0)
            .single()
            .expect("date");
        let advice =
            plan_viewing(&VsopEphemeris::new(), Body::Jupiter, &observer, julian_day(t))
                .expect("plan");
        assert_eq!(advice.kind, ViewingKind::NotObservable);
        assert!(advice.window.is_none() && advice.best.is_none());
    }

    #[test]
    fn test_describe_mentions_best_time() {
        let (observer, jd) = patna_evening();
        let advice =
            plan_viewing(&VsopEphemeris::new(), Body::Jupiter, &observer, jd).expect("plan");
        let text = advice.describe().expect("text");
        assert!(text.starts_with("Evening object"), "{text}");
        assert!(text.contains("UTC"));
    }
}
