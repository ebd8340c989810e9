//! Rise, set and transit search.
//!
//! Each body is sampled once across the search window in ten minute
//! increments. The first bracketing interval for each event is then
//! refined by bisection down to one second.

use super::body::Body;
use super::coords::{Horizontal, to_horizontal};
use super::ephemeris::Ephemeris;
use super::error::Result;
use super::observer::Observer;

/// How far ahead events are searched, in days.
pub const SEARCH_WINDOW_DAYS: f64 = 2.0;
/// Coarse sampling step in days.
pub const SEARCH_STEP_DAYS: f64 = 10.0 / 1_440.0;
const PRECISION_DAYS: f64 = 1.0 / 86_400.0;
const MAX_BISECTIONS: usize = 40;

/// Next rise, set and upper transit after the query instant (Julian days).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventTimes {
    pub rise: Option<f64>,
    pub set: Option<f64>,
    /// Only reported when the body rises or sets inside the search window.
    pub transit: Option<f64>,
}

/// Horizontal position of `body` for `observer` at `jd`.
pub fn horizontal_at<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    jd: f64,
) -> Result<Horizontal> {
    let position = ephemeris.position(body, jd)?;
    Ok(to_horizontal(&position, observer, jd))
}

/// Altitude of the body's center at rise and set for this observer.
pub fn event_altitude(body: Body, observer: &Observer) -> f64 {
    body.standard_altitude() - observer.horizon_dip()
}

#[derive(Debug, Clone, Copy)]
enum Event {
    Rise,
    Set,
    Transit,
}

/// One body's coarse samples across the search window.
struct Track<'a, E: Ephemeris + ?Sized> {
    ephemeris: &'a E,
    body: Body,
    observer: &'a Observer,
    event_altitude: f64,
    samples: Vec<(f64, Horizontal)>,
}

impl<'a, E: Ephemeris + ?Sized> Track<'a, E> {
    fn sample(ephemeris: &'a E, body: Body, observer: &'a Observer, start: f64) -> Result<Self> {
        let steps = (SEARCH_WINDOW_DAYS / SEARCH_STEP_DAYS).round() as usize;
        let samples = (0..=steps)
            .map(|k| {
                let t = start + k as f64 * SEARCH_STEP_DAYS;
                Ok((t, horizontal_at(ephemeris, body, observer, t)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            ephemeris,
            body,
            observer,
            event_altitude: event_altitude(body, observer),
            samples,
        })
    }

    /// Whether an instant with this position lies before the event.
    fn before(&self, event: Event, h: &Horizontal) -> bool {
        match event {
            Event::Rise => h.altitude < self.event_altitude,
            Event::Set => h.altitude >= self.event_altitude,
            Event::Transit => h.hour_angle < 0.0,
        }
    }

    fn crossed(&self, event: Event, prev: &Horizontal, cur: &Horizontal) -> bool {
        let flipped = self.before(event, prev) && !self.before(event, cur);
        match event {
            // The wrap from +180 to -180 is a lower transit, not a crossing.
            Event::Transit => flipped && cur.hour_angle - prev.hour_angle < 90.0,
            Event::Rise | Event::Set => flipped,
        }
    }

    fn find(&self, event: Event) -> Result<Option<f64>> {
        let Some((mut a, mut b)) = self
            .samples
            .windows(2)
            .find(|w| self.crossed(event, &w[0].1, &w[1].1))
            .map(|w| (w[0].0, w[1].0))
        else {
            return Ok(None);
        };
        for _ in 0..MAX_BISECTIONS {
            let m = (a + b) / 2.0;
            let h = horizontal_at(self.ephemeris, self.body, self.observer, m)?;
            if self.before(event, &h) {
                a = m;
            } else {
                b = m;
            }
            if b - a < PRECISION_DAYS {
                break;
            }
        }
        Ok(Some((a + b) / 2.0))
    }
}

pub fn find_events<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    start: f64,
) -> Result<EventTimes> {
    let track = Track::sample(ephemeris, body, observer, start)?;
    let rise = track.find(Event::Rise)?;
    let set = track.find(Event::Set)?;
    let transit = if rise.is_some() || set.is_some() {
        track.find(Event::Transit)?
    } else {
        None
    };
    Ok(EventTimes { rise, set, transit })
}

pub fn find_rise<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    start: f64,
) -> Result<Option<f64>> {
    Track::sample(ephemeris, body, observer, start)?.find(Event::Rise)
}

pub fn find_set<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    start: f64,
) -> Result<Option<f64>> {
    Track::sample(ephemeris, body, observer, start)?.find(Event::Set)
}

/// Next upper transit: the hour angle passing from negative to non-negative.
pub fn find_transit<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    body: Body,
    observer: &Observer,
    start: f64,
) -> Result<Option<f64>> {
    Track::sample(ephemeris, body, observer, start)?.find(Event::Transit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astronomy::ephemeris::VsopEphemeris;
    use crate::astronomy::time::{from_julian_day, julian_day};
    use chrono::{DateTime, TimeZone, Utc};

    fn jd_of(s: &str) -> f64 {
        julian_day(
            DateTime::parse_from_rfc3339(s)
                .expect("timestamp")
                .with_timezone(&Utc),
        )
    }

    fn assert_near(jd: Option<f64>, expected: &str, tolerance_secs: i64) {
        let got = from_julian_day(jd.expect("event found")).expect("in range");
        let want = jd_of(expected);
        let want = from_julian_day(want).expect("in range");
        let delta = (got - want).num_seconds().abs();
        assert!(delta <= tolerance_secs, "got {got}, expected {want}");
    }

    #[test]
    fn test_sun_events_at_patna() {
        let eph = VsopEphemeris::new();
        let observer = Observer::new(25.6, 85.1, 0.0).expect("valid");
        let events =
            find_events(&eph, Body::Sun, &observer, jd_of("2024-01-25T15:00:00Z")).expect("events");
        assert_near(events.rise, "2024-01-26T01:05:43Z", 180);
        assert_near(events.set, "2024-01-26T11:58:30Z", 180);
        let transit = events.transit.expect("transit");
        assert!(transit > events.rise.expect("rise") && transit < events.set.expect("set"));
    }

    #[test]
    fn test_events_are_ordered_after_start() {
        let eph = VsopEphemeris::new();
        let observer = Observer::new(48.85, 2.35, 35.0).expect("valid");
        let start = jd_of("2024-03-10T06:00:00Z");
        for body in Body::ALL {
            let events = find_events(&eph, body, &observer, start).expect("events");
            for t in [events.rise, events.set, events.transit].into_iter().flatten() {
                assert!(t >= start && t <= start + SEARCH_WINDOW_DAYS, "{body}");
            }
        }
    }

    #[test]
    fn test_midnight_sun_has_no_events() {
        let eph = VsopEphemeris::new();
        let observer = Observer::new(78.2, 15.6, 0.0).expect("valid");
        let start = jd_of("2024-06-21T00:00:00Z");
        let events = find_events(&eph, Body::Sun, &observer, start).expect("events");
        assert_eq!(events, EventTimes::default());
        let noon = horizontal_at(&eph, Body::Sun, &observer, start).expect("position");
        assert!(noon.altitude > 0.0, "circumpolar in June");
    }

    #[test]
    fn test_polar_night_has_no_events() {
        let eph = VsopEphemeris::new();
        let observer = Observer::new(78.2, 15.6, 0.0).expect("valid");
        let start = jd_of("2024-12-21T00:00:00Z");
        let events = find_events(&eph, Body::Sun, &observer, start).expect("events");
        assert!(events.rise.is_none() && events.set.is_none() && events.transit.is_none());
    }

    #[test]
    fn test_higher_observer_sees_earlier_sunrise() {
        let eph = VsopEphemeris::new();
        let start = jd_of("2024-01-25T15:00:00Z");
        let sea = Observer::new(25.6, 85.1, 0.0).expect("valid");
        let peak = Observer::new(25.6, 85.1, 3000.0).expect("valid");
        let low = find_rise(&eph, Body::Sun, &sea, start).expect("rise").expect("found");
        let high = find_rise(&eph, Body::Sun, &peak, start).expect("rise").expect("found");
        assert!(high < low);
    }
}
