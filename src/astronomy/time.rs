//! Julian day conversions.

use chrono::{DateTime, SubsecRound, TimeZone, Utc};

use super::error::{AstronomyError, Result};

/// Julian day of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian day of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const DAYS_PER_YEAR: f64 = 365.25;

/// Julian day (UT) of an instant.
pub fn julian_day(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// Converts a Julian day back to UTC, truncated to whole seconds.
pub fn from_julian_day(jd: f64) -> Result<DateTime<Utc>> {
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return Err(AstronomyError::TimeOutOfRange(jd));
    }
    Utc.timestamp_millis_opt(millis as i64)
        .single()
        .map(|t| t.trunc_subsecs(0))
        .ok_or(AstronomyError::TimeOutOfRange(jd))
}

/// Julian ephemeris day (TT) for a UT Julian day.
///
/// ΔT comes from the polynomial fits in `astro::time::delta_t`, which only
/// need the year and month.
pub fn ephemeris_day(jd: f64) -> f64 {
    let years = 2000.0 + (jd - J2000_JD) / DAYS_PER_YEAR;
    let year = years.floor();
    let month = (((years - year) * 12.0).floor() as u8).min(11) + 1;
    jd + astro::time::delta_t(year as i32, month) / SECONDS_PER_DAY
}

/// Short human readable UTC form used in report text, e.g. `Jan 25 18:38 UTC`.
pub fn display_time(jd: f64) -> Result<String> {
    Ok(from_julian_day(jd)?.format("%b %-d %H:%M UTC").to_string())
}
