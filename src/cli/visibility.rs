//! `stargazer visibility`: the report on the terminal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;

use crate::astronomy::{Observer, VisibilityCalculator, VisibilityReport};

fn hhmm(t: Option<DateTime<Utc>>) -> String {
    t.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Plain-text table of a report, one row per body.
pub fn render_report(report: &VisibilityReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sky at {:.4}, {:.4} ({} m) on {}",
        report.observer.latitude,
        report.observer.longitude,
        report.observer.elevation,
        report.time.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "{:<8} {:>3} {:>7} {:>7} {:>5} {:>5} {:>5} {:>6}",
        "Body", "Up", "Alt", "Az", "Rise", "Set", "Trans", "Mag"
    );
    for body in &report.bodies {
        let magnitude = body
            .magnitude
            .map(|m| format!("{m:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<8} {:>3} {:>7.2} {:>7.2} {:>5} {:>5} {:>5} {:>6}",
            body.name,
            if body.is_visible { "yes" } else { "no" },
            body.altitude,
            body.azimuth,
            hhmm(body.rise_time),
            hhmm(body.set_time),
            hhmm(body.transit_time),
            magnitude
        );
        if let (Some(illumination), Some(phase)) = (body.illumination, body.moon_phase.as_ref()) {
            let _ = writeln!(out, "         {phase}, {illumination:.1}% lit");
        }
        let _ = writeln!(out, "         {} | {}", body.visibility_window, body.best_viewing_time);
    }
    let _ = write!(out, "{}", report.summary);
    out
}

pub async fn print_visibility(
    lat: f64,
    lon: f64,
    elevation: f64,
    at: Option<DateTime<Utc>>,
    json: bool,
) -> Result<()> {
    let observer = Observer::new(lat, lon, elevation)?;
    let at = at.unwrap_or_else(Utc::now);

    let report =
        tokio::task::spawn_blocking(move || VisibilityCalculator::new().compute(&observer, at))
            .await
            .context("Visibility task panicked")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report));
    }
    Ok(())
}
