//! Lunar phase naming.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    #[serde(rename = "New Moon")]
    New,
    #[serde(rename = "Waxing Crescent")]
    WaxingCrescent,
    #[serde(rename = "First Quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing Gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full Moon")]
    Full,
    #[serde(rename = "Waning Gibbous")]
    WaningGibbous,
    #[serde(rename = "Last Quarter")]
    LastQuarter,
    #[serde(rename = "Waning Crescent")]
    WaningCrescent,
}

impl MoonPhase {
    /// Names the phase from the lit percentage and whether the Moon is waxing.
    ///
    /// Out-of-range input is clamped to `0..=100`; NaN counts as new.
    pub fn from_illumination(percent: f64, waxing: bool) -> Self {
        let pct = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        match (pct, waxing) {
            (p, _) if p < 2.0 => MoonPhase::New,
            (p, _) if p >= 98.0 => MoonPhase::Full,
            (p, true) if p < 45.0 => MoonPhase::WaxingCrescent,
            (p, false) if p < 45.0 => MoonPhase::WaningCrescent,
            (p, true) if p <= 55.0 => MoonPhase::FirstQuarter,
            (p, false) if p <= 55.0 => MoonPhase::LastQuarter,
            (_, true) => MoonPhase::WaxingGibbous,
            (_, false) => MoonPhase::WaningGibbous,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
