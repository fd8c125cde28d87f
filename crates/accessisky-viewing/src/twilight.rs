use std::fmt;

use serde::{Deserialize, Serialize};

/// Sky state derived from the sun's altitude. Only classifies an altitude
/// supplied by the caller; nothing here computes solar position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwilightType {
    Day,
    Civil,
    Nautical,
    Astronomical,
    Night,
}

impl TwilightType {
    pub fn from_sun_altitude(sun_altitude_deg: f64) -> Self {
        if sun_altitude_deg >= 0.0 {
            Self::Day
        } else if sun_altitude_deg >= -6.0 {
            Self::Civil
        } else if sun_altitude_deg >= -12.0 {
            Self::Nautical
        } else if sun_altitude_deg >= -18.0 {
            Self::Astronomical
        } else {
            Self::Night
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Daytime",
            Self::Civil => "Civil Twilight",
            Self::Nautical => "Nautical Twilight",
            Self::Astronomical => "Astronomical Twilight",
            Self::Night => "Astronomical Night",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Day => "Sun above horizon - full daylight",
            Self::Civil => {
                "Sun 0-6° below horizon - outdoor activities possible without artificial light"
            }
            Self::Nautical => "Sun 6-12° below horizon - horizon still visible, bright stars appear",
            Self::Astronomical => {
                "Sun 12-18° below horizon - sky still faintly lit, faint stars visible"
            }
            Self::Night => "Sun 18°+ below horizon - true darkness, no twilight glow",
        }
    }

    /// Degrees below the horizon covered by this state, as (from, to).
    pub fn sun_angle_range(self) -> (f64, f64) {
        match self {
            Self::Day => (0.0, 0.0),
            Self::Civil => (0.0, 6.0),
            Self::Nautical => (6.0, 12.0),
            Self::Astronomical => (12.0, 18.0),
            Self::Night => (18.0, 90.0),
        }
    }

    pub fn is_astronomical_night(self) -> bool {
        matches!(self, Self::Night)
    }
}

impl fmt::Display for TwilightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
