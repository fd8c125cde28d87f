use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const POLAR_CIRCLE_LATITUDE: f64 = 66.5;

/// The stretch of astronomical darkness (sun more than 18° down) for one evening.
/// Twilight instants come from an external sun service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DarkSkyWindow {
    pub date: NaiveDate,
    pub darkness_begins: Option<DateTime<Utc>>,
    pub darkness_ends: Option<DateTime<Utc>>,
    pub darkness_duration_hours: f64,
    pub no_darkness_reason: Option<String>,
    pub best_viewing_time: Option<DateTime<Utc>>,
}

impl DarkSkyWindow {
    pub fn is_currently_dark(&self, at: DateTime<Utc>) -> bool {
        is_astronomical_darkness(at, self.darkness_begins, self.darkness_ends)
    }

    /// Zero once darkness has begun.
    pub fn time_until_darkness(&self, from: DateTime<Utc>) -> Option<Duration> {
        let begins = self.darkness_begins?;
        if from >= begins {
            return Some(Duration::zero());
        }
        Some(begins - from)
    }

    /// Full window length before it starts, zero after it ends.
    pub fn time_remaining(&self, from: DateTime<Utc>) -> Option<Duration> {
        let ends = self.darkness_ends?;
        if from >= ends {
            return Some(Duration::zero());
        }
        match self.darkness_begins {
            Some(begins) if from < begins => Some(ends - begins),
            _ => Some(ends - from),
        }
    }
}

impl fmt::Display for DarkSkyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(reason) = &self.no_darkness_reason {
            return write!(f, "Dark Sky: {reason}");
        }
        let (Some(begins), Some(ends)) = (self.darkness_begins, self.darkness_ends) else {
            return f.write_str("Dark Sky: No data available");
        };

        let hours = self.darkness_duration_hours.trunc();
        let minutes = ((self.darkness_duration_hours - hours) * 60.0).trunc();
        write!(
            f,
            "Dark Sky: {} to {} ({}h {}m of true darkness)",
            begins.format("%H:%M UTC"),
            ends.format("%H:%M UTC"),
            hours,
            minutes
        )
    }
}

pub fn is_astronomical_darkness(
    at: DateTime<Utc>,
    twilight_end: Option<DateTime<Utc>>,
    twilight_begin: Option<DateTime<Utc>>,
) -> bool {
    match (twilight_end, twilight_begin) {
        (Some(end), Some(begin)) => end <= at && at <= begin,
        _ => false,
    }
}

/// Builds the window between evening twilight end and morning twilight begin.
/// Missing instants produce an empty window carrying a reason.
#[allow(clippy::cast_precision_loss)]
pub fn dark_sky_window(
    latitude: f64,
    date: NaiveDate,
    twilight_end: Option<DateTime<Utc>>,
    twilight_begin: Option<DateTime<Utc>>,
) -> DarkSkyWindow {
    let (Some(begins), Some(ends)) = (twilight_end, twilight_begin) else {
        let reason = if latitude.abs() > POLAR_CIRCLE_LATITUDE {
            if matches!(date.month(), 5..=7) {
                "Polar twilight - no true darkness during summer"
            } else {
                "Unable to determine twilight times"
            }
        } else {
            "Twilight data not available"
        };
        return DarkSkyWindow {
            date,
            darkness_begins: None,
            darkness_ends: None,
            darkness_duration_hours: 0.0,
            no_darkness_reason: Some(reason.to_string()),
            best_viewing_time: None,
        };
    };

    let span = ends - begins;
    let duration_hours = span.num_milliseconds() as f64 / 3_600_000.0;

    DarkSkyWindow {
        date,
        darkness_begins: Some(begins),
        darkness_ends: Some(ends),
        darkness_duration_hours: duration_hours,
        no_darkness_reason: None,
        best_viewing_time: Some(begins + span / 2),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid time")
    }

    fn window() -> DarkSkyWindow {
        dark_sky_window(
            40.0,
            NaiveDate::from_ymd_opt(2024, 10, 3).expect("date"),
            Some(utc(2024, 10, 3, 23, 30)),
            Some(utc(2024, 10, 4, 9, 45)),
        )
    }

    #[test]
    fn window_duration_and_midpoint() {
        let w = window();
        assert!((w.darkness_duration_hours - 10.25).abs() < 1e-9);
        assert_eq!(w.best_viewing_time, Some(utc(2024, 10, 4, 4, 37) + Duration::seconds(30)));
        assert_eq!(
            w.to_string(),
            "Dark Sky: 23:30 UTC to 09:45 UTC (10h 15m of true darkness)"
        );
    }

    #[test]
    fn darkness_checks() {
        let w = window();
        assert!(!w.is_currently_dark(utc(2024, 10, 3, 22, 0)));
        assert!(w.is_currently_dark(utc(2024, 10, 3, 23, 30)));
        assert!(w.is_currently_dark(utc(2024, 10, 4, 2, 0)));
        assert!(!w.is_currently_dark(utc(2024, 10, 4, 10, 0)));
    }

    #[test]
    fn time_until_and_remaining() {
        let w = window();
        let before = utc(2024, 10, 3, 21, 30);
        assert_eq!(w.time_until_darkness(before), Some(Duration::hours(2)));
        assert_eq!(
            w.time_remaining(before),
            Some(Duration::hours(10) + Duration::minutes(15))
        );

        let during = utc(2024, 10, 4, 8, 45);
        assert_eq!(w.time_until_darkness(during), Some(Duration::zero()));
        assert_eq!(w.time_remaining(during), Some(Duration::hours(1)));

        let after = utc(2024, 10, 4, 11, 0);
        assert_eq!(w.time_remaining(after), Some(Duration::zero()));
    }

    #[test]
    fn polar_summer_has_no_darkness() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).expect("date");
        let w = dark_sky_window(69.6, date, None, None);
        assert_eq!(
            w.no_darkness_reason.as_deref(),
            Some("Polar twilight - no true darkness during summer")
        );
        assert_eq!(
            w.to_string(),
            "Dark Sky: Polar twilight - no true darkness during summer"
        );
        assert_eq!(w.time_until_darkness(utc(2024, 6, 21, 22, 0)), None);
        assert!(!w.is_currently_dark(utc(2024, 6, 21, 23, 0)));
    }

    #[test]
    fn missing_twilight_reasons() {
        let winter = NaiveDate::from_ymd_opt(2024, 12, 21).expect("date");
        let w = dark_sky_window(-70.0, winter, Some(utc(2024, 12, 21, 22, 0)), None);
        assert_eq!(
            w.no_darkness_reason.as_deref(),
            Some("Unable to determine twilight times")
        );

        let w = dark_sky_window(35.0, winter, None, None);
        assert_eq!(
            w.no_darkness_reason.as_deref(),
            Some("Twilight data not available")
        );
    }
}
