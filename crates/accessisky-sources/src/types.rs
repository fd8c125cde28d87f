use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl ObserverLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub time: NaiveDateTime,
    pub cloud_cover_percent: f64,
    pub cloud_cover_low_percent: Option<f64>,
    pub cloud_cover_mid_percent: Option<f64>,
    pub cloud_cover_high_percent: Option<f64>,
    pub visibility_meters: Option<f64>,
    pub is_day: Option<bool>,
}

impl HourlyWeather {
    pub fn new(time: NaiveDateTime, cloud_cover_percent: f64, is_day: Option<bool>) -> Self {
        Self {
            time,
            cloud_cover_percent,
            cloud_cover_low_percent: None,
            cloud_cover_mid_percent: None,
            cloud_cover_high_percent: None,
            visibility_meters: None,
            is_day,
        }
    }

    pub fn visibility_km(&self) -> Option<f64> {
        self.visibility_meters.map(|m| m / 1000.0)
    }

    pub fn is_clear(&self) -> bool {
        self.cloud_cover_percent < 20.0
    }

    pub fn is_good_for_stargazing(&self) -> bool {
        self.cloud_cover_percent < 30.0
            && self.visibility_meters.is_none_or(|m| m > 10_000.0)
            && self.is_day == Some(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub hourly: Vec<HourlyWeather>,
}

impl WeatherForecast {
    /// Hours of `date` flagged as night. Hours with an unknown day flag are skipped.
    pub fn nighttime_conditions(&self, date: NaiveDate) -> Vec<&HourlyWeather> {
        self.hourly
            .iter()
            .filter(|h| h.is_day == Some(false) && h.time.date() == date)
            .collect()
    }

    pub fn best_hour_for_stargazing(&self, date: NaiveDate) -> Option<&HourlyWeather> {
        self.nighttime_conditions(date)
            .into_iter()
            .min_by(|a, b| a.cloud_cover_percent.total_cmp(&b.cloud_cover_percent))
    }
}

/// Night-time cloud summary for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StargazingWeather {
    pub nighttime_hours: usize,
    pub avg_cloud_cover_percent: Option<f64>,
    pub min_cloud_cover_percent: Option<f64>,
    pub best_hour: Option<HourlyWeather>,
}

impl StargazingWeather {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_forecast(forecast: &WeatherForecast, date: NaiveDate) -> Self {
        let nighttime = forecast.nighttime_conditions(date);
        if nighttime.is_empty() {
            return Self {
                nighttime_hours: 0,
                avg_cloud_cover_percent: None,
                min_cloud_cover_percent: None,
                best_hour: None,
            };
        }

        let total: f64 = nighttime.iter().map(|h| h.cloud_cover_percent).sum();
        let avg = total / nighttime.len() as f64;
        let min = nighttime
            .iter()
            .map(|h| h.cloud_cover_percent)
            .fold(f64::INFINITY, f64::min);

        Self {
            nighttime_hours: nighttime.len(),
            avg_cloud_cover_percent: Some(round1(avg)),
            min_cloud_cover_percent: Some(round1(min)),
            best_hour: forecast.best_hour_for_stargazing(date).cloned(),
        }
    }

    pub fn has_nighttime_data(&self) -> bool {
        self.nighttime_hours > 0 && self.avg_cloud_cover_percent.is_some()
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::NewMoon,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::FullMoon,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NewMoon => "New Moon",
            Self::WaxingCrescent => "Waxing Crescent",
            Self::FirstQuarter => "First Quarter",
            Self::WaxingGibbous => "Waxing Gibbous",
            Self::FullMoon => "Full Moon",
            Self::WaningGibbous => "Waning Gibbous",
            Self::LastQuarter => "Last Quarter",
            Self::WaningCrescent => "Waning Crescent",
        }
    }

    /// Phase for a moon age, splitting the synodic month into eight equal bins.
    pub fn from_age(age_days: f64, synodic_month_days: f64) -> Self {
        let bin = synodic_month_days / 8.0;
        let mut edge = bin;
        for phase in Self::ALL {
            if age_days < edge {
                return phase;
            }
            edge += bin;
        }
        Self::WaningCrescent
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonReading {
    pub date: NaiveDate,
    pub phase: MoonPhase,
    /// Lit fraction, 0.0-1.0.
    pub illumination: f64,
    pub age_days: f64,
    pub source: String,
}

impl MoonReading {
    pub fn illumination_percent(&self) -> f64 {
        (self.illumination * 100.0).round_ties_even()
    }
}

impl fmt::Display for MoonReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}% illuminated)",
            self.phase,
            self.illumination_percent()
        )
    }
}
