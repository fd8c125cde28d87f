use std::path::PathBuf;

use crate::error::SourceError;

/// Mean synodic month (new moon to new moon) in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_67;

/// Unix time of the new moon of 2000-01-06 18:14 UTC.
pub const REFERENCE_NEW_MOON_UNIX: i64 = 947_182_440;

#[derive(Debug, Clone, PartialEq)]
pub struct FixedWeatherConfig {
    pub cloud_cover_percent: f64,
}

impl FixedWeatherConfig {
    pub fn new(cloud_cover_percent: f64) -> Self {
        Self {
            cloud_cover_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMeteoSnapshotConfig {
    /// A saved `/v1/forecast` response with an `hourly` block.
    pub path: PathBuf,
    /// Snapshots further than this from the requested location are still
    /// used, but logged.
    pub max_location_drift_deg: f64,
}

impl OpenMeteoSnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_location_drift_deg: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherSourceConfig {
    Fixed(FixedWeatherConfig),
    OpenMeteoSnapshot(OpenMeteoSnapshotConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalMoonConfig {
    pub synodic_month_days: f64,
    pub reference_new_moon_unix: i64,
}

impl Default for LocalMoonConfig {
    fn default() -> Self {
        Self {
            synodic_month_days: SYNODIC_MONTH_DAYS,
            reference_new_moon_unix: REFERENCE_NEW_MOON_UNIX,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoonSourceConfig {
    Local(LocalMoonConfig),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourcesConfig {
    pub weather: WeatherSourceConfig,
    pub moon: MoonSourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            weather: WeatherSourceConfig::Fixed(FixedWeatherConfig::new(0.0)),
            moon: MoonSourceConfig::Local(LocalMoonConfig::default()),
        }
    }
}

impl SourcesConfig {
    pub fn from_env() -> Result<Self, SourceError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads `ACCESSISKY_WEATHER_SOURCE`, `ACCESSISKY_CLOUD_COVER` and
    /// `ACCESSISKY_WEATHER_SNAPSHOT` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let kind = get("ACCESSISKY_WEATHER_SOURCE")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_else(|| "fixed".to_string());

        let weather = match kind.as_str() {
            "fixed" | "manual" => {
                let cloud_cover_percent = get("ACCESSISKY_CLOUD_COVER")
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0)
                    .clamp(0.0, 100.0);
                WeatherSourceConfig::Fixed(FixedWeatherConfig::new(cloud_cover_percent))
            }
            "open-meteo-snapshot" | "open-meteo" => {
                let path = get("ACCESSISKY_WEATHER_SNAPSHOT").ok_or_else(|| {
                    SourceError::Config(
                        "ACCESSISKY_WEATHER_SNAPSHOT is required for open-meteo-snapshot"
                            .to_string(),
                    )
                })?;
                WeatherSourceConfig::OpenMeteoSnapshot(OpenMeteoSnapshotConfig::new(path))
            }
            other => {
                return Err(SourceError::Config(format!(
                    "ACCESSISKY_WEATHER_SOURCE must be fixed or open-meteo-snapshot, got {other}"
                )));
            }
        };

        Ok(Self {
            weather,
            moon: MoonSourceConfig::Local(LocalMoonConfig::default()),
        })
    }
}
