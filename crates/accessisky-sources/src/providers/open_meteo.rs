use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::config::OpenMeteoSnapshotConfig;
use crate::error::SourceError;
use crate::traits::WeatherSource;
use crate::types::{HourlyWeather, ObserverLocation, StargazingWeather, WeatherForecast};

const OPEN_METEO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Weather from an Open-Meteo forecast document already saved on disk.
/// The file is re-read on every call so a refreshed download is picked up.
#[derive(Debug, Clone)]
pub struct OpenMeteoSnapshotSource {
    config: OpenMeteoSnapshotConfig,
}

impl OpenMeteoSnapshotSource {
    pub fn new(config: OpenMeteoSnapshotConfig) -> Result<Self, SourceError> {
        if config.path.as_os_str().is_empty() {
            return Err(SourceError::Config(
                "open-meteo snapshot path is empty".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn load(&self, location: ObserverLocation) -> Result<OpenMeteoResponse, SourceError> {
        let raw = std::fs::read_to_string(&self.config.path)?;
        let parsed: OpenMeteoResponse = serde_json::from_str(&raw)?;

        let drift = (parsed.latitude - location.latitude)
            .abs()
            .max((parsed.longitude - location.longitude).abs());
        if drift > self.config.max_location_drift_deg {
            tracing::warn!(
                path = %self.config.path.display(),
                snapshot_lat = parsed.latitude,
                snapshot_lon = parsed.longitude,
                requested_lat = location.latitude,
                requested_lon = location.longitude,
                "weather snapshot was taken for a different location"
            );
        }
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl WeatherSource for OpenMeteoSnapshotSource {
    fn name(&self) -> &'static str {
        "open-meteo-snapshot"
    }

    async fn stargazing_conditions(
        &self,
        location: ObserverLocation,
        date: NaiveDate,
    ) -> Result<StargazingWeather, SourceError> {
        let forecast = self.load(location)?.into_forecast()?;
        let out = StargazingWeather::from_forecast(&forecast, date);
        tracing::debug!(
            %date,
            nighttime_hours = out.nighttime_hours,
            avg_cloud_cover = ?out.avg_cloud_cover_percent,
            "summarised snapshot night"
        );
        Ok(out)
    }

    async fn current_cloud_cover(
        &self,
        location: ObserverLocation,
    ) -> Result<Option<f64>, SourceError> {
        Ok(self
            .load(location)?
            .current
            .and_then(|current| current.cloud_cover))
    }
}

/// Parses a `/v1/forecast` JSON body into a forecast.
pub fn parse_forecast(raw: &str) -> Result<WeatherForecast, SourceError> {
    let parsed: OpenMeteoResponse = serde_json::from_str(raw)?;
    parsed.into_forecast()
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timezone: Option<String>,
    hourly: Option<OpenMeteoHourly>,
    current: Option<OpenMeteoCurrent>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenMeteoHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_low: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_mid: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover_high: Vec<Option<f64>>,
    #[serde(default)]
    visibility: Vec<Option<f64>>,
    #[serde(default)]
    is_day: Vec<Option<u8>>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    cloud_cover: Option<f64>,
}

fn nth(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

impl OpenMeteoResponse {
    fn into_forecast(self) -> Result<WeatherForecast, SourceError> {
        let hourly = self.hourly.ok_or_else(|| {
            SourceError::InvalidResponse("open-meteo payload has no hourly block".to_string())
        })?;

        let mut rows = Vec::with_capacity(hourly.time.len());
        for (i, stamp) in hourly.time.iter().enumerate() {
            let time = NaiveDateTime::parse_from_str(stamp, OPEN_METEO_TIME_FORMAT).map_err(
                |err| SourceError::InvalidResponse(format!("bad hourly time {stamp:?}: {err}")),
            )?;
            rows.push(HourlyWeather {
                time,
                cloud_cover_percent: nth(&hourly.cloud_cover, i).unwrap_or(0.0),
                cloud_cover_low_percent: nth(&hourly.cloud_cover_low, i),
                cloud_cover_mid_percent: nth(&hourly.cloud_cover_mid, i),
                cloud_cover_high_percent: nth(&hourly.cloud_cover_high, i),
                visibility_meters: nth(&hourly.visibility, i),
                is_day: hourly.is_day.get(i).copied().flatten().map(|v| v == 1),
            });
        }

        Ok(WeatherForecast {
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.unwrap_or_else(|| "GMT".to_string()),
            hourly: rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"{
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "Europe/London",
        "current": {"time": "2024-03-10T21:00", "cloud_cover": 33.0},
        "hourly": {
            "time": ["2024-03-10T12:00", "2024-03-10T21:00", "2024-03-10T22:00", "2024-03-10T23:00"],
            "cloud_cover": [80, 20, null, 40],
            "cloud_cover_low": [10, 5, 0, 12],
            "visibility": [24000, 18000, 20000, null],
            "is_day": [1, 0, 0, 0]
        }
    }"#;

    #[test]
    fn parses_hourly_arrays() {
        let forecast = parse_forecast(SAMPLE).expect("parse");
        assert_eq!(forecast.timezone, "Europe/London");
        assert_eq!(forecast.hourly.len(), 4);
        assert_eq!(forecast.hourly[0].is_day, Some(true));
        assert_eq!(forecast.hourly[2].cloud_cover_percent, 0.0);
        assert_eq!(forecast.hourly[3].visibility_meters, None);
        assert_eq!(forecast.hourly[1].cloud_cover_low_percent, Some(5.0));
        assert_eq!(forecast.hourly[1].cloud_cover_mid_percent, None);
    }

    #[test]
    fn rejects_missing_hourly_block() {
        let err = parse_forecast(r#"{"latitude": 1.0, "longitude": 2.0}"#).expect_err("no hourly");
        assert!(matches!(err, SourceError::InvalidResponse(_)));
    }

    #[test]
    fn rejects_bad_timestamps() {
        let raw = r#"{"latitude": 1.0, "longitude": 2.0, "hourly": {"time": ["yesterday"]}}"#;
        assert!(matches!(
            parse_forecast(raw),
            Err(SourceError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SAMPLE.as_bytes()).expect("write snapshot");

        let source = OpenMeteoSnapshotSource::new(OpenMeteoSnapshotConfig::new(file.path()))
            .expect("source");
        let loc = ObserverLocation::new(51.5, -0.12);
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).expect("date");

        let night = source
            .stargazing_conditions(loc, date)
            .await
            .expect("conditions");
        assert_eq!(night.nighttime_hours, 3);
        assert_eq!(night.avg_cloud_cover_percent, Some(20.0));
        assert_eq!(night.min_cloud_cover_percent, Some(0.0));

        let current = source.current_cloud_cover(loc).await.expect("current");
        assert_eq!(current, Some(33.0));
    }

    #[tokio::test]
    async fn missing_snapshot_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source =
            OpenMeteoSnapshotSource::new(OpenMeteoSnapshotConfig::new(dir.path().join("nope.json")))
                .expect("source");
        let err = source
            .current_cloud_cover(ObserverLocation::new(0.0, 0.0))
            .await
            .expect_err("missing file");
        assert!(matches!(err, SourceError::Io(_)));
    }
}
