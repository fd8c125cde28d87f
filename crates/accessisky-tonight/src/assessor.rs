use std::sync::Arc;

use accessisky_sources::{
    build_moon_source, build_weather_source, MoonReading, MoonSource, ObserverLocation,
    SourceError, SourcesConfig, WeatherSource,
};
use accessisky_viewing::{assess, ViewingConditions, ViewingInput};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::darksky::DarkSkyWindow;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub location: ObserverLocation,
    pub date: NaiveDate,
    pub light_pollution_factor: f64,
    pub is_astronomical_night: bool,
    pub is_moon_up: bool,
}

impl LocationRequest {
    /// Night and moon-up both default to true, the pessimistic case for the
    /// moon term.
    pub fn new(location: ObserverLocation, date: NaiveDate) -> Self {
        Self {
            location,
            date,
            light_pollution_factor: 0.0,
            is_astronomical_night: true,
            is_moon_up: true,
        }
    }

    pub fn with_light_pollution(mut self, light_pollution_factor: f64) -> Self {
        self.light_pollution_factor = light_pollution_factor;
        self
    }

    pub fn with_moon_up(mut self, is_moon_up: bool) -> Self {
        self.is_moon_up = is_moon_up;
        self
    }

    /// Derives the night flag from a dark-sky window at a given instant.
    pub fn with_dark_window(mut self, window: &DarkSkyWindow, at: DateTime<Utc>) -> Self {
        self.is_astronomical_night = window.is_currently_dark(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudCoverOrigin {
    NighttimeAverage,
    Current,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationAssessment {
    pub conditions: ViewingConditions,
    pub cloud_cover_percent: f64,
    pub cloud_cover_origin: CloudCoverOrigin,
    pub moon: Option<MoonReading>,
}

/// Resolves engine inputs from weather and moon sources and scores them.
///
/// Source failures never propagate: a missing cloud value becomes 0% and a
/// missing moon becomes 0% illumination, both logged at warn.
#[derive(Clone)]
pub struct ViewingAssessor {
    weather: Arc<dyn WeatherSource>,
    moon: Arc<dyn MoonSource>,
}

impl ViewingAssessor {
    pub fn new(weather: Arc<dyn WeatherSource>, moon: Arc<dyn MoonSource>) -> Self {
        Self { weather, moon }
    }

    pub fn from_config(cfg: SourcesConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            build_weather_source(cfg.weather)?,
            build_moon_source(cfg.moon)?,
        ))
    }

    pub fn weather_source(&self) -> &'static str {
        self.weather.name()
    }

    pub fn moon_source(&self) -> &'static str {
        self.moon.name()
    }

    pub fn assess(&self, input: &ViewingInput) -> ViewingConditions {
        assess(input)
    }

    pub async fn assess_for_location(&self, request: &LocationRequest) -> LocationAssessment {
        let ((cloud_cover_percent, cloud_cover_origin), moon) = tokio::join!(
            self.resolve_cloud_cover(request.location, request.date),
            self.resolve_moon(request.date)
        );

        let illumination = moon.as_ref().map_or(0.0, MoonReading::illumination_percent);
        let input = ViewingInput {
            cloud_cover_percent,
            moon_illumination_percent: illumination,
            is_astronomical_night: request.is_astronomical_night,
            is_moon_up: request.is_moon_up,
            light_pollution_factor: request.light_pollution_factor,
        };
        let conditions = assess(&input);

        tracing::debug!(
            lat = request.location.latitude,
            lon = request.location.longitude,
            date = %request.date,
            cloud_cover_percent,
            origin = ?cloud_cover_origin,
            illumination,
            score = conditions.numeric_score,
            "assessed location"
        );

        LocationAssessment {
            conditions,
            cloud_cover_percent,
            cloud_cover_origin,
            moon,
        }
    }

    async fn resolve_cloud_cover(
        &self,
        location: ObserverLocation,
        date: NaiveDate,
    ) -> (f64, CloudCoverOrigin) {
        let night = match self.weather.stargazing_conditions(location, date).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(
                    source = self.weather.name(),
                    error = %err,
                    "weather unavailable, assuming clear sky"
                );
                return (0.0, CloudCoverOrigin::Default);
            }
        };

        if night.has_nighttime_data() {
            if let Some(avg) = night.avg_cloud_cover_percent {
                return (avg, CloudCoverOrigin::NighttimeAverage);
            }
        }

        match self.weather.current_cloud_cover(location).await {
            Ok(Some(current)) => (current, CloudCoverOrigin::Current),
            Ok(None) => (0.0, CloudCoverOrigin::Default),
            Err(err) => {
                tracing::warn!(
                    source = self.weather.name(),
                    error = %err,
                    "current cloud cover unavailable"
                );
                (0.0, CloudCoverOrigin::Default)
            }
        }
    }

    async fn resolve_moon(&self, date: NaiveDate) -> Option<MoonReading> {
        match self.moon.moon_info(date).await {
            Ok(reading) => Some(reading),
            Err(err) => {
                tracing::warn!(
                    source = self.moon.name(),
                    error = %err,
                    "moon data unavailable, assuming dark moon"
                );
                None
            }
        }
    }
}
