use chrono::NaiveDate;

use crate::config::FixedWeatherConfig;
use crate::error::SourceError;
use crate::traits::WeatherSource;
use crate::types::{ObserverLocation, StargazingWeather};

/// Constant cloud cover, for manual entry or when no forecast is available.
#[derive(Debug, Clone)]
pub struct FixedWeatherSource {
    config: FixedWeatherConfig,
}

impl FixedWeatherSource {
    pub fn new(config: FixedWeatherConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl WeatherSource for FixedWeatherSource {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn stargazing_conditions(
        &self,
        _location: ObserverLocation,
        _date: NaiveDate,
    ) -> Result<StargazingWeather, SourceError> {
        let cloud = self.config.cloud_cover_percent;
        Ok(StargazingWeather {
            nighttime_hours: 1,
            avg_cloud_cover_percent: Some(cloud),
            min_cloud_cover_percent: Some(cloud),
            best_hour: None,
        })
    }

    async fn current_cloud_cover(
        &self,
        _location: ObserverLocation,
    ) -> Result<Option<f64>, SourceError> {
        Ok(Some(self.config.cloud_cover_percent))
    }
}
