use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SourceError;
use crate::types::{MoonReading, ObserverLocation, StargazingWeather};

#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn stargazing_conditions(
        &self,
        location: ObserverLocation,
        date: NaiveDate,
    ) -> Result<StargazingWeather, SourceError>;

    async fn current_cloud_cover(
        &self,
        location: ObserverLocation,
    ) -> Result<Option<f64>, SourceError>;
}

#[async_trait]
pub trait MoonSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn moon_info(&self, date: NaiveDate) -> Result<MoonReading, SourceError>;
}
