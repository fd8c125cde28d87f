use std::sync::Arc;

use crate::config::{MoonSourceConfig, WeatherSourceConfig};
use crate::error::SourceError;
use crate::providers::{FixedWeatherSource, LocalMoonSource, OpenMeteoSnapshotSource};
use crate::traits::{MoonSource, WeatherSource};

pub fn build_weather_source(
    cfg: WeatherSourceConfig,
) -> Result<Arc<dyn WeatherSource>, SourceError> {
    match cfg {
        WeatherSourceConfig::Fixed(c) => Ok(Arc::new(FixedWeatherSource::new(c))),
        WeatherSourceConfig::OpenMeteoSnapshot(c) => {
            Ok(Arc::new(OpenMeteoSnapshotSource::new(c)?))
        }
    }
}

pub fn build_moon_source(cfg: MoonSourceConfig) -> Result<Arc<dyn MoonSource>, SourceError> {
    match cfg {
        MoonSourceConfig::Local(c) => Ok(Arc::new(LocalMoonSource::new(c)?)),
    }
}
