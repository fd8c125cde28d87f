pub mod assessor;
pub mod darksky;
pub mod summary;

pub use assessor::*;
pub use darksky::*;
pub use summary::*;

pub use accessisky_sources::{
    build_moon_source, build_weather_source, FixedWeatherConfig, LocalMoonConfig, MoonPhase,
    MoonReading, MoonSource, MoonSourceConfig, ObserverLocation, OpenMeteoSnapshotConfig,
    SourceError, SourcesConfig, StargazingWeather, WeatherSource, WeatherSourceConfig,
};
pub use accessisky_viewing::*;
