pub mod fixed;
pub mod local_moon;
pub mod open_meteo;

pub use fixed::FixedWeatherSource;
pub use local_moon::LocalMoonSource;
pub use open_meteo::{parse_forecast, OpenMeteoSnapshotSource};
