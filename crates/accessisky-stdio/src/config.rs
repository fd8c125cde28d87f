use accessisky_tonight::{SourceError, SourcesConfig};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerConfig {
    pub sources: SourcesConfig,
    /// Used by `location_conditions` when the caller gives no factor.
    pub default_light_pollution: f64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, SourceError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_light_pollution = lookup("ACCESSISKY_LIGHT_POLLUTION")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        Ok(Self {
            sources: SourcesConfig::from_lookup(&lookup)?,
            default_light_pollution,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use accessisky_tonight::{FixedWeatherConfig, WeatherSourceConfig};

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(cfg, ServerConfig::default());
    }

    #[test]
    fn light_pollution_is_clamped() {
        let cfg = ServerConfig::from_lookup(lookup(&[("ACCESSISKY_LIGHT_POLLUTION", " 1.7 ")]))
            .expect("config");
        assert!((cfg.default_light_pollution - 1.0).abs() < f64::EPSILON);

        let cfg = ServerConfig::from_lookup(lookup(&[("ACCESSISKY_LIGHT_POLLUTION", "bright")]))
            .expect("config");
        assert!(cfg.default_light_pollution.abs() < f64::EPSILON);
    }

    #[test]
    fn weather_settings_pass_through() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("ACCESSISKY_WEATHER_SOURCE", "fixed"),
            ("ACCESSISKY_CLOUD_COVER", "45"),
            ("ACCESSISKY_LIGHT_POLLUTION", "0.2"),
        ]))
        .expect("config");
        assert_eq!(
            cfg.sources.weather,
            WeatherSourceConfig::Fixed(FixedWeatherConfig::new(45.0))
        );
        assert!((cfg.default_light_pollution - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_weather_source_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("ACCESSISKY_WEATHER_SOURCE", "radar")]))
            .expect_err("unknown source");
        assert!(matches!(err, SourceError::Config(_)));
    }
}
