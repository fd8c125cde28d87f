use std::sync::Arc;

use accessisky_tonight::{
    dark_sky_window, generate_summary_text, CloudCoverOrigin, LocationRequest, MoonPhase,
    MoonReading, MoonSource, ObserverLocation, ScoreCategory, SourceError, SourcesConfig,
    StargazingWeather, TonightData, ViewingAssessor, WeatherSource,
};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

enum StubWeather {
    Night(f64),
    CurrentOnly(Option<f64>),
    Down,
}

#[async_trait]
impl WeatherSource for StubWeather {
    fn name(&self) -> &'static str {
        "stub-weather"
    }

    async fn stargazing_conditions(
        &self,
        _location: ObserverLocation,
        _date: NaiveDate,
    ) -> Result<StargazingWeather, SourceError> {
        match self {
            Self::Night(cloud) => Ok(StargazingWeather {
                nighttime_hours: 8,
                avg_cloud_cover_percent: Some(*cloud),
                min_cloud_cover_percent: Some(*cloud),
                best_hour: None,
            }),
            Self::CurrentOnly(_) => Ok(StargazingWeather {
                nighttime_hours: 0,
                avg_cloud_cover_percent: None,
                min_cloud_cover_percent: None,
                best_hour: None,
            }),
            Self::Down => Err(SourceError::Unavailable("forecast offline".to_string())),
        }
    }

    async fn current_cloud_cover(
        &self,
        _location: ObserverLocation,
    ) -> Result<Option<f64>, SourceError> {
        match self {
            Self::Night(cloud) => Ok(Some(*cloud)),
            Self::CurrentOnly(current) => Ok(*current),
            Self::Down => Err(SourceError::Unavailable("forecast offline".to_string())),
        }
    }
}

struct StubMoon {
    illumination: Option<f64>,
}

#[async_trait]
impl MoonSource for StubMoon {
    fn name(&self) -> &'static str {
        "stub-moon"
    }

    async fn moon_info(&self, date: NaiveDate) -> Result<MoonReading, SourceError> {
        let illumination = self
            .illumination
            .ok_or_else(|| SourceError::Unavailable("moon service offline".to_string()))?;
        Ok(MoonReading {
            date,
            phase: MoonPhase::FullMoon,
            illumination,
            age_days: 14.8,
            source: "stub".to_string(),
        })
    }
}

fn assessor(weather: StubWeather, illumination: Option<f64>) -> ViewingAssessor {
    ViewingAssessor::new(Arc::new(weather), Arc::new(StubMoon { illumination }))
}

fn request() -> LocationRequest {
    LocationRequest::new(
        ObserverLocation::new(36.1, -112.1),
        NaiveDate::from_ymd_opt(2024, 10, 3).expect("date"),
    )
}

#[tokio::test]
async fn nighttime_average_drives_cloud_cover() {
    let result = assessor(StubWeather::Night(20.0), Some(0.0))
        .assess_for_location(&request())
        .await;

    assert_eq!(result.cloud_cover_origin, CloudCoverOrigin::NighttimeAverage);
    assert!((result.cloud_cover_percent - 20.0).abs() < f64::EPSILON);
    assert_eq!(result.conditions.numeric_score, 90);
    assert_eq!(result.conditions.category, ScoreCategory::Excellent);
    assert_eq!(result.moon.map(|m| m.source).as_deref(), Some("stub"));
}

#[tokio::test]
async fn falls_back_to_current_cloud_cover() {
    let result = assessor(StubWeather::CurrentOnly(Some(60.0)), Some(1.0))
        .assess_for_location(&request())
        .await;

    assert_eq!(result.cloud_cover_origin, CloudCoverOrigin::Current);
    assert_eq!(result.conditions.moon_illumination_percent, 100);
    assert_eq!(result.conditions.numeric_score, 45);
    assert_eq!(result.conditions.category, ScoreCategory::Fair);
}

#[tokio::test]
async fn missing_cloud_data_defaults_to_clear() {
    let result = assessor(StubWeather::CurrentOnly(None), Some(0.0))
        .assess_for_location(&request())
        .await;
    assert_eq!(result.cloud_cover_origin, CloudCoverOrigin::Default);
    assert!(result.cloud_cover_percent.abs() < f64::EPSILON);
}

#[tokio::test]
async fn source_failures_degrade_instead_of_erroring() {
    let result = assessor(StubWeather::Down, None)
        .assess_for_location(&request())
        .await;

    assert_eq!(result.cloud_cover_origin, CloudCoverOrigin::Default);
    assert!(result.moon.is_none());
    assert_eq!(result.conditions.moon_illumination_percent, 0);
    assert_eq!(result.conditions.numeric_score, 100);
}

#[tokio::test]
async fn request_flags_reach_the_engine() {
    let date = NaiveDate::from_ymd_opt(2024, 10, 3).expect("date");
    let window = dark_sky_window(
        36.1,
        date,
        Utc.with_ymd_and_hms(2024, 10, 4, 2, 0, 0).single(),
        Utc.with_ymd_and_hms(2024, 10, 4, 11, 30, 0).single(),
    );
    let dusk = Utc
        .with_ymd_and_hms(2024, 10, 4, 1, 0, 0)
        .single()
        .expect("dusk");

    let req = request()
        .with_dark_window(&window, dusk)
        .with_moon_up(false)
        .with_light_pollution(0.5);
    assert!(!req.is_astronomical_night);

    let result = assessor(StubWeather::Night(0.0), Some(1.0))
        .assess_for_location(&req)
        .await;

    // 50 + 25 + 6 + 5
    assert_eq!(result.conditions.numeric_score, 86);
    assert!(!result.conditions.is_dark_sky);
    assert!(result
        .conditions
        .recommendations
        .iter()
        .any(|r| r == "Not fully dark - brighter objects only"));
}

#[tokio::test]
async fn assessment_feeds_tonight_summary() {
    let result = assessor(StubWeather::Night(80.0), Some(0.5))
        .assess_for_location(&request())
        .await;
    let data = TonightData::default().with_viewing(&result);

    assert_eq!(data.cloud_cover_percent, Some(80));
    assert_eq!(data.moon_phase.as_deref(), Some("Full Moon"));
    assert_eq!(data.moon_illumination, Some(50));

    let text = generate_summary_text(&data);
    assert!(text.starts_with("Tonight: Full Moon (50% illuminated)."));
    assert!(text.ends_with("with overcast skies."));
}

#[tokio::test]
async fn default_config_uses_fixed_weather_and_local_moon() {
    let assessor = ViewingAssessor::from_config(SourcesConfig::default()).expect("assessor");
    assert_eq!(assessor.weather_source(), "fixed");
    assert_eq!(assessor.moon_source(), "local");

    let result = assessor.assess_for_location(&request()).await;
    assert_eq!(result.cloud_cover_origin, CloudCoverOrigin::NighttimeAverage);
    assert_eq!(result.moon.map(|m| m.source).as_deref(), Some("local"));
}
