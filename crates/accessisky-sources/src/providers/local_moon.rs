use std::f64::consts::PI;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::config::LocalMoonConfig;
use crate::error::SourceError;
use crate::traits::MoonSource;
use crate::types::{MoonPhase, MoonReading};

const SOURCE_NAME: &str = "local";

/// Offline moon ephemeris: a mean synodic cycle anchored on a known new moon.
/// Good to within a day or so, which is all the viewing score needs.
#[derive(Debug, Clone)]
pub struct LocalMoonSource {
    config: LocalMoonConfig,
}

impl LocalMoonSource {
    pub fn new(config: LocalMoonConfig) -> Result<Self, SourceError> {
        if !(config.synodic_month_days.is_finite() && config.synodic_month_days > 0.0) {
            return Err(SourceError::Config(format!(
                "synodic month must be positive, got {}",
                config.synodic_month_days
            )));
        }
        Ok(Self { config })
    }

    /// Days since the most recent new moon, in `[0, synodic month)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn age_days(&self, at: DateTime<Utc>) -> f64 {
        let elapsed_ms = at.timestamp_millis() - self.config.reference_new_moon_unix * 1000;
        let days = elapsed_ms as f64 / 86_400_000.0;
        days.rem_euclid(self.config.synodic_month_days)
    }

    pub fn illumination(&self, at: DateTime<Utc>) -> f64 {
        let angle = self.age_days(at) / self.config.synodic_month_days * 2.0 * PI;
        (1.0 - angle.cos()) / 2.0
    }

    pub fn reading_at(&self, at: DateTime<Utc>) -> MoonReading {
        let age_days = self.age_days(at);
        MoonReading {
            date: at.date_naive(),
            phase: MoonPhase::from_age(age_days, self.config.synodic_month_days),
            illumination: self.illumination(at),
            age_days,
            source: SOURCE_NAME.to_string(),
        }
    }
}

impl Default for LocalMoonSource {
    fn default() -> Self {
        Self {
            config: LocalMoonConfig::default(),
        }
    }
}

#[async_trait::async_trait]
impl MoonSource for LocalMoonSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Date-only lookups are evaluated at 12:00 UTC.
    async fn moon_info(&self, date: NaiveDate) -> Result<MoonReading, SourceError> {
        let noon = (date.and_time(NaiveTime::MIN) + Duration::hours(12)).and_utc();
        Ok(self.reading_at(noon))
    }
}
