use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::{CloudCover, ScoreCategory};
use crate::score::{calculate_viewing_score, ViewingInput};

pub const REC_HEAVY_CLOUD: &str = "Heavy cloud cover - wait for clearer skies";
pub const REC_SIGNIFICANT_CLOUD: &str = "Significant clouds - viewing may be intermittent";
pub const REC_SOME_CLOUD: &str = "Some clouds - find gaps for observing";
pub const REC_BRIGHT_MOON: &str = "Bright moon - best for planets and the Moon itself";
pub const REC_MOON_UP: &str = "Moon is up - deep sky objects may be washed out";
pub const REC_DARK_MOON: &str = "Dark moon - great for galaxies and nebulae";
pub const REC_NOT_DARK: &str = "Not fully dark - brighter objects only";
pub const REC_DEEP_SKY: &str = "Excellent for deep sky observing!";

pub const OVERCAST_SUMMARY: &str = "Overcast skies - wait for better conditions";

/// Light pollution below this factor still counts as a dark sky.
pub const DARK_SKY_LIGHT_POLLUTION_LIMIT: f64 = 0.3;

/// Bortle dark-sky class, 1 (darkest) to 9 (inner city).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BortleScale(u8);

impl BortleScale {
    pub fn new(class: u8) -> Option<Self> {
        (1..=9).contains(&class).then_some(Self(class))
    }

    pub fn class(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BortleScale {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("bortle class must be 1-9, got {value}"))
    }
}

impl From<BortleScale> for u8 {
    fn from(value: BortleScale) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingConditions {
    pub category: ScoreCategory,
    pub numeric_score: i32,
    pub cloud_cover: CloudCover,
    pub moon_illumination_percent: i32,
    pub is_dark_sky: bool,
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bortle_scale: Option<BortleScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeing: Option<String>,
}

impl ViewingConditions {
    pub fn with_bortle_scale(mut self, bortle_scale: BortleScale) -> Self {
        self.bortle_scale = Some(bortle_scale);
        self
    }

    pub fn with_transparency(mut self, transparency: impl Into<String>) -> Self {
        self.transparency = Some(transparency.into());
        self
    }

    pub fn with_seeing(mut self, seeing: impl Into<String>) -> Self {
        self.seeing = Some(seeing.into());
        self
    }
}

impl fmt::Display for ViewingConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/100): {}",
            self.category, self.numeric_score, self.summary
        )?;
        if !self.recommendations.is_empty() {
            let shown = self
                .recommendations
                .iter()
                .take(2)
                .map(String::as_str)
                .collect::<Vec<_>>();
            write!(f, " | {}", shown.join("; "))?;
        }
        Ok(())
    }
}

/// Advisory notes in fixed order. Each of the four groups contributes at
/// most one entry and groups never suppress each other.
pub fn recommendations(input: &ViewingInput) -> Vec<String> {
    let cloud = input.cloud_cover_percent;
    let moon = input.moon_illumination_percent;
    let mut out = Vec::new();

    if cloud > 75.0 {
        out.push(REC_HEAVY_CLOUD);
    } else if cloud > 50.0 {
        out.push(REC_SIGNIFICANT_CLOUD);
    } else if cloud > 25.0 {
        out.push(REC_SOME_CLOUD);
    }

    if moon > 80.0 && input.is_moon_up {
        out.push(REC_BRIGHT_MOON);
    } else if moon > 50.0 && input.is_moon_up {
        out.push(REC_MOON_UP);
    } else if moon < 20.0 {
        out.push(REC_DARK_MOON);
    }

    if !input.is_astronomical_night {
        out.push(REC_NOT_DARK);
    }

    if cloud < 20.0 && moon < 30.0 {
        out.push(REC_DEEP_SKY);
    }

    out.into_iter().map(str::to_string).collect()
}

pub fn summary(category: ScoreCategory, cloud_cover: CloudCover) -> String {
    match cloud_cover {
        CloudCover::Overcast => OVERCAST_SUMMARY.to_string(),
        CloudCover::MostlyCloudy => format!("{} - clouds may interfere", category.base_summary()),
        CloudCover::Clear | CloudCover::PartlyCloudy => category.base_summary().to_string(),
    }
}

/// Full assessment for one set of inputs. Deterministic and side-effect free.
#[allow(clippy::cast_possible_truncation)]
pub fn assess(input: &ViewingInput) -> ViewingConditions {
    let numeric_score = calculate_viewing_score(input);
    let category = ScoreCategory::from_score(numeric_score);
    let cloud_cover = CloudCover::from_percent(input.cloud_cover_percent);

    ViewingConditions {
        category,
        numeric_score,
        cloud_cover,
        moon_illumination_percent: input.moon_illumination_percent.round_ties_even() as i32,
        is_dark_sky: input.is_astronomical_night
            && input.light_pollution_factor < DARK_SKY_LIGHT_POLLUTION_LIMIT,
        summary: summary(category, cloud_cover),
        recommendations: recommendations(input),
        bortle_scale: None,
        transparency: None,
        seeing: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendations_follow_fixed_group_order() {
        let input = ViewingInput::new(80.0, 90.0)
            .with_moon_up(true)
            .with_night(false);
        assert_eq!(
            recommendations(&input),
            vec![REC_HEAVY_CLOUD, REC_BRIGHT_MOON, REC_NOT_DARK]
        );
    }

    #[test]
    fn cloud_group_highest_threshold_wins() {
        assert_eq!(recommendations(&ViewingInput::new(60.0, 40.0)), vec![REC_SIGNIFICANT_CLOUD]);
        assert_eq!(recommendations(&ViewingInput::new(30.0, 40.0)), vec![REC_SOME_CLOUD]);
        assert!(recommendations(&ViewingInput::new(25.0, 40.0)).is_empty());
    }

    #[test]
    fn moon_group_respects_horizon() {
        let down = ViewingInput::new(40.0, 90.0).with_moon_up(false);
        assert_eq!(recommendations(&down), vec![REC_SOME_CLOUD]);

        let up = ViewingInput::new(40.0, 60.0);
        assert_eq!(recommendations(&up), vec![REC_SOME_CLOUD, REC_MOON_UP]);
    }

    #[test]
    fn dark_moon_and_deep_sky_notes_co_occur() {
        let input = ViewingInput::new(5.0, 10.0);
        assert_eq!(recommendations(&input), vec![REC_DARK_MOON, REC_DEEP_SKY]);
    }

    #[test]
    fn independent_groups_combine() {
        let input = ViewingInput::new(10.0, 10.0).with_night(false);
        let recs = recommendations(&input);
        assert_eq!(recs, vec![REC_DARK_MOON, REC_NOT_DARK, REC_DEEP_SKY]);

        let input = ViewingInput::new(30.0, 10.0).with_night(false);
        assert_eq!(recommendations(&input).len(), 3);
    }

    #[test]
    fn overcast_overrides_summary() {
        assert_eq!(
            summary(ScoreCategory::Good, CloudCover::Overcast),
            OVERCAST_SUMMARY
        );
        assert_eq!(
            summary(ScoreCategory::Fair, CloudCover::MostlyCloudy),
            "Acceptable viewing with some limitations - clouds may interfere"
        );
        assert_eq!(
            summary(ScoreCategory::Excellent, CloudCover::Clear),
            "Outstanding stargazing conditions"
        );
    }

    #[test]
    fn assess_derives_every_field() {
        let input = ViewingInput::new(10.0, 12.4).with_light_pollution(0.2);
        let out = assess(&input);
        assert_eq!(out.numeric_score, 87);
        assert_eq!(out.category, ScoreCategory::Excellent);
        assert_eq!(out.cloud_cover, CloudCover::Clear);
        assert_eq!(out.moon_illumination_percent, 12);
        assert!(out.is_dark_sky);
        assert_eq!(out.summary, "Outstanding stargazing conditions");
        assert!(out.bortle_scale.is_none());
    }

    #[test]
    fn dark_sky_needs_night_and_low_pollution() {
        assert!(!assess(&ViewingInput::default().with_light_pollution(0.3)).is_dark_sky);
        assert!(!assess(&ViewingInput::default().with_night(false)).is_dark_sky);
        assert!(assess(&ViewingInput::default().with_light_pollution(0.29)).is_dark_sky);
    }

    #[test]
    fn display_shows_first_two_recommendations() {
        let input = ViewingInput::new(80.0, 90.0).with_night(false);
        let text = assess(&input).to_string();
        assert!(text.starts_with("Poor (28/100): Overcast skies - wait for better conditions | "));
        assert!(text.ends_with(&format!("{REC_HEAVY_CLOUD}; {REC_BRIGHT_MOON}")));
        assert!(!text.contains(REC_NOT_DARK));
    }

    #[test]
    fn display_without_recommendations() {
        let conditions = assess(&ViewingInput::new(22.0, 40.0).with_moon_up(false));
        assert!(conditions.recommendations.is_empty());
        assert_eq!(
            conditions.to_string(),
            "Excellent (89/100): Outstanding stargazing conditions"
        );
    }

    #[test]
    fn bortle_scale_rejects_out_of_range() {
        assert!(BortleScale::new(0).is_none());
        assert!(BortleScale::new(10).is_none());
        let class = BortleScale::new(4).expect("valid class");
        let out = assess(&ViewingInput::default())
            .with_bortle_scale(class)
            .with_seeing("steady");
        assert_eq!(out.bortle_scale.map(BortleScale::class), Some(4));
        assert_eq!(out.seeing.as_deref(), Some("steady"));
        assert_eq!(out.numeric_score, 100);
    }

    #[test]
    fn serialized_form_is_stable() {
        let out = assess(&ViewingInput::new(60.0, 55.0));
        let value = serde_json::to_value(&out).expect("serialize");
        assert_eq!(value["category"], "FAIR");
        assert_eq!(value["cloud_cover"], "MOSTLY_CLOUDY");
        assert!(value.get("bortle_scale").is_none());

        let back: ViewingConditions = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, out);
    }
}
