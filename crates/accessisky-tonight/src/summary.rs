use accessisky_sources::MoonReading;
use accessisky_viewing::ScoreCategory;
use serde::{Deserialize, Serialize};

use crate::assessor::LocationAssessment;

pub const NO_DATA_TEXT: &str = "Sky data is currently unavailable. Please check back later.";

/// Everything known about tonight's sky, gathered from independent sources.
/// Any part may be missing; the summary simply leaves it out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TonightData {
    pub moon_phase: Option<String>,
    pub moon_illumination: Option<i32>,
    pub moon_rise_time: Option<String>,
    pub moon_set_time: Option<String>,

    pub iss_passes: Vec<String>,
    pub visible_planets: Vec<String>,
    pub active_meteor_showers: Vec<String>,

    pub aurora_kp: Option<f64>,
    pub aurora_activity: Option<String>,

    pub viewing_score: Option<i32>,
    pub cloud_cover_percent: Option<i32>,
    pub viewing_description: Option<String>,
}

impl TonightData {
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_moon(mut self, reading: &MoonReading) -> Self {
        self.moon_phase = Some(reading.phase.label().to_string());
        self.moon_illumination = Some(reading.illumination_percent() as i32);
        self
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn with_viewing(mut self, assessment: &LocationAssessment) -> Self {
        self.viewing_score = Some(assessment.conditions.numeric_score);
        self.cloud_cover_percent = Some(assessment.cloud_cover_percent.round() as i32);
        self.viewing_description = Some(assessment.conditions.summary.clone());
        if let Some(reading) = &assessment.moon {
            self = self.with_moon(reading);
        }
        self
    }
}

fn condition_word(score: i32) -> &'static str {
    match ScoreCategory::from_score(score) {
        ScoreCategory::Excellent => "excellent",
        ScoreCategory::Good => "good",
        ScoreCategory::Fair => "fair",
        ScoreCategory::Poor | ScoreCategory::NotRecommended => "poor",
    }
}

fn moon_sentence(data: &TonightData) -> Option<String> {
    let phase = data.moon_phase.as_deref()?;
    let mut out = phase.to_string();
    if let Some(illum) = data.moon_illumination {
        out.push_str(&format!(" ({illum}% illuminated)"));
    }
    if let Some(rise) = &data.moon_rise_time {
        out.push_str(&format!(" rises at {rise}"));
    } else if let Some(set) = &data.moon_set_time {
        out.push_str(&format!(" sets at {set}"));
    }
    out.push('.');
    Some(out)
}

fn iss_sentence(passes: &[String]) -> Option<String> {
    match passes {
        [] => None,
        [only] => Some(format!("The ISS passes over at {only}.")),
        many => Some(format!(
            "The ISS has {} visible passes tonight.",
            many.len()
        )),
    }
}

fn planets_sentence(planets: &[String]) -> Option<String> {
    match planets {
        [] => None,
        [only] => Some(format!("{only} is visible in the sky.")),
        [a, b] => Some(format!("{a} and {b} are visible in the evening sky.")),
        [rest @ .., last] => Some(format!(
            "{}, and {last} are visible tonight.",
            rest.join(", ")
        )),
    }
}

fn meteor_sentence(showers: &[String]) -> Option<String> {
    match showers {
        [] => None,
        [only] => Some(format!("The {only} meteor shower is active.")),
        [a, b, ..] => Some(format!("The {a} and {b} meteor showers are active.")),
    }
}

fn aurora_sentence(data: &TonightData) -> Option<String> {
    let kp = data.aurora_kp?;
    if kp >= 4.0 {
        let activity = data
            .aurora_activity
            .as_deref()
            .unwrap_or("elevated")
            .to_lowercase();
        Some(format!("Aurora activity is {activity} (Kp {kp:.0})."))
    } else if kp >= 3.0 {
        Some("Aurora may be visible at high latitudes.".to_string())
    } else {
        None
    }
}

fn viewing_sentence(data: &TonightData) -> Option<String> {
    let score = data.viewing_score?;
    let mut out = format!(
        "Viewing conditions are {} ({score}/100)",
        condition_word(score)
    );

    match data.cloud_cover_percent {
        Some(cloud) if cloud >= 75 => out.push_str(" with overcast skies"),
        Some(cloud) if cloud >= 50 => out.push_str(" with partly cloudy skies"),
        _ => {
            if let Some(desc) = &data.viewing_description {
                out.push_str(&format!(" - {}", desc.to_lowercase()));
            }
        }
    }
    out.push('.');
    Some(out)
}

/// Plain-language summary for screen readers, starting with "Tonight:".
pub fn generate_summary_text(data: &TonightData) -> String {
    let sentences = [
        moon_sentence(data),
        iss_sentence(&data.iss_passes),
        planets_sentence(&data.visible_planets),
        meteor_sentence(&data.active_meteor_showers),
        aurora_sentence(data),
        viewing_sentence(data),
    ];

    let mut parts = vec!["Tonight:".to_string()];
    parts.extend(sentences.into_iter().flatten());
    if parts.len() == 1 {
        parts.push(NO_DATA_TEXT.to_string());
    }
    parts.join(" ")
}
