use serde::{Deserialize, Serialize};

/// Exponent of the moon interference curve.
///
/// A tuned heuristic rather than a photometric constant: values below 1 bend
/// the curve so that partially lit moons interfere more than a linear model
/// would suggest. Kept at 0.7 for compatibility with published scores.
pub const MOON_INTERFERENCE_EXPONENT: f64 = 0.7;

/// Weight of the cloud sub-score. Clouds block the sky outright.
pub const CLOUD_WEIGHT: f64 = 0.50;
/// Weight of the moon sub-score. Moonlight only degrades contrast.
pub const MOON_WEIGHT: f64 = 0.25;
pub const DARKNESS_WEIGHT: f64 = 0.15;
pub const LIGHT_POLLUTION_WEIGHT: f64 = 0.10;

/// Darkness sub-score during astronomical night (sun more than 18° down).
pub const NIGHT_DARKNESS_SCORE: f64 = 100.0;
/// Darkness sub-score while any twilight remains.
pub const TWILIGHT_DARKNESS_SCORE: f64 = 40.0;

/// Raw environmental inputs to the scoring engine.
///
/// Values are not range checked. Out-of-domain numbers flow through the
/// arithmetic unchanged, so a negative cloud cover inflates the cloud term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewingInput {
    /// Cloud cover, 0-100.
    pub cloud_cover_percent: f64,
    /// Lit fraction of the lunar disk, 0-100.
    pub moon_illumination_percent: f64,
    pub is_astronomical_night: bool,
    pub is_moon_up: bool,
    /// 0 is a pristine site, 1 is maximum artificial sky glow.
    pub light_pollution_factor: f64,
}

impl Default for ViewingInput {
    fn default() -> Self {
        Self {
            cloud_cover_percent: 0.0,
            moon_illumination_percent: 0.0,
            is_astronomical_night: true,
            is_moon_up: true,
            light_pollution_factor: 0.0,
        }
    }
}

impl ViewingInput {
    pub fn new(cloud_cover_percent: f64, moon_illumination_percent: f64) -> Self {
        Self {
            cloud_cover_percent,
            moon_illumination_percent,
            ..Self::default()
        }
    }

    pub fn with_night(mut self, is_astronomical_night: bool) -> Self {
        self.is_astronomical_night = is_astronomical_night;
        self
    }

    pub fn with_moon_up(mut self, is_moon_up: bool) -> Self {
        self.is_moon_up = is_moon_up;
        self
    }

    pub fn with_light_pollution(mut self, light_pollution_factor: f64) -> Self {
        self.light_pollution_factor = light_pollution_factor;
        self
    }
}

/// The four weighted components of the viewing score, each nominally 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub cloud: f64,
    pub moon: f64,
    pub darkness: f64,
    pub light_pollution: f64,
}

impl SubScores {
    pub fn weighted_total(&self) -> f64 {
        self.cloud * CLOUD_WEIGHT
            + self.moon * MOON_WEIGHT
            + self.darkness * DARKNESS_WEIGHT
            + self.light_pollution * LIGHT_POLLUTION_WEIGHT
    }
}

/// Moon interference factor: 0 means no interference, 1 is a full moon overhead.
pub fn moon_interference(illumination_percent: f64, is_moon_up: bool) -> f64 {
    if !is_moon_up {
        return 0.0;
    }

    let normalized = illumination_percent / 100.0;
    normalized.powf(MOON_INTERFERENCE_EXPONENT)
}

pub fn sub_scores(input: &ViewingInput) -> SubScores {
    let interference = moon_interference(input.moon_illumination_percent, input.is_moon_up);
    let darkness = if input.is_astronomical_night {
        NIGHT_DARKNESS_SCORE
    } else {
        TWILIGHT_DARKNESS_SCORE
    };

    SubScores {
        cloud: 100.0 - input.cloud_cover_percent,
        moon: 100.0 * (1.0 - interference),
        darkness,
        light_pollution: 100.0 * (1.0 - input.light_pollution_factor),
    }
}

/// Overall stargazing score, 0-100 for in-domain inputs.
///
/// Exact halves round to even.
#[allow(clippy::cast_possible_truncation)]
pub fn calculate_viewing_score(input: &ViewingInput) -> i32 {
    sub_scores(input).weighted_total().round_ties_even() as i32
}
