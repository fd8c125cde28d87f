use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CloudCover {
    Clear,
    PartlyCloudy,
    MostlyCloudy,
    Overcast,
}

impl CloudCover {
    /// Lower bounds are inclusive: exactly 25% is already partly cloudy.
    pub fn from_percent(percent: f64) -> Self {
        if percent < 25.0 {
            Self::Clear
        } else if percent < 50.0 {
            Self::PartlyCloudy
        } else if percent < 75.0 {
            Self::MostlyCloudy
        } else {
            Self::Overcast
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear skies",
            Self::PartlyCloudy => "Partly cloudy",
            Self::MostlyCloudy => "Mostly cloudy",
            Self::Overcast => "Overcast",
        }
    }
}

impl fmt::Display for CloudCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    NotRecommended,
}

impl ScoreCategory {
    pub fn from_score(score: i32) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            20..=39 => Self::Poor,
            _ => Self::NotRecommended,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::NotRecommended => "Not Recommended",
        }
    }

    pub fn base_summary(self) -> &'static str {
        match self {
            Self::Excellent => "Outstanding stargazing conditions",
            Self::Good => "Good conditions for astronomy",
            Self::Fair => "Acceptable viewing with some limitations",
            Self::Poor => "Challenging conditions for observing",
            Self::NotRecommended => "Not suitable for stargazing",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
