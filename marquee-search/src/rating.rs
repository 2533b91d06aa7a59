//! Rating colour classification.

use serde::Serialize;

/// Three-tier rating classification plus a neutral tier for missing ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTier {
    /// 8.0 and above
    High,
    /// 6.0 up to but excluding 8.0
    Medium,
    /// Below 6.0
    Low,
    /// Rating missing or not a number
    Unrated,
}

impl RatingTier {
    /// Classifies an upstream rating string such as `"8.8"` or `"N/A"`.
    pub fn classify(rating_value: &str) -> Self {
        match rating_value.trim().parse::<f64>() {
            Ok(rating) if rating.is_finite() => {
                if rating >= 8.0 {
                    RatingTier::High
                } else if rating >= 6.0 {
                    RatingTier::Medium
                } else {
                    RatingTier::Low
                }
            }
            _ => RatingTier::Unrated,
        }
    }

    /// Display colour for this tier.
    pub fn color_hex(self) -> &'static str {
        match self {
            RatingTier::High => "#4CAF50",
            RatingTier::Medium => "#FF9800",
            RatingTier::Low => "#F44336",
            RatingTier::Unrated => "#888",
        }
    }

    /// Short lowercase name of the tier.
    pub fn label(self) -> &'static str {
        match self {
            RatingTier::High => "high",
            RatingTier::Medium => "medium",
            RatingTier::Low => "low",
            RatingTier::Unrated => "unrated",
        }
    }
}

impl std::fmt::Display for RatingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
