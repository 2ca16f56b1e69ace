use serde::Serialize;

/// Three-tier risk banding over the predicted default probability.
/// Thresholds are fixed product constants, not configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.2 {
            Self::Low
        } else if probability < 0.5 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::Low => "#2e7d32",
            Self::Medium => "#f9a825",
            Self::High => "#c62828",
        }
    }
}
