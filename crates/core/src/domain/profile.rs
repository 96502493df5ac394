use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTolerance {
    Low,
    Moderate,
    High,
    /// Anything outside the three known levels, kept verbatim (possibly empty).
    Other(String),
}

impl RiskTolerance {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "high" => Self::High,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBucket {
    Under30,
    Thirties,
    Forties,
    Fifties,
    SixtyPlus,
    Unknown,
}

impl AgeBucket {
    pub fn from_age(age: Option<i64>) -> Self {
        match age {
            None => Self::Unknown,
            Some(a) if a < 30 => Self::Under30,
            Some(a) if a < 40 => Self::Thirties,
            Some(a) if a < 50 => Self::Forties,
            Some(a) if a < 60 => Self::Fifties,
            Some(_) => Self::SixtyPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under30 => "Under 30",
            Self::Thirties => "30-39",
            Self::Forties => "40-49",
            Self::Fifties => "50-59",
            Self::SixtyPlus => "60+",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub age: Option<i64>,
    pub risk: RiskTolerance,
}

/// A goal toggled by a Yes/No answer with an optional target amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedGoal {
    pub wanted: bool,
    /// Only present when `wanted` is true.
    pub target_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSurvey {
    pub loss_reaction: String,
    pub primary_goal: String,
    pub income_stability: String,
    pub liabilities: String,
    pub savings_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub retirement: FlaggedGoal,
    pub education: FlaggedGoal,
    pub other_goals: String,
    pub time_horizon: String,
    pub survey: RiskSurvey,
    pub consent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyFund {
    pub available: bool,
    pub amount: f64,
    /// Months of monthly expenses the fund covers; `None` when expenses are not positive.
    pub months_covered: Option<f64>,
}
