use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::activity_log::ActivityCategory;
use crate::models::mood_log::MoodCategory;

/// A generated wellbeing report. Write-once: a new request always creates a
/// new row, existing reports are never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WellbeingReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// 0–100, derived from the aggregate snapshot and trend.
    pub overall_score: i32,
    pub wellbeing_level: WellbeingLevel,
    pub summary: String,
    pub generated_by: ReportSource,
    pub recommendations: Json<Vec<Recommendation>>,
    pub mood_analysis: Option<Json<MoodAnalysis>>,
    pub activity_analysis: Option<Json<ActivityAnalysis>>,
    pub sleep_analysis: Option<Json<SleepAnalysis>>,
    pub stress_analysis: Option<Json<StressAnalysis>>,
    pub created_at: DateTime<Utc>,
}

/// Discrete wellbeing bucket, derived deterministically from the overall
/// score. `NoData` is used when the window held no mood logs at all.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "wellbeing_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WellbeingLevel {
    NoData,
    Low,
    Moderate,
    Good,
    Excellent,
}

impl WellbeingLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoData => "No data",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Which narrative backend produced the report summary. `Client` is accepted
/// on the generate endpoint but never produced by the engine itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "report_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Ai,
    Fallback,
    Client,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

// Analysis sub-objects. Each is absent from the report when the window held
// no relevant logs, so consumers can distinguish "no data" from zeros.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodAnalysis {
    pub entry_count: i64,
    pub average_score: f64,
    pub min_score: i32,
    pub max_score: i32,
    pub dominant_category: MoodCategory,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityAnalysis {
    pub entry_count: i64,
    pub total_minutes: i64,
    pub dominant_category: ActivityCategory,
    pub by_category: Vec<CategoryBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: ActivityCategory,
    pub entry_count: i64,
    pub total_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SleepAnalysis {
    pub entry_count: i64,
    pub average_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressAnalysis {
    pub entry_count: i64,
    pub average_level: f64,
    pub min_level: i32,
    pub max_level: i32,
}
