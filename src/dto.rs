//! # Wellspring — Request/Response DTOs
//!
//! API contract types for the log and report endpoints. Conventions:
//! - `*Request` → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field validation is expressed via `validator` derive macros; handlers
//!   call `.validate()` and map failures to `AppError::Validation`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::activity_log::ActivityCategory;
use crate::models::mood_log::MoodCategory;
use crate::models::report::WellbeingReport;

// ============================================================================
// Logs
// ============================================================================

/// POST /api/mood-logs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodLogRequest {
    /// Defaults to now when omitted.
    pub logged_at: Option<DateTime<Utc>>,

    pub category: MoodCategory,

    #[validate(range(min = 1, max = 10, message = "Mood score must be between 1 and 10"))]
    pub score: i32,

    #[validate(range(min = 1, max = 10, message = "Stress level must be between 1 and 10"))]
    pub stress_level: Option<i32>,

    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: Option<f64>,
}

/// POST /api/activity-logs
#[derive(Debug, Deserialize, Validate)]
pub struct CreateActivityLogRequest {
    pub logged_at: Option<DateTime<Utc>>,

    pub category: ActivityCategory,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_minutes: Option<i32>,

    #[validate(length(max = 500, message = "Description too long"))]
    pub description: Option<String>,
}

/// GET /api/mood-logs and /api/activity-logs query params.
#[derive(Debug, Deserialize)]
pub struct LogWindowQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// Reports
// ============================================================================

/// POST /api/reports/generate
///
/// Either `window_days` or an explicit `start`/`end` pair. An optional
/// `client_summary` is stored verbatim with the `client` tag, skipping both
/// narrative backends.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportRequest {
    pub window_days: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,

    #[validate(length(min = 1, max = 2000, message = "client_summary must be 1-2000 characters"))]
    pub client_summary: Option<String>,
}

/// GET /api/reports query params.
#[derive(Debug, Deserialize)]
pub struct ReportListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<WellbeingReport>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}
