//! Report assembly: the pipeline that turns a window of logs into a
//! persisted wellbeing report.
//!
//! Order matters and is fixed: validate → consume quota → read logs →
//! aggregate → trend + score → recommendations → narrative → persist.
//! Only validation and quota failures surface as errors; anything else
//! degrades to a best-effort report.

use chrono::{Duration, NaiveDate};
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::activity_log::ActivityLog;
use crate::models::mood_log::MoodLog;
use crate::models::report::{
    ActivityAnalysis, CategoryBreakdown, MoodAnalysis, ReportSource, SleepAnalysis,
    StressAnalysis, WellbeingReport,
};
use crate::models::user::SubscriptionTier;
use crate::services::narrative::{Narrative, NarrativeInput};
use crate::services::{aggregate, quota, recommend, score, trend};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Resolve the request into an inclusive date window: either a day count
/// ending today, or an explicit start/end pair, never a mix.
pub fn resolve_window(
    window_days: Option<i64>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> AppResult<ReportWindow> {
    match (window_days, start, end) {
        (Some(days), None, None) => {
            if days < 1 {
                return Err(AppError::Validation("window_days must be positive".into()));
            }
            Ok(ReportWindow {
                start: today - Duration::days(days - 1),
                end: today,
            })
        }
        (None, Some(start), Some(end)) => Ok(ReportWindow { start, end }),
        _ => Err(AppError::Validation(
            "Provide either window_days or both start and end".into(),
        )),
    }
}

pub fn validate_window(window: &ReportWindow, max_days: i64) -> AppResult<()> {
    if window.start > window.end {
        return Err(AppError::Validation(
            "Window start must not be after its end".into(),
        ));
    }
    let days = (window.end - window.start).num_days() + 1;
    if days > max_days {
        return Err(AppError::Validation(format!(
            "Window of {} days exceeds the {}-day maximum",
            days, max_days
        )));
    }
    Ok(())
}

/// Run the full pipeline and persist the result.
///
/// Quota is consumed before the log read (consume-before-work), so an
/// abandoned request is still charged. `client_summary`, when present,
/// becomes the narrative verbatim with the `client` tag and neither
/// narrative backend is invoked.
pub async fn generate_report(
    state: &AppState,
    user_id: Uuid,
    tier: &SubscriptionTier,
    window: ReportWindow,
    client_summary: Option<String>,
) -> AppResult<WellbeingReport> {
    validate_window(&window, state.config.max_report_window_days)?;

    quota::try_consume(&state.db, user_id, state.config.report_limit(tier)).await?;

    let moods = sqlx::query_as::<_, MoodLog>(
        r#"
        SELECT * FROM mood_logs
        WHERE user_id = $1 AND logged_at::date BETWEEN $2 AND $3
        ORDER BY logged_at ASC
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&state.db)
    .await?;

    let activities = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT * FROM activity_logs
        WHERE user_id = $1 AND logged_at::date BETWEEN $2 AND $3
        ORDER BY logged_at ASC
        "#,
    )
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&state.db)
    .await?;

    if moods.is_empty() && activities.is_empty() {
        // Not an error: the report is still produced with no-data defaults.
        tracing::info!(user_id = %user_id, "No logs in report window, generating no-data report");
    }

    let snapshot = aggregate::aggregate(&moods, &activities);
    let trend = trend::classify(&moods);
    let (overall_score, level) = score::score(&snapshot, trend);
    let recommendations = recommend::recommend(&snapshot, overall_score);

    let client_summary = client_summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let narrative = match client_summary {
        Some(text) => Narrative {
            text,
            source: ReportSource::Client,
        },
        None => {
            state
                .narrative
                .generate(&NarrativeInput {
                    snapshot: &snapshot,
                    trend,
                    overall_score,
                    level,
                    recommendations: &recommendations,
                })
                .await
        }
    };

    let mood_analysis = snapshot.mood.as_ref().map(|m| MoodAnalysis {
        entry_count: m.entry_count,
        average_score: m.average_score,
        min_score: m.min_score,
        max_score: m.max_score,
        dominant_category: m.dominant_category,
        trend,
    });
    let activity_analysis = snapshot.activity.as_ref().map(|a| ActivityAnalysis {
        entry_count: a.entry_count,
        total_minutes: a.total_minutes,
        dominant_category: a.dominant_category,
        by_category: a
            .by_category
            .iter()
            .map(|c| CategoryBreakdown {
                category: c.category,
                entry_count: c.entry_count,
                total_minutes: c.total_minutes,
            })
            .collect(),
    });
    let sleep_analysis = snapshot
        .mood
        .as_ref()
        .and_then(|m| m.sleep.as_ref())
        .map(|s| SleepAnalysis {
            entry_count: s.entry_count,
            average_hours: s.average_hours,
            min_hours: s.min_hours,
            max_hours: s.max_hours,
        });
    let stress_analysis = snapshot
        .mood
        .as_ref()
        .and_then(|m| m.stress.as_ref())
        .map(|s| StressAnalysis {
            entry_count: s.entry_count,
            average_level: s.average,
            min_level: s.min,
            max_level: s.max,
        });

    let report = sqlx::query_as::<_, WellbeingReport>(
        r#"
        INSERT INTO wellbeing_reports (
            id, user_id, period_start, period_end, overall_score, wellbeing_level,
            summary, generated_by, recommendations,
            mood_analysis, activity_analysis, sleep_analysis, stress_analysis
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(window.start)
    .bind(window.end)
    .bind(overall_score)
    .bind(level)
    .bind(&narrative.text)
    .bind(narrative.source)
    .bind(Json(&recommendations))
    .bind(mood_analysis.map(Json))
    .bind(activity_analysis.map(Json))
    .bind(sleep_analysis.map(Json))
    .bind(stress_analysis.map(Json))
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = %user_id,
        report_id = %report.id,
        score = report.overall_score,
        generated_by = ?report.generated_by,
        "Wellbeing report generated"
    );

    Ok(report)
}
