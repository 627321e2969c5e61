use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{GenerateReportRequest, ReportListQuery, ReportListResponse};
use crate::error::{AppError, AppResult};
use crate::models::report::WellbeingReport;
use crate::models::user::SubscriptionTier;
use crate::services::{document, quota, report};
use crate::AppState;

async fn subscription_tier(state: &AppState, user_id: Uuid) -> AppResult<SubscriptionTier> {
    let tier = sqlx::query_scalar::<_, SubscriptionTier>(
        "SELECT subscription_tier FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("User not found".into()))?;
    Ok(tier)
}

/// POST /api/reports/generate: run the full pipeline for the requested
/// window and persist the result. Fails only on validation or quota.
pub async fn generate_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<GenerateReportRequest>,
) -> AppResult<Json<WellbeingReport>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tier = subscription_tier(&state, auth_user.id).await?;
    let window = report::resolve_window(
        body.window_days,
        body.start,
        body.end,
        Utc::now().date_naive(),
    )?;

    let report =
        report::generate_report(&state, auth_user.id, &tier, window, body.client_summary).await?;

    Ok(Json(report))
}

/// GET /api/reports/latest
pub async fn latest_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WellbeingReport>> {
    let report = sqlx::query_as::<_, WellbeingReport>(
        r#"
        SELECT * FROM wellbeing_reports
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("No reports generated yet".into()))?;

    Ok(Json(report))
}

/// GET /api/reports: newest first, paginated.
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ReportListQuery>,
) -> AppResult<Json<ReportListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 50);
    let offset = (page - 1) * per_page;

    let reports = sqlx::query_as::<_, WellbeingReport>(
        r#"
        SELECT * FROM wellbeing_reports
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(auth_user.id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM wellbeing_reports WHERE user_id = $1")
            .bind(auth_user.id)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(ReportListResponse {
        reports,
        page,
        per_page,
        total,
    }))
}

/// GET /api/reports/usage: reports consumed this billing period plus the
/// plan limit, for quota UI.
pub async fn report_usage(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<quota::UsageSnapshot>> {
    let tier = subscription_tier(&state, auth_user.id).await?;
    let usage =
        quota::current_usage(&state.db, auth_user.id, state.config.report_limit(&tier)).await?;
    Ok(Json(usage))
}

/// GET /api/reports/:id/document: serialize a persisted report into a
/// portable HTML document.
pub async fn report_document(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let report = sqlx::query_as::<_, WellbeingReport>(
        "SELECT * FROM wellbeing_reports WHERE id = $1 AND user_id = $2",
    )
    .bind(report_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Report not found".into()))?;

    let html = document::render_html(&report);

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "inline; filename=\"wellbeing-report-{}.html\"",
                    report.period_end
                ),
            ),
        ],
        html,
    ))
}
