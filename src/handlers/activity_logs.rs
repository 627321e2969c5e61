use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateActivityLogRequest, LogWindowQuery};
use crate::error::{AppError, AppResult};
use crate::models::activity_log::ActivityLog;
use crate::AppState;

pub async fn create_activity_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateActivityLogRequest>,
) -> AppResult<Json<ActivityLog>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let logged_at = body.logged_at.unwrap_or_else(Utc::now);

    let log = sqlx::query_as::<_, ActivityLog>(
        r#"
        INSERT INTO activity_logs (id, user_id, logged_at, category, duration_minutes, description)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(logged_at)
    .bind(body.category)
    .bind(body.duration_minutes)
    .bind(&body.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(log))
}

pub async fn list_activity_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<LogWindowQuery>,
) -> AppResult<Json<Vec<ActivityLog>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = sqlx::query_as::<_, ActivityLog>(
        r#"
        SELECT * FROM activity_logs
        WHERE user_id = $1 AND logged_at::date BETWEEN $2 AND $3
        ORDER BY logged_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(logs))
}
