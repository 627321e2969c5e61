use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateMoodLogRequest, LogWindowQuery};
use crate::error::{AppError, AppResult};
use crate::models::mood_log::MoodLog;
use crate::AppState;

/// Mood logs are write-once: there is no update endpoint, and the insights
/// engine treats them as an immutable input stream.
pub async fn create_mood_log(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodLogRequest>,
) -> AppResult<Json<MoodLog>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let logged_at = body.logged_at.unwrap_or_else(Utc::now);

    let log = sqlx::query_as::<_, MoodLog>(
        r#"
        INSERT INTO mood_logs (id, user_id, logged_at, category, score, stress_level, sleep_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(logged_at)
    .bind(body.category)
    .bind(body.score)
    .bind(body.stress_level)
    .bind(body.sleep_hours)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(log))
}

pub async fn list_mood_logs(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<LogWindowQuery>,
) -> AppResult<Json<Vec<MoodLog>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let logs = sqlx::query_as::<_, MoodLog>(
        r#"
        SELECT * FROM mood_logs
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
