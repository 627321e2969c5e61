//! Per-plan report generation quota.
//!
//! The check-and-increment is a single SQL statement (upsert with a guarded
//! `DO UPDATE ... WHERE`), so two concurrent requests for the same user can
//! never both slip under the limit. Quota is consumed before any report
//! work starts: quota consumed implies work began, and a request the client
//! abandons mid-pipeline stays charged.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::PlanLimit;
use crate::error::{AppError, AppResult};

/// Current usage within a billing period, for quota UI.
#[derive(Debug, serde::Serialize)]
pub struct UsageSnapshot {
    pub period_start: NaiveDate,
    pub reports_generated: i32,
    /// Plan limit; `null` means unlimited.
    pub limit: PlanLimit,
}

/// Billing periods are calendar months; a new period starts a fresh
/// counter row rather than resetting an old one.
pub fn billing_period_start(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today)
}

/// Atomically consume one report generation, or fail with
/// [`AppError::QuotaExceeded`] without changing any state.
///
/// An unlimited plan bypasses the counter entirely.
pub async fn try_consume(db: &PgPool, user_id: Uuid, limit: PlanLimit) -> AppResult<()> {
    let Some(limit) = limit else {
        return Ok(());
    };

    if limit < 1 {
        return Err(AppError::QuotaExceeded { limit });
    }

    let period_start = billing_period_start(Utc::now().date_naive());

    // Single statement: the insert covers the first generation of the
    // period, the guarded update covers the rest. No row returned means
    // the guard failed and nothing was mutated.
    let consumed = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO report_usage (user_id, period_start, reports_generated)
        VALUES ($1, $2, 1)
        ON CONFLICT (user_id, period_start) DO UPDATE
            SET reports_generated = report_usage.reports_generated + 1,
                updated_at = NOW()
            WHERE report_usage.reports_generated < $3
        RETURNING reports_generated
        "#,
    )
    .bind(user_id)
    .bind(period_start)
    .bind(limit)
    .fetch_optional(db)
    .await?;

    match consumed {
        Some(used) => {
            tracing::debug!(user_id = %user_id, used = used, limit = limit, "Report quota consumed");
            Ok(())
        }
        None => {
            tracing::info!(user_id = %user_id, limit = limit, "Report quota exceeded");
            Err(AppError::QuotaExceeded { limit })
        }
    }
}

/// Read-only view of the current period's usage.
pub async fn current_usage(db: &PgPool, user_id: Uuid, limit: PlanLimit) -> AppResult<UsageSnapshot> {
    let period_start = billing_period_start(Utc::now().date_naive());

    let reports_generated = sqlx::query_scalar::<_, i32>(
        "SELECT reports_generated FROM report_usage WHERE user_id = $1 AND period_start = $2",
    )
    .bind(user_id)
    .bind(period_start)
    .fetch_optional(db)
    .await?
    .unwrap_or(0);

    Ok(UsageSnapshot {
        period_start,
        reports_generated,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_period_start_is_first_of_month() {
        let d = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap();
        assert_eq!(
            billing_period_start(d),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
    }

    #[test]
    fn test_billing_period_start_idempotent_on_first_day() {
        let d = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        assert_eq!(billing_period_start(d), d);
    }

    #[test]
    fn test_periods_differ_across_months() {
        let june = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let july = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_ne!(billing_period_start(june), billing_period_start(july));
    }
}
