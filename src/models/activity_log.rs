use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A logged activity. Immutable once created, same as mood logs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub category: ActivityCategory,
    /// Duration in minutes; aggregation treats a missing duration as 0.
    pub duration_minutes: Option<i32>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "activity_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Exercise,
    Work,
    Study,
    Social,
    Outdoors,
    Leisure,
    Chores,
    Mindfulness,
    Other,
}

impl ActivityCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Work => "work",
            Self::Study => "study",
            Self::Social => "social",
            Self::Outdoors => "outdoors",
            Self::Leisure => "leisure",
            Self::Chores => "chores",
            Self::Mindfulness => "mindfulness",
            Self::Other => "other",
        }
    }
}
