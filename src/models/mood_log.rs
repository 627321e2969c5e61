use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single mood check-in. Immutable once created: there is no update
/// endpoint, and the insights engine only ever reads these rows.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub category: MoodCategory,
    /// 1 (worst) to 10 (best).
    pub score: i32,
    /// 1 (relaxed) to 10 (overwhelmed), when the user chose to record it.
    pub stress_level: Option<i32>,
    /// Hours slept the previous night, when recorded.
    pub sleep_hours: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "mood_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Calm,
    Energized,
    Neutral,
    Tired,
    Anxious,
    Sad,
    Irritable,
}

impl MoodCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Energized => "energized",
            Self::Neutral => "neutral",
            Self::Tired => "tired",
            Self::Anxious => "anxious",
            Self::Sad => "sad",
            Self::Irritable => "irritable",
        }
    }
}
