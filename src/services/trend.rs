//! Mood trend classification: recent check-ins versus the earlier window.

use crate::models::mood_log::MoodLog;
use crate::models::report::Trend;

/// Minimum difference between recent and earlier mean mood score (on the
/// 1–10 scale) before the trend is called anything other than stable.
const TREND_THRESHOLD: f64 = 0.5;

/// How many of the latest entries form the "recent" window.
const RECENT_WINDOW: usize = 3;

/// Classify the mood trajectory of a time-ordered sequence (oldest first).
///
/// The recent window is the last `min(3, n - 1)` entries, so the earlier
/// window always keeps at least one entry. Fewer than 3 entries total is
/// not enough signal and always classifies as stable.
pub fn classify(moods: &[MoodLog]) -> Trend {
    if moods.len() < 3 {
        return Trend::Stable;
    }

    let recent_len = RECENT_WINDOW.min(moods.len() - 1);
    let split = moods.len() - recent_len;
    let earlier_mean = mean_score(&moods[..split]);
    let recent_mean = mean_score(&moods[split..]);

    let diff = recent_mean - earlier_mean;
    if diff > TREND_THRESHOLD {
        Trend::Improving
    } else if diff < -TREND_THRESHOLD {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

fn mean_score(moods: &[MoodLog]) -> f64 {
    let sum: i64 = moods.iter().map(|m| m.score as i64).sum();
    sum as f64 / moods.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood_log::MoodCategory;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn moods(scores: &[i32]) -> Vec<MoodLog> {
        let start = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| MoodLog {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                logged_at: start + Duration::days(i as i64),
                category: MoodCategory::Neutral,
                score,
                stress_level: None,
                sleep_hours: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn test_fewer_than_three_entries_is_stable() {
        assert_eq!(classify(&moods(&[])), Trend::Stable);
        assert_eq!(classify(&moods(&[2])), Trend::Stable);
        assert_eq!(classify(&moods(&[2, 9])), Trend::Stable);
    }

    #[test]
    fn test_improving_over_five_days() {
        // Recent mean (7+8+8)/3 = 7.67 vs earlier (6+6)/2 = 6.0, diff > 0.5.
        assert_eq!(classify(&moods(&[6, 6, 7, 8, 8])), Trend::Improving);
    }

    #[test]
    fn test_declining() {
        assert_eq!(classify(&moods(&[8, 8, 8, 4, 4, 3])), Trend::Declining);
    }

    #[test]
    fn test_within_threshold_is_stable() {
        // Recent mean 6.33 vs earlier 6.0: diff 0.33 <= 0.5.
        assert_eq!(classify(&moods(&[6, 6, 6, 6, 7])), Trend::Stable);
    }

    #[test]
    fn test_three_entries_keeps_one_earlier() {
        // Recent window shrinks to 2 so the earlier window is non-empty:
        // recent (9+9)/2 = 9.0 vs earlier 5.0.
        assert_eq!(classify(&moods(&[5, 9, 9])), Trend::Improving);
    }
}
