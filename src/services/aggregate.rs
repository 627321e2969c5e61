//! Statistical aggregation over a window of mood and activity logs.
//!
//! Everything here is a pure function of the input slices: no clock, no
//! randomness, no I/O. Identical input (content and order) produces an
//! identical snapshot, which report reproducibility tests rely on.

use crate::models::activity_log::{ActivityCategory, ActivityLog};
use crate::models::mood_log::{MoodCategory, MoodLog};

/// Ephemeral summary of a user's logs over a report window. Computed fresh
/// on every request and never persisted on its own.
///
/// `None` fields mean "no data in the window"; callers must not conflate
/// that with a summary whose values happen to be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSnapshot {
    pub mood: Option<MoodSummary>,
    pub activity: Option<ActivitySummary>,
}

impl AggregateSnapshot {
    /// Total activity minutes, treating "no activity data" as zero minutes.
    /// Recommendation rules use this to nudge inactive users.
    pub fn activity_minutes(&self) -> i64 {
        self.activity.as_ref().map(|a| a.total_minutes).unwrap_or(0)
    }

    pub fn activity_entries(&self) -> i64 {
        self.activity.as_ref().map(|a| a.entry_count).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoodSummary {
    pub entry_count: i64,
    pub average_score: f64,
    pub min_score: i32,
    pub max_score: i32,
    /// Most common mood category; ties broken by first appearance in the
    /// input sequence.
    pub dominant_category: MoodCategory,
    /// Present only if at least one entry recorded a stress level.
    pub stress: Option<StressSummary>,
    /// Present only if at least one entry recorded sleep hours.
    pub sleep: Option<SleepSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StressSummary {
    pub entry_count: i64,
    pub average: f64,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleepSummary {
    pub entry_count: i64,
    pub average_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivitySummary {
    pub entry_count: i64,
    /// Sum of durations; entries with no duration count as 0 minutes.
    pub total_minutes: i64,
    /// Category with the most entries; ties broken by first appearance.
    pub dominant_category: ActivityCategory,
    /// Per-category breakdown, in first-seen order.
    pub by_category: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub category: ActivityCategory,
    pub entry_count: i64,
    pub total_minutes: i64,
}

/// Reduce the window's logs into an [`AggregateSnapshot`].
pub fn aggregate(moods: &[MoodLog], activities: &[ActivityLog]) -> AggregateSnapshot {
    AggregateSnapshot {
        mood: summarize_moods(moods),
        activity: summarize_activities(activities),
    }
}

fn summarize_moods(moods: &[MoodLog]) -> Option<MoodSummary> {
    if moods.is_empty() {
        return None;
    }

    let mut score_sum = 0i64;
    let mut min_score = i32::MAX;
    let mut max_score = i32::MIN;
    for m in moods {
        score_sum += m.score as i64;
        min_score = min_score.min(m.score);
        max_score = max_score.max(m.score);
    }

    // Averages over optional fields only count entries that carry the field.
    let mut stress: Option<StressSummary> = None;
    let mut stress_sum = 0i64;
    for m in moods {
        let Some(level) = m.stress_level else { continue };
        stress_sum += level as i64;
        let s = stress.get_or_insert(StressSummary {
            entry_count: 0,
            average: 0.0,
            min: level,
            max: level,
        });
        s.entry_count += 1;
        s.min = s.min.min(level);
        s.max = s.max.max(level);
    }
    if let Some(s) = stress.as_mut() {
        s.average = stress_sum as f64 / s.entry_count as f64;
    }

    let mut sleep: Option<SleepSummary> = None;
    let mut sleep_sum = 0.0f64;
    for m in moods {
        let Some(hours) = m.sleep_hours else { continue };
        sleep_sum += hours;
        let s = sleep.get_or_insert(SleepSummary {
            entry_count: 0,
            average_hours: 0.0,
            min_hours: hours,
            max_hours: hours,
        });
        s.entry_count += 1;
        s.min_hours = s.min_hours.min(hours);
        s.max_hours = s.max_hours.max(hours);
    }
    if let Some(s) = sleep.as_mut() {
        s.average_hours = sleep_sum / s.entry_count as f64;
    }

    let dominant_category = dominant(moods.iter().map(|m| m.category))?;

    Some(MoodSummary {
        entry_count: moods.len() as i64,
        average_score: score_sum as f64 / moods.len() as f64,
        min_score,
        max_score,
        dominant_category,
        stress,
        sleep,
    })
}

fn summarize_activities(activities: &[ActivityLog]) -> Option<ActivitySummary> {
    if activities.is_empty() {
        return None;
    }

    // First-seen order keeps the breakdown stable across identical inputs.
    let mut by_category: Vec<CategoryCount> = Vec::new();
    let mut total_minutes = 0i64;
    for a in activities {
        let minutes = a.duration_minutes.unwrap_or(0) as i64;
        total_minutes += minutes;
        match by_category.iter_mut().find(|c| c.category == a.category) {
            Some(c) => {
                c.entry_count += 1;
                c.total_minutes += minutes;
            }
            None => by_category.push(CategoryCount {
                category: a.category,
                entry_count: 1,
                total_minutes: minutes,
            }),
        }
    }

    let dominant_category = dominant(activities.iter().map(|a| a.category))?;

    Some(ActivitySummary {
        entry_count: activities.len() as i64,
        total_minutes,
        dominant_category,
        by_category,
    })
}

/// Most frequent item; ties resolved in favor of the item seen first.
fn dominant<T: PartialEq + Copy>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(t, _)| *t == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    // counts is in first-seen order, so only a strictly greater count may
    // displace the current best.
    let mut best: Option<(T, usize)> = None;
    for (item, n) in counts {
        if best.map_or(true, |(_, best_n)| n > best_n) {
            best = Some((item, n));
        }
    }
    best.map(|(t, _)| t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn mood(score: i32, category: MoodCategory) -> MoodLog {
        mood_full(score, category, None, None)
    }

    fn mood_full(
        score: i32,
        category: MoodCategory,
        stress_level: Option<i32>,
        sleep_hours: Option<f64>,
    ) -> MoodLog {
        MoodLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            logged_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
            category,
            score,
            stress_level,
            sleep_hours,
            created_at: Utc::now(),
        }
    }

    fn activity(category: ActivityCategory, duration_minutes: Option<i32>) -> ActivityLog {
        ActivityLog {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            logged_at: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            category,
            duration_minutes,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_window_has_no_summaries() {
        let snapshot = aggregate(&[], &[]);
        assert!(snapshot.mood.is_none());
        assert!(snapshot.activity.is_none());
        assert_eq!(snapshot.activity_minutes(), 0);
    }

    #[test]
    fn test_average_mood_in_valid_range() {
        let moods: Vec<_> = (1..=10)
            .map(|s| mood(s, MoodCategory::Neutral))
            .collect();
        let summary = aggregate(&moods, &[]).mood.unwrap();
        assert!(summary.average_score >= 1.0 && summary.average_score <= 10.0);
        assert_eq!(summary.min_score, 1);
        assert_eq!(summary.max_score, 10);
    }

    #[test]
    fn test_stress_average_excludes_entries_without_stress() {
        let moods = vec![
            mood_full(7, MoodCategory::Happy, Some(8), None),
            mood_full(7, MoodCategory::Happy, None, None),
            mood_full(7, MoodCategory::Happy, Some(4), None),
        ];
        let stress = aggregate(&moods, &[]).mood.unwrap().stress.unwrap();
        // Mean of 8 and 4; the entry without stress is not counted as 0.
        assert_eq!(stress.entry_count, 2);
        assert_eq!(stress.average, 6.0);
        assert_eq!(stress.min, 4);
        assert_eq!(stress.max, 8);
    }

    #[test]
    fn test_no_stress_entries_means_absent_not_zero() {
        let moods = vec![mood(5, MoodCategory::Calm)];
        let summary = aggregate(&moods, &[]).mood.unwrap();
        assert!(summary.stress.is_none());
        assert!(summary.sleep.is_none());
    }

    #[test]
    fn test_sleep_extrema() {
        let moods = vec![
            mood_full(6, MoodCategory::Tired, None, Some(5.5)),
            mood_full(6, MoodCategory::Tired, None, Some(8.0)),
        ];
        let sleep = aggregate(&moods, &[]).mood.unwrap().sleep.unwrap();
        assert_eq!(sleep.average_hours, 6.75);
        assert_eq!(sleep.min_hours, 5.5);
        assert_eq!(sleep.max_hours, 8.0);
    }

    #[test]
    fn test_dominant_mood_tie_broken_by_first_seen() {
        let moods = vec![
            mood(5, MoodCategory::Anxious),
            mood(5, MoodCategory::Happy),
            mood(5, MoodCategory::Happy),
            mood(5, MoodCategory::Anxious),
        ];
        let summary = aggregate(&moods, &[]).mood.unwrap();
        assert_eq!(summary.dominant_category, MoodCategory::Anxious);
    }

    #[test]
    fn test_missing_duration_counts_as_zero_minutes() {
        let activities = vec![
            activity(ActivityCategory::Exercise, Some(30)),
            activity(ActivityCategory::Exercise, None),
        ];
        let summary = aggregate(&[], &activities).activity.unwrap();
        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.total_minutes, 30);
    }

    #[test]
    fn test_category_breakdown_in_first_seen_order() {
        let activities = vec![
            activity(ActivityCategory::Work, Some(120)),
            activity(ActivityCategory::Exercise, Some(30)),
            activity(ActivityCategory::Work, Some(60)),
        ];
        let summary = aggregate(&[], &activities).activity.unwrap();
        assert_eq!(summary.dominant_category, ActivityCategory::Work);
        assert_eq!(summary.by_category.len(), 2);
        assert_eq!(summary.by_category[0].category, ActivityCategory::Work);
        assert_eq!(summary.by_category[0].total_minutes, 180);
        assert_eq!(summary.by_category[1].category, ActivityCategory::Exercise);
        assert_eq!(summary.by_category[1].entry_count, 1);
    }

    #[test]
    fn test_deterministic_for_identical_input() {
        let moods = vec![
            mood_full(6, MoodCategory::Calm, Some(3), Some(7.0)),
            mood_full(8, MoodCategory::Happy, Some(5), None),
        ];
        let activities = vec![activity(ActivityCategory::Social, Some(45))];
        assert_eq!(
            aggregate(&moods, &activities),
            aggregate(&moods, &activities)
        );
    }

    #[test]
    fn test_reordering_preserves_numeric_fields() {
        let a = vec![
            mood_full(4, MoodCategory::Sad, Some(7), Some(6.0)),
            mood_full(9, MoodCategory::Happy, Some(2), Some(8.0)),
        ];
        let b: Vec<_> = a.iter().rev().cloned().collect();
        let sa = aggregate(&a, &[]).mood.unwrap();
        let sb = aggregate(&b, &[]).mood.unwrap();
        assert_eq!(sa.average_score, sb.average_score);
        assert_eq!(sa.min_score, sb.min_score);
        assert_eq!(sa.max_score, sb.max_score);
        assert_eq!(sa.stress, sb.stress);
        assert_eq!(sa.sleep, sb.sleep);
    }
}
