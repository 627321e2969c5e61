//! Rule-based recommendation engine.
//!
//! A declarative table of (predicate, payload, priority) entries, evaluated
//! in declaration order. Every matching rule fires; when nothing matches, a
//! single "keep it up" recommendation keeps the list non-empty.

use crate::models::report::{Priority, Recommendation};
use crate::services::aggregate::AggregateSnapshot;

struct Rule {
    matches: fn(&AggregateSnapshot, i32) -> bool,
    title: &'static str,
    description: &'static str,
    priority: Priority,
}

const RULES: &[Rule] = &[
    Rule {
        matches: |s, _| {
            s.mood
                .as_ref()
                .and_then(|m| m.stress.as_ref())
                .is_some_and(|stress| stress.average > 6.0)
        },
        title: "Manage Stress",
        description: "Your average stress level has been high. Try a short daily wind-down \
                      routine — a walk, breathing exercises, or time away from screens.",
        priority: Priority::High,
    },
    Rule {
        matches: |s, _| s.mood.as_ref().is_some_and(|m| m.average_score < 5.0),
        title: "Be Kind to Yourself",
        description: "Your mood has been running low. Consider reaching out to someone you \
                      trust, and make room for one small thing you enjoy each day.",
        priority: Priority::High,
    },
    Rule {
        matches: |_, score| score < 40,
        title: "Take It One Day at a Time",
        description: "Your overall wellbeing score is low for this period. Small, consistent \
                      routines help more than big overhauls — pick one habit to anchor your day.",
        priority: Priority::High,
    },
    Rule {
        matches: |s, _| s.activity_minutes() < 60 && s.activity_entries() < 3,
        title: "Increase Activity",
        description: "You logged less than an hour of activity this period. Even a 20-minute \
                      walk a few times a week gives mood a measurable lift.",
        priority: Priority::Medium,
    },
    Rule {
        matches: |s, _| {
            s.mood
                .as_ref()
                .and_then(|m| m.sleep.as_ref())
                .is_some_and(|sleep| sleep.average_hours < 7.0)
        },
        title: "Prioritize Sleep",
        description: "You averaged under 7 hours of sleep. A consistent bedtime and a \
                      screen-free last hour are the highest-leverage changes.",
        priority: Priority::Medium,
    },
    Rule {
        matches: |s, _| s.mood.is_none(),
        title: "Build a Logging Habit",
        description: "There were no mood check-ins this period. Logging once a day, even \
                      briefly, is what makes these reports useful.",
        priority: Priority::Medium,
    },
];

/// Evaluate the rule table against the snapshot and overall score.
pub fn recommend(snapshot: &AggregateSnapshot, overall_score: i32) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = RULES
        .iter()
        .filter(|rule| (rule.matches)(snapshot, overall_score))
        .map(|rule| Recommendation {
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            priority: rule.priority,
        })
        .collect();

    if out.is_empty() {
        out.push(Recommendation {
            title: "Keep It Up".to_string(),
            description: "Your mood, activity, and rest are all in a healthy range. Keep \
                          doing what you're doing."
                .to_string(),
            priority: Priority::Low,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood_log::MoodCategory;
    use crate::services::aggregate::{
        ActivitySummary, CategoryCount, MoodSummary, SleepSummary, StressSummary,
    };
    use crate::models::activity_log::ActivityCategory;

    fn healthy_snapshot() -> AggregateSnapshot {
        AggregateSnapshot {
            mood: Some(MoodSummary {
                entry_count: 7,
                average_score: 8.0,
                min_score: 7,
                max_score: 9,
                dominant_category: MoodCategory::Happy,
                stress: Some(StressSummary {
                    entry_count: 7,
                    average: 3.0,
                    min: 2,
                    max: 4,
                }),
                sleep: Some(SleepSummary {
                    entry_count: 7,
                    average_hours: 7.5,
                    min_hours: 7.0,
                    max_hours: 8.5,
                }),
            }),
            activity: Some(ActivitySummary {
                entry_count: 5,
                total_minutes: 240,
                dominant_category: ActivityCategory::Exercise,
                by_category: vec![CategoryCount {
                    category: ActivityCategory::Exercise,
                    entry_count: 5,
                    total_minutes: 240,
                }],
            }),
        }
    }

    #[test]
    fn test_healthy_snapshot_gets_default_recommendation() {
        let recs = recommend(&healthy_snapshot(), 85);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].title, "Keep It Up");
        assert_eq!(recs[0].priority, Priority::Low);
    }

    #[test]
    fn test_high_stress_fires_high_priority() {
        let mut snapshot = healthy_snapshot();
        snapshot.mood.as_mut().unwrap().stress.as_mut().unwrap().average = 7.5;
        let recs = recommend(&snapshot, 70);
        let stress = recs.iter().find(|r| r.title == "Manage Stress").unwrap();
        assert_eq!(stress.priority, Priority::High);
    }

    #[test]
    fn test_low_activity_fires_medium_priority() {
        // One 30-minute exercise entry: under an hour total and fewer
        // than three entries.
        let mut snapshot = healthy_snapshot();
        snapshot.activity = Some(ActivitySummary {
            entry_count: 1,
            total_minutes: 30,
            dominant_category: ActivityCategory::Exercise,
            by_category: vec![CategoryCount {
                category: ActivityCategory::Exercise,
                entry_count: 1,
                total_minutes: 30,
            }],
        });
        let recs = recommend(&snapshot, 75);
        let rec = recs.iter().find(|r| r.title == "Increase Activity").unwrap();
        assert_eq!(rec.priority, Priority::Medium);
    }

    #[test]
    fn test_all_matching_rules_fire_in_declared_order() {
        let snapshot = AggregateSnapshot {
            mood: Some(MoodSummary {
                entry_count: 4,
                average_score: 3.5,
                min_score: 2,
                max_score: 5,
                dominant_category: MoodCategory::Sad,
                stress: Some(StressSummary {
                    entry_count: 4,
                    average: 8.0,
                    min: 7,
                    max: 9,
                }),
                sleep: Some(SleepSummary {
                    entry_count: 4,
                    average_hours: 5.0,
                    min_hours: 4.0,
                    max_hours: 6.0,
                }),
            }),
            activity: None,
        };
        let titles: Vec<_> = recommend(&snapshot, 20)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(
            titles,
            vec![
                "Manage Stress",
                "Be Kind to Yourself",
                "Take It One Day at a Time",
                "Increase Activity",
                "Prioritize Sleep",
            ]
        );
    }

    #[test]
    fn test_empty_window_suggests_logging() {
        let snapshot = AggregateSnapshot {
            mood: None,
            activity: None,
        };
        let recs = recommend(&snapshot, 50);
        assert!(recs.iter().any(|r| r.title == "Build a Logging Habit"));
        assert!(recs.iter().any(|r| r.title == "Increase Activity"));
    }
}
