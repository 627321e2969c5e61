//! Overall score and wellbeing level derivation.

use crate::models::report::{Trend, WellbeingLevel};
use crate::services::aggregate::AggregateSnapshot;

/// Score reported when the window held no mood data: the neutral midpoint.
pub const NEUTRAL_SCORE: i32 = 50;

/// Trend adjustment applied on top of the mood base score.
const TREND_ADJUSTMENT: i32 = 5;

/// Stress starts costing points above this average level.
const STRESS_PIVOT: f64 = 5.0;

/// Points subtracted per point of average stress above the pivot.
const STRESS_WEIGHT: f64 = 2.0;

/// Derive the overall score (0–100) and level from the snapshot and trend.
///
/// Base = average mood × 10, nudged by trend (±5) and penalized for average
/// stress above 5 (2 points per point, so at most 10). The result is
/// clamped to [0, 100] so no input combination can escape the scale.
///
/// A window with no mood data scores [`NEUTRAL_SCORE`] at the `NoData`
/// level instead of failing; sparse logs must never abort a report.
pub fn score(snapshot: &AggregateSnapshot, trend: Trend) -> (i32, WellbeingLevel) {
    let Some(mood) = snapshot.mood.as_ref() else {
        return (NEUTRAL_SCORE, WellbeingLevel::NoData);
    };

    let base = (mood.average_score * 10.0).round() as i32;

    let trend_adj = match trend {
        Trend::Improving => TREND_ADJUSTMENT,
        Trend::Declining => -TREND_ADJUSTMENT,
        Trend::Stable => 0,
    };

    let stress_penalty = mood
        .stress
        .as_ref()
        .map(|s| {
            let over = (s.average - STRESS_PIVOT).max(0.0);
            (over * STRESS_WEIGHT).round() as i32
        })
        .unwrap_or(0);

    let overall = (base + trend_adj - stress_penalty).clamp(0, 100);
    (overall, level_for(overall))
}

/// Deterministic score bucket; lower bounds are inclusive.
pub fn level_for(score: i32) -> WellbeingLevel {
    match score {
        s if s >= 80 => WellbeingLevel::Excellent,
        s if s >= 60 => WellbeingLevel::Good,
        s if s >= 40 => WellbeingLevel::Moderate,
        _ => WellbeingLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood_log::MoodCategory;
    use crate::services::aggregate::{MoodSummary, StressSummary};

    fn snapshot_with(average_score: f64, stress_average: Option<f64>) -> AggregateSnapshot {
        AggregateSnapshot {
            mood: Some(MoodSummary {
                entry_count: 5,
                average_score,
                min_score: average_score.floor() as i32,
                max_score: average_score.ceil() as i32,
                dominant_category: MoodCategory::Neutral,
                stress: stress_average.map(|average| StressSummary {
                    entry_count: 5,
                    average,
                    min: average.floor() as i32,
                    max: average.ceil() as i32,
                }),
                sleep: None,
            }),
            activity: None,
        }
    }

    #[test]
    fn test_example_scenario_scores_good() {
        // Average mood 7.0, improving, no stress data: 70 + 5 = 75.
        let (score, level) = score(&snapshot_with(7.0, None), Trend::Improving);
        assert_eq!(score, 75);
        assert_eq!(level, WellbeingLevel::Good);
    }

    #[test]
    fn test_no_mood_data_scores_neutral_default() {
        let empty = AggregateSnapshot {
            mood: None,
            activity: None,
        };
        let (score, level) = score(&empty, Trend::Stable);
        assert_eq!(score, NEUTRAL_SCORE);
        assert_eq!(level, WellbeingLevel::NoData);
    }

    #[test]
    fn test_score_clamped_to_upper_bound() {
        let (score, level) = score(&snapshot_with(10.0, None), Trend::Improving);
        assert_eq!(score, 100);
        assert_eq!(level, WellbeingLevel::Excellent);
    }

    #[test]
    fn test_score_clamped_to_lower_bound() {
        // 10 - 5 - 10 would be -5 without clamping.
        let (score, level) = score(&snapshot_with(1.0, Some(10.0)), Trend::Declining);
        assert_eq!(score, 0);
        assert_eq!(level, WellbeingLevel::Low);
    }

    #[test]
    fn test_stress_above_pivot_subtracts() {
        // Average stress 8.0 is 3 over the pivot: penalty 6.
        let (with_high_stress, _) = score(&snapshot_with(8.0, Some(8.0)), Trend::Stable);
        assert_eq!(with_high_stress, 74);

        // Stress at or below the pivot costs nothing.
        let (calm, _) = score(&snapshot_with(8.0, Some(4.0)), Trend::Stable);
        assert_eq!(calm, 80);
    }

    #[test]
    fn test_trend_adjustments_are_symmetric() {
        let snapshot = snapshot_with(6.0, None);
        let (up, _) = score(&snapshot, Trend::Improving);
        let (flat, _) = score(&snapshot, Trend::Stable);
        let (down, _) = score(&snapshot, Trend::Declining);
        assert_eq!(up - flat, flat - down);
    }

    #[test]
    fn test_level_buckets_lower_bound_inclusive() {
        assert_eq!(level_for(0), WellbeingLevel::Low);
        assert_eq!(level_for(39), WellbeingLevel::Low);
        assert_eq!(level_for(40), WellbeingLevel::Moderate);
        assert_eq!(level_for(59), WellbeingLevel::Moderate);
        assert_eq!(level_for(60), WellbeingLevel::Good);
        assert_eq!(level_for(79), WellbeingLevel::Good);
        assert_eq!(level_for(80), WellbeingLevel::Excellent);
        assert_eq!(level_for(100), WellbeingLevel::Excellent);
    }
}
