//! Serialize a persisted report into a portable, self-contained HTML
//! document. Pure function of the report with no shared state; callers can
//! render the same report any number of times.

use crate::models::report::WellbeingReport;

/// Render the report as a standalone HTML page.
pub fn render_html(report: &WellbeingReport) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>Wellbeing Report {} — {}</title>\n",
        report.period_start, report.period_end
    ));
    html.push_str(
        "<style>\n\
         body { font-family: -apple-system, 'Segoe UI', sans-serif; margin: 2rem auto; max-width: 640px; color: #1a202c; }\n\
         h1 { font-size: 1.4rem; }\n\
         .badge { display: inline-block; padding: 0.2rem 0.7rem; border-radius: 999px; background: #edf2f7; font-weight: 600; }\n\
         .score { font-size: 2.5rem; font-weight: 700; }\n\
         table { border-collapse: collapse; width: 100%; margin: 0.5rem 0 1.5rem; }\n\
         th, td { text-align: left; padding: 0.35rem 0.6rem; border-bottom: 1px solid #e2e8f0; }\n\
         th { font-size: 0.8rem; text-transform: uppercase; color: #718096; }\n\
         </style>\n</head>\n<body>\n",
    );

    html.push_str(&format!(
        "<h1>Wellbeing Report</h1>\n<p>{} to {}</p>\n",
        report.period_start, report.period_end
    ));
    html.push_str(&format!(
        "<p><span class=\"score\">{}</span>/100 <span class=\"badge\">{}</span></p>\n",
        report.overall_score,
        escape(report.wellbeing_level.label())
    ));
    html.push_str(&format!("<p>{}</p>\n", escape(&report.summary)));

    if let Some(mood) = report.mood_analysis.as_ref() {
        html.push_str("<h2>Mood</h2>\n<table>\n");
        html.push_str("<tr><th>Check-ins</th><th>Average</th><th>Min</th><th>Max</th><th>Most common</th><th>Trend</th></tr>\n");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            mood.entry_count,
            mood.average_score,
            mood.min_score,
            mood.max_score,
            mood.dominant_category.label(),
            mood.trend.label()
        ));
        html.push_str("</table>\n");
    }

    if let Some(activity) = report.activity_analysis.as_ref() {
        html.push_str("<h2>Activity</h2>\n<table>\n");
        html.push_str("<tr><th>Category</th><th>Entries</th><th>Minutes</th></tr>\n");
        for row in &activity.by_category {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                row.category.label(),
                row.entry_count,
                row.total_minutes
            ));
        }
        html.push_str(&format!(
            "<tr><td><strong>Total</strong></td><td>{}</td><td>{}</td></tr>\n",
            activity.entry_count, activity.total_minutes
        ));
        html.push_str("</table>\n");
    }

    if let Some(sleep) = report.sleep_analysis.as_ref() {
        html.push_str("<h2>Sleep</h2>\n<table>\n");
        html.push_str("<tr><th>Nights recorded</th><th>Average hours</th><th>Min</th><th>Max</th></tr>\n");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>\n",
            sleep.entry_count, sleep.average_hours, sleep.min_hours, sleep.max_hours
        ));
        html.push_str("</table>\n");
    }

    if let Some(stress) = report.stress_analysis.as_ref() {
        html.push_str("<h2>Stress</h2>\n<table>\n");
        html.push_str("<tr><th>Entries</th><th>Average</th><th>Min</th><th>Max</th></tr>\n");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.1}</td><td>{}</td><td>{}</td></tr>\n",
            stress.entry_count, stress.average_level, stress.min_level, stress.max_level
        ));
        html.push_str("</table>\n");
    }

    html.push_str("<h2>Recommendations</h2>\n<table>\n");
    html.push_str("<tr><th>Priority</th><th>Suggestion</th><th>Detail</th></tr>\n");
    for rec in report.recommendations.iter() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            rec.priority.label(),
            escape(&rec.title),
            escape(&rec.description)
        ));
    }
    html.push_str("</table>\n");

    html.push_str(&format!(
        "<p><small>Generated {} · source: {:?}</small></p>\n</body>\n</html>\n",
        report.created_at.format("%Y-%m-%d %H:%M UTC"),
        report.generated_by
    ));

    html
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood_log::MoodCategory;
    use crate::models::report::{
        MoodAnalysis, Priority, Recommendation, ReportSource, Trend, WellbeingLevel,
    };
    use chrono::{NaiveDate, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn report(mood_analysis: Option<MoodAnalysis>, summary: &str) -> WellbeingReport {
        WellbeingReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            period_start: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2025, 6, 7).unwrap(),
            overall_score: 75,
            wellbeing_level: WellbeingLevel::Good,
            summary: summary.to_string(),
            generated_by: ReportSource::Fallback,
            recommendations: Json(vec![Recommendation {
                title: "Keep It Up".into(),
                description: "All in a healthy range.".into(),
                priority: Priority::Low,
            }]),
            mood_analysis: mood_analysis.map(Json),
            activity_analysis: None,
            sleep_analysis: None,
            stress_analysis: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_renders_score_level_and_summary() {
        let html = render_html(&report(None, "A steady week."));
        assert!(html.contains("75"));
        assert!(html.contains("Good"));
        assert!(html.contains("A steady week."));
        assert!(html.contains("2025-06-01"));
    }

    #[test]
    fn test_absent_sections_are_omitted() {
        let html = render_html(&report(None, "No data."));
        assert!(!html.contains("<h2>Mood</h2>"));
        assert!(!html.contains("<h2>Activity</h2>"));
        assert!(!html.contains("<h2>Sleep</h2>"));
        assert!(!html.contains("<h2>Stress</h2>"));
        // Recommendations are always present.
        assert!(html.contains("<h2>Recommendations</h2>"));
    }

    #[test]
    fn test_present_mood_section_is_rendered() {
        let html = render_html(&report(
            Some(MoodAnalysis {
                entry_count: 5,
                average_score: 7.0,
                min_score: 6,
                max_score: 8,
                dominant_category: MoodCategory::Happy,
                trend: Trend::Improving,
            }),
            "ok",
        ));
        assert!(html.contains("<h2>Mood</h2>"));
        assert!(html.contains("happy"));
        assert!(html.contains("improving"));
    }

    #[test]
    fn test_summary_is_html_escaped() {
        let html = render_html(&report(None, "<script>alert('x')</script>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
