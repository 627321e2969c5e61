//! Narrative summary generation, polymorphic over two backends: the Claude
//! Messages API and a deterministic template renderer.
//!
//! The composition rule lives in [`NarrativeGenerator`]: try the generative
//! backend once (bounded by the configured timeout), and on any failure
//! (transport error, non-2xx, empty or malformed response) fall back to the
//! template synchronously. Backend failures never reach the caller; they
//! only show up in the report's `generated_by` tag.

use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::models::report::{Recommendation, ReportSource, Trend, WellbeingLevel};
use crate::services::aggregate::AggregateSnapshot;

/// Everything a backend may reference when writing the summary.
pub struct NarrativeInput<'a> {
    pub snapshot: &'a AggregateSnapshot,
    pub trend: Trend,
    pub overall_score: i32,
    pub level: WellbeingLevel,
    pub recommendations: &'a [Recommendation],
}

pub struct Narrative {
    pub text: String,
    pub source: ReportSource,
}

/// Contract shared by both backends: produce a one-paragraph summary that
/// references the overall score and at least one aggregate, so consumers
/// never need to special-case which backend ran.
pub trait NarrativeBackend {
    fn source(&self) -> ReportSource;
    fn generate(
        &self,
        input: &NarrativeInput<'_>,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}

pub struct NarrativeGenerator {
    primary: Option<ClaudeNarrative>,
    fallback: TemplateNarrative,
}

impl NarrativeGenerator {
    pub fn from_config(config: &Config) -> Self {
        let primary = if config.claude_api_key.is_empty() {
            tracing::info!("CLAUDE_API_KEY not set — narratives will use the template backend");
            None
        } else {
            match ClaudeNarrative::from_config(config) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to build Claude client, narratives will use the template backend");
                    None
                }
            }
        };
        Self {
            primary,
            fallback: TemplateNarrative,
        }
    }

    /// Generate a summary. Infallible by design: any generative failure
    /// degrades to the template backend for the same request.
    pub async fn generate(&self, input: &NarrativeInput<'_>) -> Narrative {
        generate_with(self.primary.as_ref(), &self.fallback, input).await
    }
}

/// Try `primary` once, fall back to the template on any failure.
async fn generate_with<B: NarrativeBackend + Sync>(
    primary: Option<&B>,
    fallback: &TemplateNarrative,
    input: &NarrativeInput<'_>,
) -> Narrative {
    if let Some(backend) = primary {
        match backend.generate(input).await {
            Ok(text) if !text.trim().is_empty() => {
                return Narrative {
                    text,
                    source: backend.source(),
                };
            }
            Ok(_) => {
                tracing::warn!("Narrative backend returned empty text, using fallback");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Narrative backend unavailable, using fallback");
            }
        }
    }

    Narrative {
        text: fallback.render(input),
        source: fallback.source(),
    }
}

/// Generative backend: one Claude Messages call per report, no retries.
pub struct ClaudeNarrative {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ClaudeNarrative {
    fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.narrative_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_url: config.claude_api_url.clone(),
            api_key: config.claude_api_key.clone(),
            model: config.claude_model.clone(),
        })
    }

    fn build_prompt(input: &NarrativeInput<'_>) -> String {
        let mut lines = vec![
            format!(
                "Overall wellbeing score: {}/100 ({})",
                input.overall_score,
                input.level.label()
            ),
        ];

        if let Some(mood) = input.snapshot.mood.as_ref() {
            lines.push(format!(
                "Mood: average {:.1}/10 over {} check-ins, most often \"{}\", trend {}",
                mood.average_score,
                mood.entry_count,
                mood.dominant_category.label(),
                input.trend.label(),
            ));
            if let Some(stress) = mood.stress.as_ref() {
                lines.push(format!("Stress: average {:.1}/10", stress.average));
            }
            if let Some(sleep) = mood.sleep.as_ref() {
                lines.push(format!("Sleep: average {:.1} hours", sleep.average_hours));
            }
        } else {
            lines.push("Mood: no check-ins logged this period".to_string());
        }

        match input.snapshot.activity.as_ref() {
            Some(activity) => lines.push(format!(
                "Activity: {} entries, {} minutes total, mostly \"{}\"",
                activity.entry_count,
                activity.total_minutes,
                activity.dominant_category.label(),
            )),
            None => lines.push("Activity: none logged this period".to_string()),
        }

        if !input.recommendations.is_empty() {
            let titles: Vec<&str> = input
                .recommendations
                .iter()
                .map(|r| r.title.as_str())
                .collect();
            lines.push(format!("Suggestions already shown: {}", titles.join("; ")));
        }

        format!(
            r#"You are a supportive wellbeing coach. Write a single-paragraph summary (3-5 sentences) of this user's wellbeing for the reporting period, in the second person. Reference the overall score and at least one of the statistics. Do not give medical advice or diagnoses. Plain text only — no lists, headers, or markdown.

{}"#,
            lines.join("\n")
        )
    }
}

impl NarrativeBackend for ClaudeNarrative {
    fn source(&self) -> ReportSource {
        ReportSource::Ai
    }

    async fn generate(&self, input: &NarrativeInput<'_>) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": 512,
                "messages": [{
                    "role": "user",
                    "content": Self::build_prompt(input)
                }]
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Claude API error {}: {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        let text = body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("No text content in Claude response"))?;

        Ok(text.trim().to_string())
    }
}

/// Deterministic backend: template sentences keyed off the score and the
/// salient aggregates. Fully offline; byte-identical output for identical
/// input.
pub struct TemplateNarrative;

impl TemplateNarrative {
    pub fn render(&self, input: &NarrativeInput<'_>) -> String {
        let Some(mood) = input.snapshot.mood.as_ref() else {
            return format!(
                "We didn't find any mood check-ins for this period, so this report uses a \
                 neutral baseline score of {} out of 100. Start logging your mood and \
                 activities each day to unlock personalized insights in your next report.",
                input.overall_score
            );
        };

        let mut sentences = vec![format!(
            "Your average mood score was {:.1}/10 across {} check-ins, most often feeling {}.",
            mood.average_score,
            mood.entry_count,
            mood.dominant_category.label()
        )];

        sentences.push(
            match input.trend {
                Trend::Improving => {
                    "Your mood has been improving recently — keep that momentum going."
                }
                Trend::Declining => {
                    "Your mood has dipped recently compared to earlier in the period."
                }
                Trend::Stable => "Your mood held steady across the period.",
            }
            .to_string(),
        );

        if let Some(stress) = mood.stress.as_ref() {
            if stress.average > 6.0 {
                sentences.push(format!(
                    "Average stress came in at {:.1}/10, which is on the high side.",
                    stress.average
                ));
            } else {
                sentences.push(format!(
                    "Average stress stayed manageable at {:.1}/10.",
                    stress.average
                ));
            }
        }

        if let Some(sleep) = mood.sleep.as_ref() {
            sentences.push(format!(
                "You averaged {:.1} hours of sleep.",
                sleep.average_hours
            ));
        }

        match input.snapshot.activity.as_ref() {
            Some(activity) => sentences.push(format!(
                "You logged {} activities totalling {} minutes, mostly {}.",
                activity.entry_count,
                activity.total_minutes,
                activity.dominant_category.label()
            )),
            None => sentences.push("No activities were logged this period.".to_string()),
        }

        sentences.push(format!(
            "Overall, your wellbeing score is {} out of 100 — {}.",
            input.overall_score,
            input.level.label().to_lowercase()
        ));

        if let Some(top) = input.recommendations.first() {
            sentences.push(format!("Top suggestion: {}.", top.title));
        }

        sentences.join(" ")
    }
}

impl NarrativeBackend for TemplateNarrative {
    fn source(&self) -> ReportSource {
        ReportSource::Fallback
    }

    async fn generate(&self, input: &NarrativeInput<'_>) -> anyhow::Result<String> {
        Ok(self.render(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood_log::MoodCategory;
    use crate::models::report::Priority;
    use crate::services::aggregate::{MoodSummary, StressSummary};

    fn snapshot() -> AggregateSnapshot {
        AggregateSnapshot {
            mood: Some(MoodSummary {
                entry_count: 5,
                average_score: 7.0,
                min_score: 6,
                max_score: 8,
                dominant_category: MoodCategory::Happy,
                stress: Some(StressSummary {
                    entry_count: 5,
                    average: 4.0,
                    min: 3,
                    max: 5,
                }),
                sleep: None,
            }),
            activity: None,
        }
    }

    fn recommendations() -> Vec<Recommendation> {
        vec![Recommendation {
            title: "Increase Activity".into(),
            description: "Move more.".into(),
            priority: Priority::Medium,
        }]
    }

    fn input<'a>(
        snapshot: &'a AggregateSnapshot,
        recommendations: &'a [Recommendation],
    ) -> NarrativeInput<'a> {
        NarrativeInput {
            snapshot,
            trend: Trend::Improving,
            overall_score: 75,
            level: WellbeingLevel::Good,
            recommendations,
        }
    }

    struct FailingBackend;

    impl NarrativeBackend for FailingBackend {
        fn source(&self) -> ReportSource {
            ReportSource::Ai
        }

        async fn generate(&self, _input: &NarrativeInput<'_>) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    struct EmptyBackend;

    impl NarrativeBackend for EmptyBackend {
        fn source(&self) -> ReportSource {
            ReportSource::Ai
        }

        async fn generate(&self, _input: &NarrativeInput<'_>) -> anyhow::Result<String> {
            Ok("   ".to_string())
        }
    }

    #[test]
    fn test_template_is_deterministic() {
        let snapshot = snapshot();
        let recs = recommendations();
        let input = input(&snapshot, &recs);
        let a = TemplateNarrative.render(&input);
        let b = TemplateNarrative.render(&input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_template_references_score_and_aggregates() {
        let snapshot = snapshot();
        let recs = recommendations();
        let text = TemplateNarrative.render(&input(&snapshot, &recs));
        assert!(text.contains("7.0/10"));
        assert!(text.contains("75 out of 100"));
        assert!(text.contains("Increase Activity"));
        assert!(!text.is_empty());
    }

    #[test]
    fn test_empty_window_template_invites_logging() {
        let empty = AggregateSnapshot {
            mood: None,
            activity: None,
        };
        let text = TemplateNarrative.render(&NarrativeInput {
            snapshot: &empty,
            trend: Trend::Stable,
            overall_score: 50,
            level: WellbeingLevel::NoData,
            recommendations: &[],
        });
        assert!(text.contains("Start logging"));
        assert!(text.contains("50 out of 100"));
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_silently() {
        let snapshot = snapshot();
        let recs = recommendations();
        let narrative =
            generate_with(Some(&FailingBackend), &TemplateNarrative, &input(&snapshot, &recs))
                .await;
        assert_eq!(narrative.source, ReportSource::Fallback);
        assert!(!narrative.text.is_empty());
    }

    #[tokio::test]
    async fn test_empty_backend_response_falls_back() {
        let snapshot = snapshot();
        let recs = recommendations();
        let narrative =
            generate_with(Some(&EmptyBackend), &TemplateNarrative, &input(&snapshot, &recs))
                .await;
        assert_eq!(narrative.source, ReportSource::Fallback);
    }

    #[tokio::test]
    async fn test_no_primary_uses_fallback() {
        let snapshot = snapshot();
        let recs = recommendations();
        let narrative = generate_with(
            None::<&FailingBackend>,
            &TemplateNarrative,
            &input(&snapshot, &recs),
        )
        .await;
        assert_eq!(narrative.source, ReportSource::Fallback);
    }
}
