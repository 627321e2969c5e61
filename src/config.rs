use std::env;

use crate::models::user::SubscriptionTier;

/// Per-plan report generation limit. `None` means unlimited.
pub type PlanLimit = Option<i32>;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,

    pub claude_api_key: String,
    pub claude_api_url: String,
    pub claude_model: String,
    pub narrative_timeout_secs: u64,

    pub max_report_window_days: i64,
    pub report_limit_free: PlanLimit,
    pub report_limit_plus: PlanLimit,
    pub report_limit_pro: PlanLimit,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("JWT_ACCESS_TTL_SECS must be a number"),
            jwt_refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".into())
                .parse()
                .expect("JWT_REFRESH_TTL_SECS must be a number"),

            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| String::new()),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET")
                .unwrap_or_else(|_| String::new()),

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_else(|_| String::new()),
            claude_api_url: env::var("CLAUDE_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".into()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            narrative_timeout_secs: env::var("NARRATIVE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap_or(30),

            max_report_window_days: env::var("MAX_REPORT_WINDOW_DAYS")
                .unwrap_or_else(|_| "365".into())
                .parse()
                .unwrap_or(365),
            report_limit_free: parse_plan_limit(
                &env::var("REPORT_LIMIT_FREE").unwrap_or_else(|_| "3".into()),
            ),
            report_limit_plus: parse_plan_limit(
                &env::var("REPORT_LIMIT_PLUS").unwrap_or_else(|_| "30".into()),
            ),
            report_limit_pro: parse_plan_limit(
                &env::var("REPORT_LIMIT_PRO").unwrap_or_else(|_| "unlimited".into()),
            ),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Report generation limit for a subscription tier. `None` = unlimited.
    pub fn report_limit(&self, tier: &SubscriptionTier) -> PlanLimit {
        match tier {
            SubscriptionTier::Free => self.report_limit_free,
            SubscriptionTier::Plus => self.report_limit_plus,
            SubscriptionTier::Pro => self.report_limit_pro,
        }
    }
}

/// Parse a plan limit: a non-negative integer, or the literal "unlimited"
/// (case-insensitive). Unparseable values fall back to unlimited rather
/// than refusing to boot.
fn parse_plan_limit(raw: &str) -> PlanLimit {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("unlimited") {
        return None;
    }
    match raw.parse::<i32>() {
        Ok(n) if n >= 0 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_limit_integer() {
        assert_eq!(parse_plan_limit("3"), Some(3));
        assert_eq!(parse_plan_limit(" 30 "), Some(30));
        assert_eq!(parse_plan_limit("0"), Some(0));
    }

    #[test]
    fn test_parse_plan_limit_unlimited() {
        assert_eq!(parse_plan_limit("unlimited"), None);
        assert_eq!(parse_plan_limit("UNLIMITED"), None);
    }

    #[test]
    fn test_parse_plan_limit_garbage_is_unlimited() {
        assert_eq!(parse_plan_limit("-1"), None);
        assert_eq!(parse_plan_limit("lots"), None);
    }
}
