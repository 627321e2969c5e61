pub mod activity_logs;
pub mod auth;
pub mod billing;
pub mod health;
pub mod mood_logs;
pub mod reports;
