pub mod aggregate;
pub mod document;
pub mod narrative;
pub mod quota;
pub mod recommend;
pub mod report;
pub mod score;
pub mod trend;
