use chrono::{DateTime, Utc};

/// A network disturbance or planned works notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Disturbance {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `disturbance` or `planned`.
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub link: Option<String>,
}
