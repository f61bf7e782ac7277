//! Rebuild options.

use chrono::{DateTime, Utc};

/// Options for revision application.
#[derive(Debug, Clone)]
pub struct ReviseOptions {
    /// Author name stamped on tracked-change markup
    pub author: String,

    /// Fixed timestamp for tracked-change markup; `None` uses the
    /// current time at rebuild
    pub timestamp: Option<DateTime<Utc>>,
}

impl ReviseOptions {
    /// Create new revise options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attribution author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Pin the attribution timestamp (useful for reproducible output).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The timestamp to stamp, formatted for revision markup.
    pub(crate) fn markup_date(&self) -> String {
        self.timestamp
            .unwrap_or_else(Utc::now)
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string()
    }
}

impl Default for ReviseOptions {
    fn default() -> Self {
        Self {
            author: "Contract Review".to_string(),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_markup_date_format() {
        let options = ReviseOptions::new()
            .with_author("Reviewer")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap());
        assert_eq!(options.markup_date(), "2024-03-01T09:30:00Z");
        assert_eq!(options.author, "Reviewer");
    }
}
