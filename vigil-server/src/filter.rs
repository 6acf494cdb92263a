//! Live-view log filter

use vigil_common::{FilterConfig, LogEntry};

/// Predicate deciding whether a log entry reaches the live view.
///
/// `None` on either axis matches anything. Entries rejected here are still
/// written to the durable log; only the live stream is suppressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Exact HTTP method to match, or any
    pub method: Option<String>,

    /// Exact response status to match, or any
    pub status: Option<u16>,
}

impl LogFilter {
    pub fn new(method: Option<String>, status: Option<u16>) -> Self {
        Self { method, status }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            method: config.method.clone(),
            status: config.status,
        }
    }

    /// True iff both the method and the status predicate accept the entry
    pub fn should_forward(&self, entry: &LogEntry) -> bool {
        if let Some(ref method) = self.method {
            if !entry.method.eq_ignore_ascii_case(method) {
                return false;
            }
        }

        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(method: &str, status: u16) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            method: method.to_string(),
            status,
            message: format!("{} / -> {}", method, status),
        }
    }

    #[test]
    fn match_any_forwards_everything() {
        let filter = LogFilter::default();
        assert!(filter.should_forward(&entry("GET", 200)));
        assert!(filter.should_forward(&entry("POST", 400)));
        assert!(filter.should_forward(&entry("DELETE", 501)));
    }

    #[test]
    fn method_filter_excludes_other_methods() {
        let filter = LogFilter::new(Some("GET".to_string()), None);
        assert!(filter.should_forward(&entry("GET", 200)));
        assert!(filter.should_forward(&entry("GET", 500)));
        assert!(!filter.should_forward(&entry("POST", 200)));
    }

    #[test]
    fn status_filter_excludes_other_statuses() {
        let filter = LogFilter::new(None, Some(400));
        assert!(filter.should_forward(&entry("POST", 400)));
        assert!(filter.should_forward(&entry("GET", 400)));
        assert!(!filter.should_forward(&entry("GET", 200)));
    }

    #[test]
    fn both_predicates_must_accept() {
        let filter = LogFilter::new(Some("POST".to_string()), Some(200));
        assert!(filter.should_forward(&entry("POST", 200)));
        assert!(!filter.should_forward(&entry("POST", 400)));
        assert!(!filter.should_forward(&entry("GET", 200)));
    }

    #[test]
    fn method_comparison_is_case_insensitive() {
        let filter = LogFilter::new(Some("get".to_string()), None);
        assert!(filter.should_forward(&entry("GET", 200)));
    }
}
