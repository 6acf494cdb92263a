//! Events published by the server core for the presenter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events flowing from the server core to the single presenter consumer.
///
/// The core only ever publishes immutable values on this channel; the presenter
/// owns all rendering state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    /// A request finished and passed the live-view filter
    Log(LogEntry),

    /// Traffic statistics changed
    StatsChanged(StatsSnapshot),
}

/// One log event per handled request.
///
/// Every entry reaches the durable log; only entries accepted by the live-view
/// filter are published as `ServerEvent::Log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the request finished
    pub timestamp: DateTime<Utc>,

    /// HTTP method of the request
    pub method: String,

    /// Response status sent to the client
    pub status: u16,

    /// Free-text description of the event
    pub message: String,
}

/// One per-minute request-count bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatPoint {
    /// Bucket start, unix seconds truncated to the minute
    pub minute: i64,

    /// Requests handled within that minute
    pub count: u64,
}

/// Response status class tallies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCodeStats {
    /// 2xx responses
    pub success: u64,
    /// 4xx responses
    pub client_error: u64,
    /// 5xx responses
    pub server_error: u64,
}

/// Point-in-time read-out of the traffic statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total requests handled so far
    pub total_requests: u64,

    /// GET requests handled so far
    pub get_requests: u64,

    /// POST requests handled so far
    pub post_requests: u64,

    /// Seconds since the server started serving
    pub uptime_secs: u64,

    /// Response status class tallies
    pub status_codes: StatusCodeStats,

    /// Per-minute request counts within the retention horizon, ascending
    pub points: Vec<StatPoint>,
}
