//! Traffic statistics: per-run counters and the per-minute request window

use chrono::{DateTime, Utc};
use hyper::{Method, StatusCode};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use vigil_common::{StatPoint, StatusCodeStats};

/// Monotonic per-run request counters.
///
/// Counters are only ever read or incremented through these methods; there are
/// no directly accessible fields.
#[derive(Debug, Default)]
pub struct RequestCounters {
    total: AtomicU64,
    get: AtomicU64,
    post: AtomicU64,
    other: AtomicU64,
    success: AtomicU64,
    client_error: AtomicU64,
    server_error: AtomicU64,
}

/// Read-out of [`RequestCounters`]
#[derive(Debug, Clone, Default)]
pub struct CounterSnapshot {
    pub total: u64,
    pub get: u64,
    pub post: u64,
    pub other: u64,
    pub status_codes: StatusCodeStats,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request
    pub fn record(&self, method: &Method, status: StatusCode) {
        self.total.fetch_add(1, Ordering::Relaxed);

        match *method {
            Method::GET => self.get.fetch_add(1, Ordering::Relaxed),
            Method::POST => self.post.fetch_add(1, Ordering::Relaxed),
            _ => self.other.fetch_add(1, Ordering::Relaxed),
        };

        let code = status.as_u16();
        if (200..300).contains(&code) {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else if (400..500).contains(&code) {
            self.client_error.fetch_add(1, Ordering::Relaxed);
        } else if code >= 500 {
            self.server_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Requests fully recorded so far
    pub fn completed(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total: self.total.load(Ordering::Relaxed),
            get: self.get.load(Ordering::Relaxed),
            post: self.post.load(Ordering::Relaxed),
            other: self.other.load(Ordering::Relaxed),
            status_codes: StatusCodeStats {
                success: self.success.load(Ordering::Relaxed),
                client_error: self.client_error.load(Ordering::Relaxed),
                server_error: self.server_error.load(Ordering::Relaxed),
            },
        }
    }
}

/// Per-minute request-count buckets with lazy eviction.
///
/// Bucket keys are unix timestamps truncated to the minute. Eviction happens
/// only as a side effect of [`StatsWindow::snapshot`], bounding memory to the
/// buckets within the retention horizon.
#[derive(Debug, Default)]
pub struct StatsWindow {
    buckets: Mutex<BTreeMap<i64, u64>>,
}

impl StatsWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one request to the bucket covering `now`
    pub fn increment(&self, now: DateTime<Utc>) {
        let minute = minute_floor(now);
        let mut buckets = self.buckets.lock();
        *buckets.entry(minute).or_insert(0) += 1;
    }

    /// Evict buckets older than `now - retention_minutes`, then return the
    /// remaining buckets in ascending timestamp order.
    pub fn snapshot(&self, now: DateTime<Utc>, retention_minutes: u32) -> Vec<StatPoint> {
        let cutoff = now.timestamp() - i64::from(retention_minutes) * 60;
        let mut buckets = self.buckets.lock();
        buckets.retain(|minute, _| *minute >= cutoff);
        buckets
            .iter()
            .map(|(&minute, &count)| StatPoint { minute, count })
            .collect()
    }
}

/// Truncate a timestamp to the start of its minute, in unix seconds
fn minute_floor(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(60) * 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn same_minute_lands_in_one_bucket() {
        let window = StatsWindow::new();
        window.increment(at(600));
        window.increment(at(659));

        let points = window.snapshot(at(660), 60);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].minute, 600);
        assert_eq!(points[0].count, 2);
    }

    #[test]
    fn distinct_minutes_get_distinct_buckets() {
        let window = StatsWindow::new();
        window.increment(at(600));
        window.increment(at(660));
        window.increment(at(661));

        let points = window.snapshot(at(700), 60);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], StatPoint { minute: 600, count: 1 });
        assert_eq!(points[1], StatPoint { minute: 660, count: 2 });
    }

    #[test]
    fn snapshot_evicts_beyond_horizon() {
        let window = StatsWindow::new();
        window.increment(at(0));
        window.increment(at(60));
        window.increment(at(600));

        // Horizon of 5 minutes from t=600: cutoff is t=300
        let points = window.snapshot(at(600), 5);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].minute, 600);

        // Evicted buckets stay gone even with a wider later horizon
        let points = window.snapshot(at(600), 60);
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn snapshot_is_ascending() {
        let window = StatsWindow::new();
        for secs in [600, 60, 300, 0, 120] {
            window.increment(at(secs));
        }
        let points = window.snapshot(at(600), 60);
        let minutes: Vec<i64> = points.iter().map(|p| p.minute).collect();
        let mut sorted = minutes.clone();
        sorted.sort_unstable();
        assert_eq!(minutes, sorted);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let window = Arc::new(StatsWindow::new());
        let threads = 8;
        let per_thread = 1000;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let window = Arc::clone(&window);
                std::thread::spawn(move || {
                    for _ in 0..per_thread {
                        window.increment(at(600));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let points = window.snapshot(at(600), 60);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].count, threads * per_thread);
    }

    #[test]
    fn counters_track_methods_and_status_classes() {
        let counters = RequestCounters::new();
        counters.record(&Method::GET, StatusCode::OK);
        counters.record(&Method::POST, StatusCode::OK);
        counters.record(&Method::POST, StatusCode::BAD_REQUEST);
        counters.record(&Method::DELETE, StatusCode::NOT_IMPLEMENTED);

        let snap = counters.snapshot();
        assert_eq!(snap.total, 4);
        assert_eq!(snap.get, 1);
        assert_eq!(snap.post, 2);
        assert_eq!(snap.other, 1);
        assert_eq!(snap.status_codes.success, 2);
        assert_eq!(snap.status_codes.client_error, 1);
        assert_eq!(snap.status_codes.server_error, 1);
    }

    #[test]
    fn concurrent_counter_records_sum_exactly() {
        let counters = Arc::new(RequestCounters::new());
        let threads = 8;
        let per_thread = 1000u64;

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let counters = Arc::clone(&counters);
                std::thread::spawn(move || {
                    for _ in 0..per_thread {
                        counters.record(&Method::GET, StatusCode::OK);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counters.completed(), threads * per_thread);
    }
}
