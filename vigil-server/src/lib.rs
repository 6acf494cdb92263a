//! Vigil Server - embedded diagnostic HTTP server core

pub mod error;
pub mod filter;
pub mod logfile;
pub mod server;
pub mod stats;
pub mod store;

use chrono::Utc;
use filter::LogFilter;
use logfile::LogWriter;
use stats::{RequestCounters, StatsWindow};
use store::MessageStore;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use vigil_common::{ServerEvent, StatsSnapshot, VigilConfig};

/// Bound of the presenter event channel. A full channel drops events rather
/// than blocking a request.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Create the presenter event channel. Exactly one consumer drains it.
pub fn event_channel() -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Shared application state
pub struct AppState {
    /// Per-run request counters
    pub counters: RequestCounters,

    /// Per-minute request-count window
    pub window: StatsWindow,

    /// Live-view filter, retunable at runtime by the presenter
    pub filter: RwLock<LogFilter>,

    /// Messages accepted by the echo endpoint
    pub messages: MessageStore,

    /// Durable append-only log
    pub log: LogWriter,

    /// When the server started serving
    pub start_time: std::time::Instant,

    /// Harness configuration, immutable for the run
    pub config: VigilConfig,

    events: mpsc::Sender<ServerEvent>,
}

impl AppState {
    pub fn new(config: VigilConfig, events: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            counters: RequestCounters::new(),
            window: StatsWindow::new(),
            filter: RwLock::new(LogFilter::from_config(&config.log.filter)),
            messages: MessageStore::new(config.messages.capacity),
            log: LogWriter::new(config.log.file.clone()),
            start_time: std::time::Instant::now(),
            events,
            config,
        }
    }

    /// Read out the traffic statistics over the configured retention horizon
    pub fn stats_snapshot(&self) -> StatsSnapshot {
        let counters = self.counters.snapshot();
        StatsSnapshot {
            total_requests: counters.total,
            get_requests: counters.get,
            post_requests: counters.post,
            uptime_secs: self.start_time.elapsed().as_secs(),
            status_codes: counters.status_codes,
            points: self
                .window
                .snapshot(Utc::now(), self.config.stats.retention_minutes),
        }
    }

    /// Publish an event to the presenter. A slow or absent presenter must not
    /// block the core, so a full channel drops the event.
    pub fn publish(&self, event: ServerEvent) {
        if let Err(e) = self.events.try_send(event) {
            debug!("presenter channel unavailable, dropping event: {}", e);
        }
    }
}
