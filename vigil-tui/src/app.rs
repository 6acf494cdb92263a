//! Application state and logic

use crossterm::event::{KeyCode, KeyEvent};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use vigil_common::{LogEntry, ServerEvent, StatsSnapshot};
use vigil_server::filter::LogFilter;
use vigil_server::AppState;

/// How many live log lines the view retains
const MAX_LOG_LINES: usize = 200;

/// Status values the status filter cycles through
const STATUS_CYCLE: [u16; 4] = [200, 400, 500, 501];

/// Application state
pub struct App {
    /// Server core handle, used to retune the live-view filter
    state: Arc<AppState>,

    /// Event stream from the server core
    events: mpsc::Receiver<ServerEvent>,

    /// Address the embedded server is listening on
    pub addr: SocketAddr,

    /// Post-filter live log, newest last
    pub logs: VecDeque<LogEntry>,

    /// Latest statistics snapshot
    pub snapshot: StatsSnapshot,

    /// Local copy of the live-view filter, for display
    pub filter: LogFilter,
}

impl App {
    pub fn new(state: Arc<AppState>, events: mpsc::Receiver<ServerEvent>, addr: SocketAddr) -> Self {
        let filter = LogFilter::from_config(&state.config.log.filter);
        Self {
            state,
            events,
            addr,
            logs: VecDeque::new(),
            snapshot: StatsSnapshot::default(),
            filter,
        }
    }

    /// Drain pending server events without blocking
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                ServerEvent::Log(entry) => {
                    if self.logs.len() == MAX_LOG_LINES {
                        self.logs.pop_front();
                    }
                    self.logs.push_back(entry);
                }
                ServerEvent::StatsChanged(snapshot) => {
                    self.snapshot = snapshot;
                }
            }
        }
    }

    /// Handle key input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Cycle the method filter: All -> GET -> POST -> All
            KeyCode::Char('m') => {
                self.filter.method = match self.filter.method.as_deref() {
                    None => Some("GET".to_string()),
                    Some("GET") => Some("POST".to_string()),
                    Some(_) => None,
                };
                self.apply_filter().await;
            }

            // Cycle the status filter: All -> 200 -> 400 -> 500 -> 501 -> All
            KeyCode::Char('s') => {
                self.filter.status = match self.filter.status {
                    None => Some(STATUS_CYCLE[0]),
                    Some(current) => STATUS_CYCLE
                        .iter()
                        .position(|&s| s == current)
                        .and_then(|i| STATUS_CYCLE.get(i + 1))
                        .copied(),
                };
                self.apply_filter().await;
            }

            // Clear the live log view
            KeyCode::Char('c') => {
                self.logs.clear();
            }

            _ => {}
        }
    }

    /// Push the locally edited filter into the server core
    async fn apply_filter(&self) {
        *self.state.filter.write().await = self.filter.clone();
    }

    pub fn method_filter_label(&self) -> String {
        self.filter
            .method
            .clone()
            .unwrap_or_else(|| "All".to_string())
    }

    pub fn status_filter_label(&self) -> String {
        self.filter
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "All".to_string())
    }
}
