//! Vigil TUI - live terminal view over the embedded diagnostic server

mod app;
mod ui;

use anyhow::Result;
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::error;
use vigil_common::VigilConfig;
use vigil_server::server::HttpServer;
use vigil_server::{event_channel, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging to stderr (stdout belongs to the terminal UI)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter("vigil_tui=info")
        .init();

    // Parse command line arguments
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("vigil.toml"));

    let config = if config_path.exists() {
        VigilConfig::load(&config_path)?
    } else {
        VigilConfig::default()
    };

    // Start the embedded server before touching the terminal, so a bind
    // failure is reported as a plain error
    let (events_tx, events_rx) = event_channel();
    let state = Arc::new(AppState::new(config, events_tx));
    let server = HttpServer::bind(state.clone()).await?;
    let addr = server.local_addr()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server_handle = tokio::spawn(server.run(shutdown_rx));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(state, events_rx, addr);
    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Stop the embedded server
    let _ = shutdown_tx.send(true);
    if let Err(e) = server_handle.await {
        error!("Server task failed: {}", e);
    }

    if let Err(e) = res {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with timeout
        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
                    return Ok(());
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                app.handle_key(key).await;
            }
        }

        // Drain pending events from the server core
        app.process_events();
    }
}
