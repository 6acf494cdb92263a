//! TUI rendering

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Sparkline, Table},
    Frame,
};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(8), // Request load chart
            Constraint::Length(9), // Statistics
            Constraint::Min(5),    // Live log
            Constraint::Length(1), // Footer
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_chart(f, app, chunks[1]);
    draw_stats(f, app, chunks[2]);
    draw_log(f, app, chunks[3]);
    draw_footer(f, chunks[4]);
}

/// Draw header: bind address and uptime
fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled("● Serving ", Style::default().fg(Color::Green)),
        Span::styled(
            format!("http://{}/", app.addr),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   Uptime: "),
        Span::styled(
            format_duration(app.snapshot.uptime_secs),
            Style::default().fg(Color::Green),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Vigil"));
    f.render_widget(paragraph, area);
}

/// Draw the requests-per-minute sparkline
fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let data: Vec<u64> = app.snapshot.points.iter().map(|p| p.count).collect();

    // Show the newest buckets that fit the widget width
    let width = area.width.saturating_sub(2) as usize;
    let visible = if data.len() > width {
        &data[data.len() - width..]
    } else {
        &data[..]
    };

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Request Load (requests per minute)"),
        )
        .data(visible)
        .style(Style::default().fg(Color::Blue));

    f.render_widget(sparkline, area);
}

/// Draw the statistics table
fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;

    let rows = vec![
        metric_row("Total Requests", snapshot.total_requests.to_string()),
        metric_row("GET Requests", snapshot.get_requests.to_string()),
        metric_row("POST Requests", snapshot.post_requests.to_string()),
        metric_row("2xx Responses", snapshot.status_codes.success.to_string()),
        metric_row(
            "4xx Responses",
            snapshot.status_codes.client_error.to_string(),
        ),
        metric_row(
            "5xx Responses",
            snapshot.status_codes.server_error.to_string(),
        ),
        metric_row("Uptime", format_duration(snapshot.uptime_secs)),
    ];

    let header = Row::new(
        ["Metric", "Value"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    )
    .height(1);

    let table = Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Statistics"));

    f.render_widget(table, area);
}

fn metric_row(metric: &str, value: String) -> Row<'static> {
    Row::new(vec![Cell::from(metric.to_string()), Cell::from(value)])
}

/// Draw the live log, newest entries on top
fn draw_log(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.timestamp.format("%H:%M:%S").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:>3}", entry.status),
                    Style::default().fg(status_color(entry.status)),
                ),
                Span::raw(" "),
                Span::raw(entry.message.clone()),
            ]))
        })
        .collect();

    let title = format!(
        "Live Log (method: {}, status: {})",
        app.method_filter_label(),
        app.status_filter_label()
    );
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, area);
}

/// Draw footer
fn draw_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(
        "Press 'q' to quit | 'm' cycle method filter | 's' cycle status filter | 'c' clear log",
    )
    .style(Style::default().fg(Color::DarkGray));

    f.render_widget(footer, area);
}

fn status_color(status: u16) -> Color {
    match status {
        200..=299 => Color::Green,
        400..=499 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Format duration in human-readable form
fn format_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
