//! Dashboard tab rendering.
//!
//! One card per status resource (LLM, Solace, skills, swarms, personas),
//! all rendered from the current snapshot. Once the server is confirmed
//! offline the cards show "unavailable" placeholders instead of presenting
//! stale values as live.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use serde_json::Value;

use crate::app::App;

/// Render the Dashboard tab: a row of service cards over a row of
/// resource-count cards.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.store.get();
    let unavailable = app.health.is_offline_confirmed();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let services = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    render_card(frame, app, services[0], "LLM", llm_lines(&snapshot.llm, unavailable));
    render_card(
        frame,
        app,
        services[1],
        "Solace AGI",
        solace_lines(&snapshot.solace, unavailable),
    );

    let resources = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);

    render_card(
        frame,
        app,
        resources[0],
        "Skills",
        count_lines(&snapshot.skills, unavailable),
    );
    render_card(
        frame,
        app,
        resources[1],
        "Swarms",
        count_lines(&snapshot.swarms, unavailable),
    );
    render_card(
        frame,
        app,
        resources[2],
        "Personas",
        count_lines(&snapshot.personas, unavailable),
    );
}

fn render_card(frame: &mut Frame, app: &App, area: Rect, title: &str, lines: Vec<Line>) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn unavailable_line() -> Vec<Line<'static>> {
    vec![Line::from(Span::styled(
        "unavailable",
        Style::default().add_modifier(Modifier::DIM),
    ))]
}

fn llm_lines(llm: &Option<Value>, unavailable: bool) -> Vec<Line<'static>> {
    if unavailable {
        return unavailable_line();
    }
    let Some(value) = llm else {
        return vec![Line::from("...")];
    };
    let online = value.get("online").and_then(Value::as_bool).unwrap_or(false);
    let mut lines = vec![Line::from(format!(
        "state: {}",
        if online { "online" } else { "offline" }
    ))];
    if let Some(model) = value.get("default_model").and_then(Value::as_str) {
        lines.push(Line::from(format!("model: {}", model)));
    }
    if let Some(enabled) = value.get("claude_code_enabled").and_then(Value::as_bool) {
        lines.push(Line::from(format!("claude code: {}", enabled)));
    }
    lines
}

fn solace_lines(solace: &Option<Value>, unavailable: bool) -> Vec<Line<'static>> {
    if unavailable {
        return unavailable_line();
    }
    let Some(value) = solace else {
        return vec![Line::from("...")];
    };
    let configured = value
        .get("configured")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mut lines = vec![Line::from(format!(
        "configured: {}",
        if configured { "yes" } else { "no" }
    ))];
    if let Some(sync) = value.get("auto_sync").and_then(Value::as_bool) {
        lines.push(Line::from(format!("auto-sync: {}", sync)));
    }
    lines
}

fn count_lines(resource: &Option<Value>, unavailable: bool) -> Vec<Line<'static>> {
    if unavailable {
        return unavailable_line();
    }
    let Some(value) = resource else {
        return vec![Line::from("...")];
    };
    let count = value.get("count").and_then(Value::as_u64).unwrap_or(0);
    vec![Line::from(Span::styled(
        format!("{}", count),
        Style::default().add_modifier(Modifier::BOLD),
    ))]
}
