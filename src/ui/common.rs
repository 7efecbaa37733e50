//! Common UI components shared across tabs.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Tab};
use crate::health::Connectivity;

/// Render the header bar with the connectivity overview.
///
/// Displays: status indicator, base URL, consecutive failures, polling state.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.store.get();
    let connectivity = app.health.connectivity();
    let status_style = app.theme.connectivity_style(connectivity);

    let polling = if snapshot.is_polling {
        Span::raw("polling")
    } else {
        Span::styled("paused", Style::default().add_modifier(Modifier::DIM))
    };

    let mut spans = vec![
        Span::styled(" ● ", status_style),
        Span::styled("STILLWATER ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(connectivity.label(), status_style),
        Span::raw(" │ "),
        Span::raw(app.api.base_url().to_string()),
        Span::raw(" │ "),
        polling,
    ];
    if snapshot.health_failure_count > 0 {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} missed", snapshot.health_failure_count),
            Style::default().fg(app.theme.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar.
///
/// Highlights the currently active tab.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!(" {}:{} ", i + 1, tab.label())))
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab())
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary status messages when present, otherwise the available
/// controls for the current tab.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.active_tab() {
        Tab::Dashboard => "Tab:switch r:refresh p:polling e:export ?:help q:quit",
        _ => "Tab:switch r:refresh c:clear-cache p:polling ?:help q:quit",
    };
    let status = if app.health.is_offline_confirmed() {
        format!(" OFFLINE | r:retry | {}", controls)
    } else {
        format!(" {}", controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render a full-width banner when the server is confirmed offline.
pub fn render_offline_banner(frame: &mut Frame, app: &App, area: Rect) {
    let style = app.theme.connectivity_style(Connectivity::OfflineConfirmed);
    let line = Line::from(vec![
        Span::styled(" ▲ Server offline ", style),
        Span::raw("- showing last known data. Start the admin server and press 'r'."),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current tab.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch tabs"),
        Line::from("  Tab/S-Tab   Switch tabs"),
        Line::from("  1-6         Jump to tab"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Data",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh now"),
        Line::from("  p         Pause/resume polling"),
        Line::from("  c         Clear diagram cache"),
        Line::from("  e         Export status to JSON"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?         Toggle this help"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
