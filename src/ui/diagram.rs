//! Diagram tab rendering.
//!
//! Shows the Mermaid source text for the tab's diagram, straight from the
//! session cache in the snapshot. Content served by the persistent
//! fallback carries a visible "cached" badge in the block title so stale
//! data is never mistaken for live data.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::graph::Diagram;

/// Render one diagram tab.
pub fn render(frame: &mut Frame, app: &App, diagram: Diagram, area: Rect) {
    let snapshot = app.store.get();
    let view = app.views.get(&diagram).cloned().unwrap_or_default();

    let mut title = format!(" {} ", diagram.name());
    if view.stale {
        title.push_str("[cached] ");
    }

    let border_style = if view.stale {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().fg(app.theme.border)
    };
    let block = Block::default()
        .title(title)
        .title_style(app.theme.header)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    let content = if view.loading {
        vec![Line::from(Span::styled(
            "Loading diagram...",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else if let Some(error) = &view.error {
        vec![Line::from(Span::styled(
            error.clone(),
            Style::default().fg(app.theme.critical),
        ))]
    } else if let Some(source) = snapshot.graph_cache.get(&diagram) {
        source.lines().map(|l| Line::from(l.to_string())).collect()
    } else {
        vec![Line::from(Span::styled(
            "No diagram loaded. Press 'r' to fetch.",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    };

    frame.render_widget(Paragraph::new(content).block(block), area);
}
