//! Terminal rendering using ratatui.
//!
//! Every frame is drawn from the current snapshot plus the per-tab
//! presentation state in [`App`]; nothing here mutates application state.

pub mod common;
pub mod dashboard;
pub mod diagram;
pub mod theme;

pub use theme::Theme;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::{App, Tab};

/// Render the full UI for one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let offline = app.health.is_offline_confirmed();

    let mut constraints = vec![
        Constraint::Length(1), // header
        Constraint::Length(1), // tabs
    ];
    if offline {
        constraints.push(Constraint::Length(1)); // offline banner
    }
    constraints.push(Constraint::Min(0)); // content
    constraints.push(Constraint::Length(1)); // status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    let content = if offline {
        common::render_offline_banner(frame, app, chunks[2]);
        chunks[3]
    } else {
        chunks[2]
    };

    match app.active_tab() {
        Tab::Dashboard => dashboard::render(frame, app, content),
        tab => {
            if let Some(d) = tab.diagram() {
                diagram::render(frame, app, d, content);
            }
        }
    }

    common::render_status_bar(frame, app, chunks[chunks.len() - 1]);

    if app.show_help {
        common::render_help(frame, app, frame.area());
    }
}
