//! Terminal event handling.
//!
//! Key handling is split from dispatch: [`handle_key_event`] translates a
//! key press into an [`Action`] (mutating only synchronous app state), and
//! the main loop awaits the async operations the action calls for. Focus
//! events map to background/foreground polling transitions.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent};

use crate::app::{App, Tab};

/// An operation the event loop must run after key handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Switch to a tab (loads its diagram if it has one).
    Activate(Tab),
    /// Manual health-check and status refresh.
    Retry,
    /// Start or stop periodic refresh.
    TogglePolling,
    /// Clear session-cached diagrams and reload the visible one.
    ClearCache,
    /// Write the current snapshot to a JSON file.
    Export,
}

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event, returning the async follow-up to run.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Action {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return Action::None;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // Tab switching
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
            return Action::Activate(app.active_tab().next());
        }
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
            return Action::Activate(app.active_tab().prev());
        }

        // Direct tab access
        KeyCode::Char('1') => return Action::Activate(Tab::Dashboard),
        KeyCode::Char('2') => return Action::Activate(Tab::Orchestration),
        KeyCode::Char('3') => return Action::Activate(Tab::Skills),
        KeyCode::Char('4') => return Action::Activate(Tab::Swarms),
        KeyCode::Char('5') => return Action::Activate(Tab::Personas),
        KeyCode::Char('6') => return Action::Activate(Tab::Recipes),

        // Manual refresh
        KeyCode::Char('r') => return Action::Retry,

        // Pause/resume periodic refresh
        KeyCode::Char('p') => return Action::TogglePolling,

        // Clear diagram cache
        KeyCode::Char('c') => return Action::ClearCache,

        // Export
        KeyCode::Char('e') => return Action::Export,

        // Help
        KeyCode::Char('?') => app.show_help = true,

        KeyCode::Esc => {}

        _ => {}
    }
    Action::None
}

/// Handle a terminal focus change. Losing focus pauses polling; regaining
/// it resumes, unless polling was stopped explicitly.
pub fn handle_focus_event(app: &mut App, gained: bool) {
    app.set_backgrounded(!gained);
}
