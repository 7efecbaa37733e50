use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use stillwater_doctor::api::{ApiClient, LlmConfig, SolaceConfig};
use stillwater_doctor::app::App;
use stillwater_doctor::config::Settings;
use stillwater_doctor::events::{self, Action};
use stillwater_doctor::graph::{
    DiagramCache, FileDiagramCache, GraphLoader, MemoryDiagramCache, OfflineProxy,
};
use stillwater_doctor::ui;

#[derive(Parser, Debug)]
#[command(name = "stillwater-doctor")]
#[command(about = "Terminal console for monitoring a Stillwater admin server")]
struct Args {
    /// Base URL of the admin server
    #[arg(short, long)]
    url: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval in seconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Persistent diagram cache file
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Disable the persistent diagram cache
    #[arg(long)]
    no_cache: bool,

    /// Append logs to this file (the TUI owns the terminal)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Fetch status once, write it to a JSON file, and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Set the default LLM model on the server and exit
    #[arg(long, conflicts_with = "export")]
    set_llm_model: Option<String>,

    /// Enable the claude-code integration (with --set-llm-model)
    #[arg(long, requires = "set_llm_model")]
    claude_code: bool,

    /// Auto-start the wrapper process (with --set-llm-model)
    #[arg(long, requires = "set_llm_model")]
    auto_start_wrapper: bool,

    /// Set the Solace AGI API key on the server and exit
    #[arg(long, conflicts_with_all = ["export", "set_llm_model"])]
    set_solace_key: Option<String>,

    /// Enable Solace auto-sync (with --set-solace-key)
    #[arg(long, requires = "set_solace_key")]
    auto_sync: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        settings.base_url = url;
    }
    if let Some(interval) = args.interval {
        settings.poll_interval_secs = interval;
    }
    if let Some(timeout) = args.timeout {
        settings.request_timeout_secs = timeout;
    }
    if let Some(cache_file) = args.cache_file {
        settings.cache_file = Some(cache_file);
    }

    let api = ApiClient::with_timeout(&settings.base_url, settings.request_timeout());

    // One-shot configuration modes (non-interactive)
    if let Some(model) = args.set_llm_model {
        let config = LlmConfig {
            default_model: model,
            claude_code_enabled: args.claude_code,
            auto_start_wrapper: args.auto_start_wrapper,
        };
        api.set_llm_config(&config)
            .await
            .context("failed to update LLM configuration")?;
        println!("LLM configuration updated");
        return Ok(());
    }
    if let Some(key) = args.set_solace_key {
        let config = SolaceConfig {
            api_key: key,
            auto_sync: args.auto_sync,
        };
        api.set_solace_config(&config)
            .await
            .context("failed to update Solace configuration")?;
        println!("Solace configuration updated");
        return Ok(());
    }

    let cache: Box<dyn DiagramCache> = if args.no_cache {
        Box::new(MemoryDiagramCache::default())
    } else {
        Box::new(FileDiagramCache::open(settings.cache_file()))
    };
    let graphs = GraphLoader::new(OfflineProxy::new(cache));

    let mut app = App::new(
        api,
        graphs,
        settings.poll_interval(),
        Some(settings.state_file()),
    );

    // Export mode: fetch once and write the snapshot (non-interactive)
    if let Some(export_path) = args.export {
        app.refresh().await;
        app.export_state(&export_path)?;
        println!("Exported status to: {}", export_path.display());
        return Ok(());
    }

    run_tui(&mut app).await
}

/// Route tracing output to a file; the terminal belongs to the TUI.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the interactive TUI until the user quits.
async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableFocusChange);
        original_hook(panic);
    }));

    // First refresh and steady-state polling
    app.refresh().await;
    app.start_polling();
    // A restored diagram tab needs its diagram loaded.
    if app.active_tab().diagram().is_some() {
        let tab = app.active_tab();
        app.activate_tab(tab).await;
    }

    let result = run_loop(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, area.height.saturating_sub(4) / 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app);
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => {
                    let action = events::handle_key_event(app, key);
                    dispatch(app, action).await;
                }
                Event::FocusGained => events::handle_focus_event(app, true),
                Event::FocusLost => events::handle_focus_event(app, false),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        app.tick().await;
    }

    Ok(())
}

async fn dispatch(app: &mut App, action: Action) {
    match action {
        Action::None => {}
        Action::Activate(tab) => app.activate_tab(tab).await,
        Action::Retry => app.retry().await,
        Action::TogglePolling => app.toggle_polling(),
        Action::ClearCache => app.clear_diagram_cache().await,
        Action::Export => {
            let path = PathBuf::from("stillwater_status.json");
            match app.export_state(&path) {
                Ok(()) => app.set_status_message(format!("Exported to {}", path.display())),
                Err(e) => app.set_status_message(format!("Export failed: {}", e)),
            }
        }
    }
}
