mod ui;

use std::fs::OpenOptions;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use retail_dashboard::app::Dashboard;
use retail_dashboard::config::{Config, TUI_POLL_INTERVAL_MS};
use retail_dashboard::error::Result;
use retail_dashboard::loader::SourcePaths;
use retail_dashboard::pages::Page;
use retail_dashboard::state::DatasetCache;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // The terminal belongs to the UI, so logs go to a file.
    let log_file = match OpenOptions::new().create(true).append(true).open(&cfg.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", cfg.log_file.display());
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    if let Err(e) = run(cfg) {
        error!("Fatal error: {e}");
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cfg: Config) -> Result<()> {
    info!(data_dir = %cfg.data_dir.display(), start_page = %cfg.start_page, "Dashboard starting");

    let cache = DatasetCache::new();
    let mut dashboard = Dashboard::new(cache, SourcePaths::under(&cfg.data_dir), cfg.start_page)?;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut dashboard);

    // Leave raw mode and the alternate screen even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Dashboard stopped");
    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, dashboard: &mut Dashboard) -> Result<()> {
    let poll = Duration::from_millis(TUI_POLL_INTERVAL_MS);
    let mut scroll = 0usize;

    loop {
        terminal.draw(|f| ui::render(f, dashboard, scroll))?;

        if !event::poll(poll)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let before = dashboard.page();
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
            KeyCode::Right | KeyCode::Char('l') => dashboard.next_page()?,
            KeyCode::Left | KeyCode::Char('h') => dashboard.prev_page()?,
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                dashboard.select(Page::ALL[index])?;
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                info!(page = %dashboard.page(), "Reload requested");
                dashboard.reload()?;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                info!("Cache clear requested");
                dashboard.clear_cache()?;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = ui::section_count(dashboard).saturating_sub(1);
                scroll = (scroll + 1).min(max);
            }
            KeyCode::Up | KeyCode::Char('k') => scroll = scroll.saturating_sub(1),
            _ => {}
        }
        if dashboard.page() != before {
            scroll = 0;
        }
    }
}
