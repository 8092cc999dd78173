//! Print one dashboard page as plain text.
//!
//! Usage: `report [PAGE]` where PAGE is one of
//! `home`, `customers`, `products`, `geography`, `pricing`.

use std::io::{self, Write};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use retail_dashboard::app::{Dashboard, DataStatus};
use retail_dashboard::config::Config;
use retail_dashboard::error::{AppError, Result};
use retail_dashboard::loader::SourcePaths;
use retail_dashboard::pages::{text, Page};
use retail_dashboard::state::DatasetCache;

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(io::stderr)
        .init();

    let page = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<Page>() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        None => cfg.start_page,
    };

    match run(&cfg, page) {
        Ok(DataStatus::Unavailable { .. }) => std::process::exit(3),
        Ok(_) => {}
        Err(e) => {
            error!("Fatal error: {e}");
            std::process::exit(1);
        }
    }
}

/// Render `page` to stdout and return what backed it.
fn run(cfg: &Config, page: Page) -> Result<DataStatus> {
    let dashboard = Dashboard::new(DatasetCache::new(), SourcePaths::under(&cfg.data_dir), page)?;
    info!(page = %page, status = ?dashboard.status(), "Report rendered");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    text::write_page(&mut out, dashboard.view()).map_err(AppError::Io)?;
    out.flush()?;
    Ok(dashboard.status().clone())
}
