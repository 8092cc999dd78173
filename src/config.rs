use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::pages::Page;

/// Artifact locations relative to the data directory.
pub const FACT_TABLE_FILE: &str = "processed/master_dataset.csv";
pub const KPI_DOCUMENT_FILE: &str = "dashboard/kpis.json";
pub const MONTHLY_TREND_FILE: &str = "dashboard/monthly_trends.csv";
pub const SEGMENT_PERFORMANCE_FILE: &str = "dashboard/segment_performance.csv";
pub const TOP_PRODUCTS_FILE: &str = "dashboard/top_products.csv";
pub const CUSTOMER_RISK_FILE: &str = "dashboard/customer_risk.csv";

pub const DEFAULT_DATA_DIR: &str = "../data";

/// Products shown on the overview page.
pub const HOME_TOP_PRODUCTS: usize = 10;

/// Products shown on the product performance page.
pub const PRODUCT_PAGE_TOP_PRODUCTS: usize = 20;

/// Categories shown in the category performance section.
pub const TOP_CATEGORIES: usize = 10;

/// How long the TUI waits for a key press before redrawing (milliseconds).
pub const TUI_POLL_INTERVAL_MS: u64 = 250;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the artifact layout (DASHBOARD_DATA_DIR)
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Log destination for the interactive dashboard, which owns stdout (LOG_FILE)
    pub log_file: PathBuf,
    /// Page shown first (DASHBOARD_START_PAGE)
    pub start_page: Page,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let start_page = match lookup("DASHBOARD_START_PAGE") {
            Some(raw) => raw.parse::<Page>().map_err(AppError::Config)?,
            None => Page::Home,
        };

        Ok(Self {
            data_dir: lookup("DASHBOARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("dashboard.log")),
            start_page,
        })
    }
}
