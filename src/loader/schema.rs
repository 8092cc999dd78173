//! Declared columns of every tabular artifact.
//!
//! Headers are checked once, before any row is parsed, so a renamed or dropped
//! column surfaces as a precise `MalformedArtifact` instead of a late builder failure.

use std::path::Path;

use csv::StringRecord;

use crate::error::LoadError;
use crate::types::Artifact;

pub const FACT_TABLE_COLUMNS: &[&str] = &[
    "customer_key",
    "item_key",
    "desc",
    "unit_price",
    "total_price",
    "payment_key",
    "date_parsed",
];

pub const MONTHLY_TREND_COLUMNS: &[&str] = &["year_month", "revenue_millions"];

pub const SEGMENT_PERFORMANCE_COLUMNS: &[&str] = &[
    "customer_segment",
    "customer_key",
    "revenue_millions",
    "revenue_share",
    "avg_order_value",
];

pub const TOP_PRODUCTS_COLUMNS: &[&str] = &["item_name", "revenue", "transactions"];

pub const CUSTOMER_RISK_COLUMNS: &[&str] = &["customer_key", "total_spent", "risk_level"];

/// Required header columns for a tabular artifact. The KPI document has none.
pub fn required_columns(artifact: Artifact) -> &'static [&'static str] {
    match artifact {
        Artifact::FactTable => FACT_TABLE_COLUMNS,
        Artifact::KpiDocument => &[],
        Artifact::MonthlyTrend => MONTHLY_TREND_COLUMNS,
        Artifact::SegmentPerformance => SEGMENT_PERFORMANCE_COLUMNS,
        Artifact::TopProducts => TOP_PRODUCTS_COLUMNS,
        Artifact::CustomerRisk => CUSTOMER_RISK_COLUMNS,
    }
}

/// Check that every required column is present in `headers`. Extra columns are allowed.
pub fn validate_headers(artifact: Artifact, path: &Path, headers: &StringRecord) -> Result<(), LoadError> {
    let missing: Vec<&str> = required_columns(artifact)
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let found = if headers.is_empty() {
        "no header row".to_string()
    } else {
        format!("found [{}]", headers.iter().collect::<Vec<_>>().join(", "))
    };
    Err(LoadError::malformed(
        artifact,
        path,
        format!("missing required column(s) [{}]; {found}", missing.join(", ")),
    ))
}
