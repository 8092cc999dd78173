use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::{
    CUSTOMER_RISK_FILE, FACT_TABLE_FILE, KPI_DOCUMENT_FILE, MONTHLY_TREND_FILE,
    SEGMENT_PERFORMANCE_FILE, TOP_PRODUCTS_FILE,
};
use crate::error::LoadError;
use crate::loader::schema::validate_headers;
use crate::types::{
    Artifact, CustomerRisk, KpiDocument, KpiSnapshot, MonthlyTrend, SegmentPerformance,
    TopProduct, TransactionFact,
};

// ---------------------------------------------------------------------------
// Source paths
// ---------------------------------------------------------------------------

/// One path per artifact. Also the cache key: two identical path sets share a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourcePaths {
    pub fact_table: PathBuf,
    pub kpi_document: PathBuf,
    pub monthly_trend: PathBuf,
    pub segment_performance: PathBuf,
    pub top_products: PathBuf,
    pub customer_risk: PathBuf,
}

impl SourcePaths {
    /// Conventional layout: `processed/` holds the fact table, `dashboard/` the rest.
    pub fn under(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            fact_table: dir.join(FACT_TABLE_FILE),
            kpi_document: dir.join(KPI_DOCUMENT_FILE),
            monthly_trend: dir.join(MONTHLY_TREND_FILE),
            segment_performance: dir.join(SEGMENT_PERFORMANCE_FILE),
            top_products: dir.join(TOP_PRODUCTS_FILE),
            customer_risk: dir.join(CUSTOMER_RISK_FILE),
        }
    }

    pub fn path(&self, artifact: Artifact) -> &Path {
        match artifact {
            Artifact::FactTable => &self.fact_table,
            Artifact::KpiDocument => &self.kpi_document,
            Artifact::MonthlyTrend => &self.monthly_trend,
            Artifact::SegmentPerformance => &self.segment_performance,
            Artifact::TopProducts => &self.top_products,
            Artifact::CustomerRisk => &self.customer_risk,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle
// ---------------------------------------------------------------------------

/// Every artifact of one load, fully parsed. Never partially populated.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBundle {
    pub transactions: Vec<TransactionFact>,
    pub kpis: KpiSnapshot,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub segment_performance: Vec<SegmentPerformance>,
    pub top_products: Vec<TopProduct>,
    pub customer_risk: Vec<CustomerRisk>,
}

impl DatasetBundle {
    /// Row count per artifact; the KPI document counts as one record.
    pub fn row_counts(&self) -> [(Artifact, usize); 6] {
        [
            (Artifact::FactTable, self.transactions.len()),
            (Artifact::KpiDocument, 1),
            (Artifact::MonthlyTrend, self.monthly_trend.len()),
            (Artifact::SegmentPerformance, self.segment_performance.len()),
            (Artifact::TopProducts, self.top_products.len()),
            (Artifact::CustomerRisk, self.customer_risk.len()),
        ]
    }

    /// Earliest and latest transaction date, `None` for an empty fact table.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.transactions.iter().map(|t| t.date_parsed);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read and validate every artifact. One-shot, no retries: the first failing
/// artifact aborts the whole load.
pub fn load(sources: &SourcePaths) -> Result<DatasetBundle, LoadError> {
    let started = Instant::now();

    let result = load_all(sources);
    match &result {
        Ok(bundle) => {
            let counts = bundle.row_counts();
            info!(
                transactions = counts[0].1,
                monthly_trend = counts[2].1,
                segment_performance = counts[3].1,
                top_products = counts[4].1,
                customer_risk = counts[5].1,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Dataset bundle loaded"
            );
        }
        Err(e) => {
            warn!(artifact = %e.artifact(), "Dataset load failed: {e}");
        }
    }
    result
}

fn load_all(sources: &SourcePaths) -> Result<DatasetBundle, LoadError> {
    let transactions: Vec<TransactionFact> = read_table(Artifact::FactTable, &sources.fact_table)?;
    check_transactions(&transactions, &sources.fact_table)?;

    let kpis = read_kpi_document(&sources.kpi_document)?;

    let monthly_trend: Vec<MonthlyTrend> = read_table(Artifact::MonthlyTrend, &sources.monthly_trend)?;
    check_monthly_trend(&monthly_trend, &sources.monthly_trend)?;

    let segment_performance: Vec<SegmentPerformance> =
        read_table(Artifact::SegmentPerformance, &sources.segment_performance)?;
    check_segments(&segment_performance, &sources.segment_performance)?;

    let top_products: Vec<TopProduct> = read_table(Artifact::TopProducts, &sources.top_products)?;
    for (i, p) in top_products.iter().enumerate() {
        require_finite(Artifact::TopProducts, &sources.top_products, i, "revenue", p.revenue)?;
    }

    let customer_risk: Vec<CustomerRisk> = read_table(Artifact::CustomerRisk, &sources.customer_risk)?;
    for (i, r) in customer_risk.iter().enumerate() {
        require_finite(Artifact::CustomerRisk, &sources.customer_risk, i, "total_spent", r.total_spent)?;
    }

    Ok(DatasetBundle {
        transactions,
        kpis,
        monthly_trend,
        segment_performance,
        top_products,
        customer_risk,
    })
}

fn open_artifact(artifact: Artifact, path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::MissingArtifact {
            artifact,
            path: path.to_path_buf(),
        },
        _ => LoadError::malformed(artifact, path, format!("unreadable: {e}")),
    })
}

/// Read a delimited table with headers: schema check first, then typed rows.
pub fn read_table<T: DeserializeOwned>(artifact: Artifact, path: &Path) -> Result<Vec<T>, LoadError> {
    let file = open_artifact(artifact, path)?;
    parse_table(artifact, path, file)
}

pub fn parse_table<T: DeserializeOwned, R: Read>(
    artifact: Artifact,
    path: &Path,
    reader: R,
) -> Result<Vec<T>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| LoadError::malformed(artifact, path, format!("unreadable header: {e}")))?
        .clone();
    validate_headers(artifact, path, &headers)?;

    let mut rows = Vec::new();
    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: T = result.map_err(|e| {
            let line = e.position().map_or(idx as u64 + 2, |p| p.line());
            LoadError::malformed(artifact, path, format!("line {line}: {e}"))
        })?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_kpi_document(path: &Path) -> Result<KpiSnapshot, LoadError> {
    let artifact = Artifact::KpiDocument;
    let file = open_artifact(artifact, path)?;
    let doc: KpiDocument = serde_json::from_reader(io::BufReader::new(file))
        .map_err(|e| LoadError::malformed(artifact, path, e.to_string()))?;

    for (field, value) in doc.kpis.float_fields() {
        if !value.is_finite() {
            return Err(LoadError::malformed(artifact, path, format!("{field} is not finite")));
        }
    }
    Ok(doc.kpis)
}

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

/// `row` is the zero-based data row; reported as the file line (header is line 1).
fn require_finite(artifact: Artifact, path: &Path, row: usize, column: &str, value: f64) -> Result<(), LoadError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LoadError::malformed(
            artifact,
            path,
            format!("line {}: {column} is not a finite number", row + 2),
        ))
    }
}

fn check_transactions(rows: &[TransactionFact], path: &Path) -> Result<(), LoadError> {
    let artifact = Artifact::FactTable;
    for (i, t) in rows.iter().enumerate() {
        if t.customer_key.is_empty() {
            return Err(LoadError::malformed(artifact, path, format!("line {}: empty customer_key", i + 2)));
        }
        if t.item_key.is_empty() {
            return Err(LoadError::malformed(artifact, path, format!("line {}: empty item_key", i + 2)));
        }
        require_finite(artifact, path, i, "unit_price", t.unit_price)?;
        require_finite(artifact, path, i, "total_price", t.total_price)?;
    }
    Ok(())
}

fn check_monthly_trend(rows: &[MonthlyTrend], path: &Path) -> Result<(), LoadError> {
    let artifact = Artifact::MonthlyTrend;
    for (i, m) in rows.iter().enumerate() {
        require_finite(artifact, path, i, "revenue_millions", m.revenue_millions)?;
        if m.revenue_millions < 0.0 {
            return Err(LoadError::malformed(
                artifact,
                path,
                format!("line {}: negative revenue_millions {}", i + 2, m.revenue_millions),
            ));
        }
    }
    for (i, pair) in rows.windows(2).enumerate() {
        if pair[1].year_month <= pair[0].year_month {
            return Err(LoadError::malformed(
                artifact,
                path,
                format!(
                    "line {}: month {} does not follow {} (months must be strictly increasing)",
                    i + 3,
                    pair[1].year_month,
                    pair[0].year_month
                ),
            ));
        }
    }
    Ok(())
}

fn check_segments(rows: &[SegmentPerformance], path: &Path) -> Result<(), LoadError> {
    let artifact = Artifact::SegmentPerformance;
    let mut seen = HashSet::new();
    for (i, s) in rows.iter().enumerate() {
        if !seen.insert(s.customer_segment.as_str()) {
            return Err(LoadError::malformed(
                artifact,
                path,
                format!("line {}: duplicate customer_segment '{}'", i + 2, s.customer_segment),
            ));
        }
        require_finite(artifact, path, i, "revenue_millions", s.revenue_millions)?;
        if s.revenue_millions < 0.0 {
            return Err(LoadError::malformed(
                artifact,
                path,
                format!("line {}: negative revenue_millions {}", i + 2, s.revenue_millions),
            ));
        }
        require_finite(artifact, path, i, "revenue_share", s.revenue_share)?;
        require_finite(artifact, path, i, "avg_order_value", s.avg_order_value)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RiskLevel, YearMonth};

    fn p() -> &'static Path {
        Path::new("fixture.csv")
    }

    #[test]
    fn fact_table_parses_dates_and_optional_columns() {
        let csv_data = "\
customer_key,item_key,item_name,desc,unit_price,total_price,payment_key,date_parsed,customer_segment
C1,I1,Red Bull 12oz,Energy Drinks,2.50,5.00,P1,2023-01-05,Champions
C2,I2,,Chips,1.25,1.25,P2,2023-01-06 10:30:00,
";
        let rows: Vec<TransactionFact> = parse_table(Artifact::FactTable, p(), csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date_parsed, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(rows[0].customer_segment.as_deref(), Some("Champions"));
        assert_eq!(rows[1].date_parsed, NaiveDate::from_ymd_opt(2023, 1, 6).unwrap());
        assert!(rows[1].item_name.is_none());
    }

    #[test]
    fn fact_table_without_optional_columns_loads() {
        let csv_data = "\
customer_key,item_key,desc,unit_price,total_price,payment_key,date_parsed
C1,I1,Chips,1.0,2.0,P1,2023-02-01
";
        let rows: Vec<TransactionFact> = parse_table(Artifact::FactTable, p(), csv_data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].customer_segment.is_none());
    }

    #[test]
    fn malformed_date_reports_line_number() {
        let csv_data = "\
customer_key,item_key,desc,unit_price,total_price,payment_key,date_parsed
C1,I1,Chips,1.0,2.0,P1,2023-02-01
C2,I2,Chips,1.0,2.0,P2,not-a-date
";
        let err = parse_table::<TransactionFact, _>(Artifact::FactTable, p(), csv_data.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "msg={msg}");
        assert!(msg.contains("not-a-date"), "msg={msg}");
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        let csv_data = "item_name,revenue,transactions\nWidget,lots,3\n";
        let err = parse_table::<TopProduct, _>(Artifact::TopProducts, p(), csv_data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MalformedArtifact { artifact: Artifact::TopProducts, .. }));
    }

    #[test]
    fn unknown_risk_level_is_rejected_not_dropped() {
        let csv_data = "customer_key,total_spent,risk_level\nC1,10.0,Low\nC2,20.0,Severe\n";
        let err = parse_table::<CustomerRisk, _>(Artifact::CustomerRisk, p(), csv_data.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Severe"), "msg={msg}");
    }

    #[test]
    fn risk_levels_parse_into_closed_enum() {
        let csv_data = "customer_key,total_spent,risk_level\nC1,10.0,Low\nC2,20.0,Critical\n";
        let rows: Vec<CustomerRisk> = parse_table(Artifact::CustomerRisk, p(), csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].risk_level, RiskLevel::Low);
        assert_eq!(rows[1].risk_level, RiskLevel::Critical);
    }

    #[test]
    fn monthly_trend_must_strictly_increase() {
        let rows = vec![
            MonthlyTrend { year_month: YearMonth::new(2023, 2).unwrap(), revenue_millions: 1.0 },
            MonthlyTrend { year_month: YearMonth::new(2023, 2).unwrap(), revenue_millions: 1.5 },
        ];
        let err = check_monthly_trend(&rows, p()).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"), "err={err}");
    }

    #[test]
    fn monthly_trend_rejects_negative_revenue() {
        let rows = vec![MonthlyTrend { year_month: YearMonth::new(2023, 2).unwrap(), revenue_millions: -0.5 }];
        assert!(check_monthly_trend(&rows, p()).is_err());
    }

    #[test]
    fn duplicate_segment_is_rejected() {
        let csv_data = "\
customer_segment,customer_key,revenue_millions,revenue_share,avg_order_value
Loyal,10,1.0,50.0,20.0
Loyal,5,1.0,50.0,20.0
";
        let rows: Vec<SegmentPerformance> =
            parse_table(Artifact::SegmentPerformance, p(), csv_data.as_bytes()).unwrap();
        let err = check_segments(&rows, p()).unwrap_err();
        assert!(err.to_string().contains("duplicate customer_segment 'Loyal'"), "err={err}");
    }

    #[test]
    fn negative_segment_revenue_is_rejected() {
        let csv_data = "\
customer_segment,customer_key,revenue_millions,revenue_share,avg_order_value
Loyal,10,-1.0,50.0,20.0
";
        let rows: Vec<SegmentPerformance> =
            parse_table(Artifact::SegmentPerformance, p(), csv_data.as_bytes()).unwrap();
        let err = check_segments(&rows, p()).unwrap_err();
        assert_eq!(err.artifact(), Artifact::SegmentPerformance);
        assert!(err.to_string().contains("line 2: negative revenue_millions"), "err={err}");
    }

    #[test]
    fn refund_rows_are_valid_transactions() {
        let csv_data = "\
customer_key,item_key,desc,unit_price,total_price,payment_key,date_parsed
C1,I1,Returns,-3.0,-3.0,P1,2023-02-01
";
        let rows: Vec<TransactionFact> = parse_table(Artifact::FactTable, p(), csv_data.as_bytes()).unwrap();
        assert!(check_transactions(&rows, p()).is_ok());
    }

    #[test]
    fn counts_written_as_whole_floats_are_accepted() {
        let csv_data = "\
customer_segment,customer_key,revenue_millions,revenue_share,avg_order_value
Loyal,1500.0,5.0,50.0,30.0
";
        let rows: Vec<SegmentPerformance> =
            parse_table(Artifact::SegmentPerformance, p(), csv_data.as_bytes()).unwrap();
        assert_eq!(rows[0].customer_key, 1500);

        let fractional = csv_data.replace("1500.0", "1500.5");
        let err = parse_table::<SegmentPerformance, _>(Artifact::SegmentPerformance, p(), fractional.as_bytes())
            .unwrap_err();
        assert!(err.to_string().contains("whole"), "err={err}");
    }

    #[test]
    fn empty_customer_key_is_rejected() {
        let csv_data = "\
customer_key,item_key,desc,unit_price,total_price,payment_key,date_parsed
,I1,Chips,1.0,2.0,P1,2023-02-01
";
        let rows: Vec<TransactionFact> = parse_table(Artifact::FactTable, p(), csv_data.as_bytes()).unwrap();
        assert!(check_transactions(&rows, p()).is_err());
    }

    #[test]
    fn missing_file_is_missing_artifact() {
        let missing = Path::new("definitely/not/here/top_products.csv");
        let err = read_table::<TopProduct>(Artifact::TopProducts, missing).unwrap_err();
        assert_eq!(
            err,
            LoadError::MissingArtifact { artifact: Artifact::TopProducts, path: missing.to_path_buf() }
        );
    }

    #[test]
    fn source_paths_follow_conventional_layout() {
        let paths = SourcePaths::under("/srv/data");
        assert_eq!(paths.fact_table, Path::new("/srv/data/processed/master_dataset.csv"));
        assert_eq!(paths.kpi_document, Path::new("/srv/data/dashboard/kpis.json"));
        assert_eq!(paths.path(Artifact::CustomerRisk), Path::new("/srv/data/dashboard/customer_risk.csv"));
    }
}
