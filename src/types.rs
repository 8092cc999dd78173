use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// One named input file of a dataset bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    FactTable,
    KpiDocument,
    MonthlyTrend,
    SegmentPerformance,
    TopProducts,
    CustomerRisk,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Artifact::FactTable => "fact_table",
            Artifact::KpiDocument => "kpi_document",
            Artifact::MonthlyTrend => "monthly_trend",
            Artifact::SegmentPerformance => "segment_performance",
            Artifact::TopProducts => "top_products",
            Artifact::CustomerRisk => "customer_risk",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Transaction fact table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionFact {
    pub customer_key: String,
    pub item_key: String,
    #[serde(default)]
    pub item_name: Option<String>,
    /// Item description, used as the product category.
    pub desc: String,
    pub unit_price: f64,
    pub total_price: f64,
    pub payment_key: String,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date_parsed: NaiveDate,
    #[serde(default)]
    pub customer_segment: Option<String>,
}

// ---------------------------------------------------------------------------
// KPI snapshot
// ---------------------------------------------------------------------------

/// On-disk shape of the KPI document: the snapshot sits under a top-level `kpis` key.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiDocument {
    pub kpis: KpiSnapshot,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KpiSnapshot {
    pub revenue: RevenueKpis,
    pub customers: CustomerKpis,
    pub transactions: TransactionKpis,
    pub churn: ChurnKpis,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RevenueKpis {
    pub total_revenue: f64,
    /// Percent, may be negative.
    pub yoy_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerKpis {
    #[serde(deserialize_with = "deserialize_count")]
    pub total_customers: u64,
    pub retention_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionKpis {
    pub avg_order_value: f64,
    pub aov_change: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChurnKpis {
    #[serde(deserialize_with = "deserialize_count")]
    pub customers_at_risk: u64,
    pub churn_risk_percentage: f64,
}

impl KpiSnapshot {
    /// Named float fields, for finiteness checks at load time.
    pub fn float_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("revenue.total_revenue", self.revenue.total_revenue),
            ("revenue.yoy_growth", self.revenue.yoy_growth),
            ("customers.retention_rate", self.customers.retention_rate),
            ("transactions.avg_order_value", self.transactions.avg_order_value),
            ("transactions.aov_change", self.transactions.aov_change),
            ("churn.churn_risk_percentage", self.churn.churn_risk_percentage),
        ]
    }
}

// ---------------------------------------------------------------------------
// Aggregate tables
// ---------------------------------------------------------------------------

/// Calendar year-month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `YYYY-MM` or any full date/datetime accepted for transaction dates.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
            .ok()
            .or_else(|| parse_calendar_date(s).ok())
            .ok_or_else(|| format!("invalid year-month '{s}'"))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonthlyTrend {
    pub year_month: YearMonth,
    pub revenue_millions: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentPerformance {
    pub customer_segment: String,
    /// Number of distinct customers in the segment.
    #[serde(deserialize_with = "deserialize_count")]
    pub customer_key: u64,
    pub revenue_millions: f64,
    pub revenue_share: f64,
    pub avg_order_value: f64,
}

/// Row of the top-products table. File order (revenue descending) is the contract.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopProduct {
    pub item_name: String,
    pub revenue: f64,
    #[serde(deserialize_with = "deserialize_count")]
    pub transactions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Display order, lowest risk first.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRisk {
    pub customer_key: String,
    pub total_spent: f64,
    pub risk_level: RiskLevel,
}

// ---------------------------------------------------------------------------
// Date parsing
// ---------------------------------------------------------------------------

/// Parse an ISO date (`2023-04-01`) or datetime (`2023-04-01 13:45:00`,
/// `2023-04-01T13:45:00`, optional fractional seconds) down to its calendar date.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!("invalid date '{s}'"))
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_calendar_date(&s).map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Counts arrive as integers or, from dataframe exports, as whole floats (`1500.0`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Whole(u64),
    Float(f64),
}

pub fn count_from_f64(v: f64) -> Result<u64, String> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
        Ok(v as u64)
    } else {
        Err(format!("expected a whole non-negative count, found {v}"))
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawCount::deserialize(deserializer)? {
        RawCount::Whole(n) => Ok(n),
        RawCount::Float(v) => count_from_f64(v).map_err(serde::de::Error::custom),
    }
}
