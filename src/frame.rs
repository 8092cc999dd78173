//! Column-named table of typed cells, the common input of the generic view builders.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

use crate::error::ContractViolation;
use crate::types::{CustomerRisk, MonthlyTrend, SegmentPerformance, TopProduct, TransactionFact, YearMonth};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Month(YearMonth),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::Month(_) => "month",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Empty text, which is how an absent optional field enters a frame.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Ordering between cells of the same kind; `None` across kinds.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => Some(a.total_cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Month(a), Value::Month(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Month(m) => write!(f, "{m}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build from column names and rows. Every row must match the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, ContractViolation> {
        let mut frame = Self::new(columns);
        for row in rows {
            frame.push_row(row)?;
        }
        Ok(frame)
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ContractViolation> {
        if row.len() != self.columns.len() {
            return Err(ContractViolation::OutOfDomain(format!(
                "row has {} cells, frame has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, ContractViolation> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ContractViolation::UnknownColumn {
                column: name.to_string(),
                available: self.columns.join(", "),
            })
    }

    /// Every cell of a numeric column, in row order.
    pub fn numbers(&self, column: &str) -> Result<Vec<f64>, ContractViolation> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, r)| expect_number(&r[idx], column, row))
            .collect()
    }

    /// Every cell of a column rendered as text, in row order.
    pub fn labels(&self, column: &str) -> Result<Vec<String>, ContractViolation> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(|r| r[idx].to_string()).collect())
    }
}

pub(crate) fn expect_number(value: &Value, column: &str, row: usize) -> Result<f64, ContractViolation> {
    value.as_number().ok_or_else(|| ContractViolation::WrongCellType {
        column: column.to_string(),
        row,
        expected: "number",
        found: value.kind(),
    })
}

// ---------------------------------------------------------------------------
// Typed tables → Frame
// ---------------------------------------------------------------------------

/// A typed row that can be projected into a `Frame`.
pub trait Record {
    fn columns() -> Vec<&'static str>;
    fn cells(&self) -> Vec<Value>;
}

pub fn to_frame<R: Record>(records: &[R]) -> Frame {
    Frame {
        columns: R::columns().into_iter().map(str::to_string).collect(),
        rows: records.iter().map(Record::cells).collect(),
    }
}

fn optional_text(v: &Option<String>) -> Value {
    Value::Text(v.clone().unwrap_or_default())
}

impl Record for TransactionFact {
    fn columns() -> Vec<&'static str> {
        vec![
            "customer_key",
            "item_key",
            "item_name",
            "desc",
            "unit_price",
            "total_price",
            "payment_key",
            "date_parsed",
            "customer_segment",
        ]
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.customer_key.clone()),
            Value::Text(self.item_key.clone()),
            optional_text(&self.item_name),
            Value::Text(self.desc.clone()),
            Value::Number(self.unit_price),
            Value::Number(self.total_price),
            Value::Text(self.payment_key.clone()),
            Value::Date(self.date_parsed),
            optional_text(&self.customer_segment),
        ]
    }
}

impl Record for MonthlyTrend {
    fn columns() -> Vec<&'static str> {
        vec!["year_month", "revenue_millions"]
    }

    fn cells(&self) -> Vec<Value> {
        vec![Value::Month(self.year_month), Value::Number(self.revenue_millions)]
    }
}

impl Record for SegmentPerformance {
    fn columns() -> Vec<&'static str> {
        vec![
            "customer_segment",
            "customer_key",
            "revenue_millions",
            "revenue_share",
            "avg_order_value",
        ]
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.customer_segment.clone()),
            Value::from(self.customer_key),
            Value::Number(self.revenue_millions),
            Value::Number(self.revenue_share),
            Value::Number(self.avg_order_value),
        ]
    }
}

impl Record for TopProduct {
    fn columns() -> Vec<&'static str> {
        vec!["item_name", "revenue", "transactions"]
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.item_name.clone()),
            Value::Number(self.revenue),
            Value::from(self.transactions),
        ]
    }
}

impl Record for CustomerRisk {
    fn columns() -> Vec<&'static str> {
        vec!["customer_key", "total_spent", "risk_level"]
    }

    fn cells(&self) -> Vec<Value> {
        vec![
            Value::Text(self.customer_key.clone()),
            Value::Number(self.total_spent),
            Value::Text(self.risk_level.to_string()),
        ]
    }
}
