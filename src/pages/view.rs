//! Display-ready shapes produced by the page renderers. They carry formatted
//! strings and chart points only; no widget framework type appears here.

use crate::error::ContractViolation;
use crate::frame::{Frame, Value};
use crate::pages::Page;

/// How a tile's delta should be read: an increase is good, bad, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTone {
    Normal,
    /// Higher is worse, e.g. churn risk.
    Inverse,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
    pub tone: DeltaTone,
}

impl MetricTile {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta: None,
            tone: DeltaTone::Neutral,
        }
    }

    pub fn with_delta(mut self, delta: impl Into<String>, tone: DeltaTone) -> Self {
        self.delta = Some(delta.into());
        self.tone = tone;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// Render every cell of `frame` through `cell` (column name, value → text).
    pub fn from_frame(title: &str, frame: &Frame, cell: impl Fn(&str, &Value) -> String) -> Self {
        let columns = frame.columns().to_vec();
        let rows = frame
            .rows()
            .iter()
            .map(|r| r.iter().zip(&columns).map(|(v, c)| cell(c, v)).collect())
            .collect();
        Self {
            title: title.to_string(),
            columns,
            rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    /// Bars grow left to right, first point on top.
    HorizontalBar,
    VerticalBar,
    /// Part-of-whole; every point carries its percentage share.
    Share,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSpec {
    pub fn new(title: &str, kind: ChartKind, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            kind,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            points: Vec::new(),
        }
    }

    /// Pair `labels` with `values` in order. Both must have the same length.
    pub fn with_series(mut self, labels: Vec<String>, values: Vec<f64>) -> Result<Self, ContractViolation> {
        if labels.len() != values.len() {
            return Err(ContractViolation::OutOfDomain(format!(
                "chart '{}' has {} labels for {} values",
                self.title,
                labels.len(),
                values.len()
            )));
        }
        self.points = labels
            .into_iter()
            .zip(values)
            .map(|(label, value)| ChartPoint { label, value, share: None })
            .collect();
        Ok(self)
    }

    /// Attach percentage shares point by point.
    pub fn with_shares(mut self, shares: Vec<f64>) -> Result<Self, ContractViolation> {
        if shares.len() != self.points.len() {
            return Err(ContractViolation::OutOfDomain(format!(
                "chart '{}' has {} shares for {} points",
                self.title,
                shares.len(),
                self.points.len()
            )));
        }
        for (point, share) in self.points.iter_mut().zip(shares) {
            point.share = Some(share);
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Tiles { title: Option<String>, tiles: Vec<MetricTile> },
    Table(TableView),
    Chart(ChartSpec),
    Note { title: String, lines: Vec<String>, tone: NoteTone },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: Page,
    pub title: String,
    pub subtitle: Option<String>,
    pub sections: Vec<Section>,
    pub sidebar: Vec<String>,
}

impl PageView {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            title: page.title().to_string(),
            subtitle: None,
            sections: Vec::new(),
            sidebar: Vec::new(),
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.sections.iter().filter_map(|s| match s {
            Section::Chart(c) => Some(c),
            _ => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableView> {
        self.sections.iter().filter_map(|s| match s {
            Section::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn tiles(&self) -> impl Iterator<Item = &MetricTile> {
        self.sections
            .iter()
            .filter_map(|s| match s {
                Section::Tiles { tiles, .. } => Some(tiles),
                _ => None,
            })
            .flatten()
    }

    pub fn find_chart(&self, title: &str) -> Option<&ChartSpec> {
        self.charts().find(|c| c.title == title)
    }

    pub fn find_table(&self, title: &str) -> Option<&TableView> {
        self.tables().find(|t| t.title == title)
    }

    pub fn find_tile(&self, label: &str) -> Option<&MetricTile> {
        self.tiles().find(|t| t.label == label)
    }

    /// True when any section depends on loaded data.
    pub fn has_data_sections(&self) -> bool {
        self.sections.iter().any(|s| !matches!(s, Section::Note { .. }))
    }
}
