//! Plain-text rendering of a page view, for non-interactive terminals.

use std::io::{self, Write};

use crate::format::truncate;
use crate::pages::view::{ChartKind, ChartSpec, MetricTile, NoteTone, PageView, Section, TableView};

const BAR_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 28;

pub fn write_page<W: Write>(out: &mut W, view: &PageView) -> io::Result<()> {
    writeln!(out, "{}", view.title)?;
    writeln!(out, "{}", "=".repeat(view.title.chars().count()))?;
    if let Some(subtitle) = &view.subtitle {
        writeln!(out, "{subtitle}")?;
    }

    for section in &view.sections {
        writeln!(out)?;
        match section {
            Section::Tiles { title, tiles } => write_tiles(out, title.as_deref(), tiles)?,
            Section::Table(table) => write_table(out, table)?,
            Section::Chart(chart) => write_chart(out, chart)?,
            Section::Note { title, lines, tone } => {
                let marker = match tone {
                    NoteTone::Info => "i",
                    NoteTone::Success => "+",
                    NoteTone::Warning => "!",
                    NoteTone::Error => "x",
                };
                writeln!(out, "[{marker}] {title}")?;
                for line in lines {
                    writeln!(out, "    {line}")?;
                }
            }
        }
    }

    if !view.sidebar.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(BAR_WIDTH))?;
        for line in &view.sidebar {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

fn write_tiles<W: Write>(out: &mut W, title: Option<&str>, tiles: &[MetricTile]) -> io::Result<()> {
    if let Some(title) = title {
        writeln!(out, "## {title}")?;
    }
    for tile in tiles {
        match &tile.delta {
            Some(delta) => writeln!(out, "  {:<22} {:>12}  ({delta})", tile.label, tile.value)?,
            None => writeln!(out, "  {:<22} {:>12}", tile.label, tile.value)?,
        }
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, table: &TableView) -> io::Result<()> {
    writeln!(out, "## {}", table.title)?;
    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            table
                .rows
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    writeln!(out, "  {}", line(&table.columns))?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "  {}", line(&rule))?;
    for row in &table.rows {
        writeln!(out, "  {}", line(row))?;
    }
    Ok(())
}

fn write_chart<W: Write>(out: &mut W, chart: &ChartSpec) -> io::Result<()> {
    writeln!(out, "## {}", chart.title)?;
    if chart.points.is_empty() {
        writeln!(out, "  (no data)")?;
        return Ok(());
    }
    let max = chart.points.iter().map(|p| p.value).fold(0.0_f64, f64::max);

    for point in &chart.points {
        let label = truncate(&point.label, LABEL_WIDTH);
        match chart.kind {
            ChartKind::Line => writeln!(out, "  {label:<LABEL_WIDTH$} {:>10.2}", point.value)?,
            ChartKind::HorizontalBar | ChartKind::VerticalBar => {
                writeln!(out, "  {label:<LABEL_WIDTH$} {} {:.2}", bar(point.value, max), point.value)?
            }
            ChartKind::Share => {
                let share = point.share.unwrap_or(0.0);
                writeln!(
                    out,
                    "  {label:<LABEL_WIDTH$} {} {share:>5.1}%",
                    bar(share, 100.0)
                )?
            }
        }
    }
    if !chart.y_label.is_empty() || !chart.x_label.is_empty() {
        writeln!(out, "  ({} / {})", chart.x_label, chart.y_label)?;
    }
    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    let filled = if max > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize
    } else {
        0
    };
    format!("{}{}", "█".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}
