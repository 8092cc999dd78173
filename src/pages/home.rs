use std::collections::HashSet;

use crate::builders::{percentage_share, rename_and_round, top_n, SortDirection};
use crate::config::HOME_TOP_PRODUCTS;
use crate::error::ContractViolation;
use crate::format::{format_count, format_currency, format_millions};
use crate::frame::{to_frame, Value};
use crate::loader::DatasetBundle;
use crate::pages::view::{ChartKind, ChartSpec, DeltaTone, MetricTile, PageView, Section, TableView};
use crate::pages::Page;
use crate::types::KpiSnapshot;

pub fn render(bundle: &DatasetBundle) -> Result<PageView, ContractViolation> {
    let mut view = PageView::new(Page::Home);
    view.subtitle = Some("Executive Overview".to_string());

    view.sections.push(Section::Tiles {
        title: None,
        tiles: kpi_tiles(&bundle.kpis),
    });
    view.sections.push(Section::Chart(monthly_trend_chart(bundle)?));
    view.sections.push(Section::Chart(segment_share_chart(bundle)?));
    view.sections.push(Section::Chart(top_products_chart(
        bundle,
        HOME_TOP_PRODUCTS,
        &format!("Top {HOME_TOP_PRODUCTS} Products"),
    )?));
    view.sections.push(Section::Table(segment_table("Segment Performance Metrics", bundle)?));

    view.sidebar = data_summary(bundle);
    Ok(view)
}

fn kpi_tiles(kpis: &KpiSnapshot) -> Vec<MetricTile> {
    vec![
        MetricTile::new("Total Revenue", format_millions(kpis.revenue.total_revenue))
            .with_delta(format!("{:.2}% YoY", kpis.revenue.yoy_growth), DeltaTone::Normal),
        MetricTile::new("Total Customers", format_count(kpis.customers.total_customers))
            .with_delta(format!("{:.0}% Retention", kpis.customers.retention_rate), DeltaTone::Normal),
        MetricTile::new("Avg Order Value", format_currency(kpis.transactions.avg_order_value))
            .with_delta(format!("{:.2}%", kpis.transactions.aov_change), DeltaTone::Normal),
        MetricTile::new("Customers at Risk", format_count(kpis.churn.customers_at_risk))
            .with_delta(format!("-{:.1}%", kpis.churn.churn_risk_percentage), DeltaTone::Inverse),
    ]
}

fn monthly_trend_chart(bundle: &DatasetBundle) -> Result<ChartSpec, ContractViolation> {
    let frame = to_frame(&bundle.monthly_trend);
    ChartSpec::new("Monthly Revenue Trend", ChartKind::Line, "Month", "Revenue (Millions $)")
        .with_series(frame.labels("year_month")?, frame.numbers("revenue_millions")?)
}

fn segment_share_chart(bundle: &DatasetBundle) -> Result<ChartSpec, ContractViolation> {
    let frame = to_frame(&bundle.segment_performance);
    let revenue = frame.numbers("revenue_millions")?;
    let shares = percentage_share(&revenue)?;
    ChartSpec::new("Customer Segments", ChartKind::Share, "Segment", "Revenue (Millions $)")
        .with_series(frame.labels("customer_segment")?, revenue)?
        .with_shares(shares)
}

/// Highest-revenue products as horizontal bars, revenue in thousands.
pub(crate) fn top_products_chart(bundle: &DatasetBundle, n: usize, title: &str) -> Result<ChartSpec, ContractViolation> {
    let top = top_n(&to_frame(&bundle.top_products), n, "revenue", SortDirection::Descending)?;
    let thousands = top.numbers("revenue")?.into_iter().map(|r| r / 1_000.0).collect();
    ChartSpec::new(title, ChartKind::HorizontalBar, "Revenue (Thousands $)", "")
        .with_series(top.labels("item_name")?, thousands)
}

/// Segment table as displayed on both the overview and the customer page.
pub(crate) fn segment_table(title: &str, bundle: &DatasetBundle) -> Result<TableView, ContractViolation> {
    let display = rename_and_round(
        &to_frame(&bundle.segment_performance),
        &[
            ("customer_segment", "Segment"),
            ("customer_key", "Customers"),
            ("revenue_millions", "Revenue ($M)"),
            ("revenue_share", "Share (%)"),
        ],
        &[("Revenue ($M)", 2), ("Share (%)", 1)],
    )?;

    Ok(TableView::from_frame(title, &display, |column, value| match (column, value) {
        ("Customers", Value::Number(n)) => format_count(*n as u64),
        ("Revenue ($M)", Value::Number(n)) => format!("{n:.2}"),
        ("Share (%)", Value::Number(n)) => format!("{n:.1}"),
        (_, v) => v.to_string(),
    }))
}

fn data_summary(bundle: &DatasetBundle) -> Vec<String> {
    let customers: HashSet<&str> = bundle.transactions.iter().map(|t| t.customer_key.as_str()).collect();
    let products: HashSet<&str> = bundle.transactions.iter().map(|t| t.item_key.as_str()).collect();
    let range = bundle.date_range().map_or("n/a".to_string(), |(lo, hi)| {
        format!("{} to {}", lo.format("%Y-%m-%d"), hi.format("%Y-%m-%d"))
    });

    vec![
        "Data Summary".to_string(),
        format!("Records: {}", format_count(bundle.transactions.len() as u64)),
        format!("Date Range: {range}"),
        format!("Customers: {}", format_count(customers.len() as u64)),
        format!("Products: {}", products.len()),
    ]
}
