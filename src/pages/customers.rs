use crate::builders::{percentage_share, risk_level_rollup};
use crate::error::ContractViolation;
use crate::format::{format_count, format_currency, format_currency_whole, format_in_millions};
use crate::frame::to_frame;
use crate::loader::DatasetBundle;
use crate::pages::home::segment_table;
use crate::pages::view::{ChartKind, ChartSpec, DeltaTone, MetricTile, NoteTone, PageView, Section};
use crate::pages::Page;

const RECOMMENDATIONS: &[&str] = &[
    "Champions: Implement VIP loyalty program",
    "Loyal Customers: Launch upsell campaigns",
    "At Risk: Immediate retention outreach",
    "Low Engagement: Targeted win-back offers with 10-15% discount",
];

pub fn render(bundle: &DatasetBundle) -> Result<PageView, ContractViolation> {
    let mut view = PageView::new(Page::CustomerInsights);
    view.subtitle = Some("Customer Segmentation Analysis".to_string());

    let segments = to_frame(&bundle.segment_performance);
    let labels = segments.labels("customer_segment")?;
    let customers = segments.numbers("customer_key")?;
    let revenue = segments.numbers("revenue_millions")?;
    let aov = segments.numbers("avg_order_value")?;

    let avg_aov = if aov.is_empty() {
        "n/a".to_string()
    } else {
        format_currency(aov.iter().sum::<f64>() / aov.len() as f64)
    };
    view.sections.push(Section::Tiles {
        title: None,
        tiles: vec![
            MetricTile::new("Total Customers", format_count(customers.iter().sum::<f64>() as u64)),
            MetricTile::new("Total Revenue", format_in_millions(revenue.iter().sum())),
            MetricTile::new("Avg Order Value", avg_aov),
        ],
    });

    view.sections.push(Section::Chart(
        ChartSpec::new("Segment Revenue Distribution", ChartKind::VerticalBar, "Segment", "Revenue (Millions $)")
            .with_series(labels.clone(), revenue)?,
    ));

    let customer_shares = percentage_share(&customers)?;
    view.sections.push(Section::Chart(
        ChartSpec::new("Customer Distribution", ChartKind::Share, "Segment", "Customers")
            .with_series(labels, customers)?
            .with_shares(customer_shares)?,
    ));

    let buckets = risk_level_rollup(&bundle.customer_risk);
    view.sections.push(Section::Tiles {
        title: Some("Churn Risk Analysis".to_string()),
        tiles: buckets
            .iter()
            .map(|b| {
                MetricTile::new(format!("{} Risk", b.level), format_count(b.customers))
                    .with_delta(format!("{} spent", format_currency_whole(b.total_spent)), DeltaTone::Neutral)
            })
            .collect(),
    });

    view.sections.push(Section::Chart(
        ChartSpec::new("Risk Distribution", ChartKind::VerticalBar, "Risk Level", "Number of Customers").with_series(
            buckets.iter().map(|b| b.level.to_string()).collect(),
            buckets.iter().map(|b| b.customers as f64).collect(),
        )?,
    ));

    view.sections.push(Section::Table(segment_table("Segment Performance Table", bundle)?));

    view.sections.push(Section::Note {
        title: "Recommendations".to_string(),
        lines: RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        tone: NoteTone::Info,
    });

    Ok(view)
}
