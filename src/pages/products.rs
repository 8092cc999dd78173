use crate::builders::{group_and_aggregate, percentage_share, rename_and_round, top_n, Aggregation, SortDirection};
use crate::config::{PRODUCT_PAGE_TOP_PRODUCTS, TOP_CATEGORIES};
use crate::error::ContractViolation;
use crate::format::{format_count, format_currency_whole, format_millions, format_thousands};
use crate::frame::{to_frame, Frame, Value};
use crate::loader::DatasetBundle;
use crate::pages::home::top_products_chart;
use crate::pages::view::{ChartKind, ChartSpec, MetricTile, NoteTone, PageView, Section, TableView};
use crate::pages::Page;

const TOP_PERFORMERS: &[&str] = &[
    "Top Performers:",
    "- Red Bull 12oz: $1.3M revenue (energy drinks highly profitable)",
    "- Coffee K-Cups: Multiple top sellers, high margin category",
    "Opportunities:",
    "- Expand Coffee K-Cups inventory (proven high performers)",
    "- Promote Energy/Protein beverages (premium pricing)",
    "- Focus on Healthy Food category (largest revenue generator)",
];

const MONITOR: &[&str] = &[
    "- Chips category showing declining trend",
    "- Consider price reduction to boost volume",
];

pub fn render(bundle: &DatasetBundle) -> Result<PageView, ContractViolation> {
    let mut view = PageView::new(Page::ProductPerformance);
    view.subtitle = Some("Product Overview".to_string());

    let products = to_frame(&bundle.top_products);
    let revenue = products.numbers("revenue")?;
    let avg_revenue = if revenue.is_empty() {
        "n/a".to_string()
    } else {
        format_thousands(revenue.iter().sum::<f64>() / revenue.len() as f64)
    };
    view.sections.push(Section::Tiles {
        title: None,
        tiles: vec![
            MetricTile::new("Total Products", products.len().to_string()),
            MetricTile::new("Total Revenue", format_millions(revenue.iter().sum())),
            MetricTile::new("Avg Product Revenue", avg_revenue),
        ],
    });

    let n = PRODUCT_PAGE_TOP_PRODUCTS;
    view.sections.push(Section::Chart(top_products_chart(
        bundle,
        n,
        &format!("Top {n} Products by Revenue"),
    )?));
    view.sections.push(Section::Table(top_products_table(&products, n)?));

    let categories = category_performance(bundle)?;
    view.sections.push(Section::Chart(
        ChartSpec::new(
            &format!("Top {TOP_CATEGORIES} Categories by Revenue"),
            ChartKind::VerticalBar,
            "",
            "Revenue ($)",
        )
        .with_series(categories.labels("category")?, categories.numbers("revenue")?)?,
    ));
    // Refunds can leave a category net negative; it takes no slice of the share.
    let category_revenue: Vec<f64> = categories.numbers("revenue")?.into_iter().map(|r| r.max(0.0)).collect();
    let shares = percentage_share(&category_revenue)?;
    view.sections.push(Section::Chart(
        ChartSpec::new("Category Revenue Share", ChartKind::Share, "Category", "Revenue ($)")
            .with_series(categories.labels("category")?, category_revenue)?
            .with_shares(shares)?,
    ));

    view.sections.push(Section::Note {
        title: "Product Insights & Recommendations".to_string(),
        lines: TOP_PERFORMERS.iter().map(|s| s.to_string()).collect(),
        tone: NoteTone::Success,
    });
    view.sections.push(Section::Note {
        title: "Monitor".to_string(),
        lines: MONITOR.iter().map(|s| s.to_string()).collect(),
        tone: NoteTone::Warning,
    });

    Ok(view)
}

fn top_products_table(products: &Frame, n: usize) -> Result<TableView, ContractViolation> {
    let top = top_n(products, n, "revenue", SortDirection::Descending)?;
    let display = rename_and_round(
        &top,
        &[("item_name", "Product"), ("revenue", "Revenue ($)"), ("transactions", "Orders")],
        &[],
    )?;
    Ok(TableView::from_frame("Top Products Data", &display, |column, value| {
        match (column, value) {
            ("Revenue ($)", Value::Number(n)) => format_currency_whole(*n),
            ("Orders", Value::Number(n)) => format_count(*n as u64),
            (_, v) => v.to_string(),
        }
    }))
}

/// Revenue and transaction count per item category from the fact table,
/// highest revenue first, limited to the top categories.
pub fn category_performance(bundle: &DatasetBundle) -> Result<Frame, ContractViolation> {
    let per_category = group_and_aggregate(
        &to_frame(&bundle.transactions),
        "desc",
        &[
            Aggregation::sum("total_price", "revenue"),
            Aggregation::count("payment_key", "transactions"),
        ],
    )?;
    let renamed = rename_and_round(
        &per_category,
        &[("desc", "category"), ("revenue", "revenue"), ("transactions", "transactions")],
        &[],
    )?;
    top_n(&renamed, TOP_CATEGORIES, "revenue", SortDirection::Descending)
}
