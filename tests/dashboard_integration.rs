use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use retail_dashboard::app::{Dashboard, DataStatus};
use retail_dashboard::builders::{group_and_aggregate, percentage_share, Aggregation};
use retail_dashboard::error::LoadError;
use retail_dashboard::frame::to_frame;
use retail_dashboard::loader::{self, SourcePaths};
use retail_dashboard::pages::{text, Page};
use retail_dashboard::state::DatasetCache;
use retail_dashboard::types::Artifact;

// ---------------------------------------------------------------------------
// Fixture data set
// ---------------------------------------------------------------------------

/// Segment name, customers, spend per customer. Totals: 2.5M / 5.0M / 2.5M.
const SEGMENTS: &[(&str, usize, f64)] = &[
    ("Champions", 5, 500_000.0),
    ("Loyal", 15, 333_333.33),
    ("At Risk", 10, 250_000.0),
];

const SEGMENT_TABLE: &str = "\
customer_segment,customer_key,revenue_millions,revenue_share,avg_order_value
Champions,5,2.5,25.0,500000.0
Loyal,15,5.0,50.0,333333.33
At Risk,10,2.5,25.0,250000.0
";

const KPIS: &str = r#"{
  "kpis": {
    "revenue": {"total_revenue": 10000000.0, "yoy_growth": 8.25},
    "customers": {"total_customers": 30, "retention_rate": 76.0},
    "transactions": {"avg_order_value": 333333.33, "aov_change": 1.5},
    "churn": {"customers_at_risk": 10, "churn_risk_percentage": 33.3}
  }
}"#;

const MONTHLY_TRENDS: &str = "\
year_month,revenue_millions
2023-01,3.2
2023-02,3.3
2023-03,3.5
";

const TOP_PRODUCTS: &str = "\
item_name,revenue,transactions
Red Bull 12oz,4000000,12
Lays Classic,3000000,9
Coke 20oz,2000000,6
Trail Mix,1000000,3
";

const CUSTOMER_RISK: &str = "\
customer_key,total_spent,risk_level
C00,500000,Low
C01,500000,Low
C05,333333.33,Medium
C20,250000,High
C21,250000,Critical
";

/// One transaction per customer, so per-segment row counts equal customer counts.
fn fact_table() -> String {
    let mut out = String::from(
        "customer_key,item_key,item_name,desc,unit_price,total_price,payment_key,date_parsed,customer_segment\n",
    );
    let mut n = 0;
    for (segment, customers, spend) in SEGMENTS {
        for _ in 0..*customers {
            let category = if n % 2 == 0 { "Energy Drinks" } else { "Snacks" };
            out.push_str(&format!(
                "C{n:02},I{item},Item {item},{category},{spend},{spend},P{n:02},2023-01-{day:02},{segment}\n",
                item = n % 4,
                day = n % 28 + 1,
            ));
            n += 1;
        }
    }
    out
}

struct Fixture {
    dir: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("retail-dashboard-it-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("processed")).unwrap();
        fs::create_dir_all(dir.join("dashboard")).unwrap();

        let fixture = Self { dir };
        fixture.write("processed/master_dataset.csv", &fact_table());
        fixture.write("dashboard/kpis.json", KPIS);
        fixture.write("dashboard/monthly_trends.csv", MONTHLY_TRENDS);
        fixture.write("dashboard/segment_performance.csv", SEGMENT_TABLE);
        fixture.write("dashboard/top_products.csv", TOP_PRODUCTS);
        fixture.write("dashboard/customer_risk.csv", CUSTOMER_RISK);
        fixture
    }

    fn write(&self, relative: &str, contents: &str) {
        fs::write(self.dir.join(relative), contents).unwrap();
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }

    fn sources(&self) -> SourcePaths {
        SourcePaths::under(&self.dir)
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn assert_path_eq(actual: &Path, expected: &Path) {
    assert_eq!(actual, expected, "error should name the failing file");
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

#[test]
fn load_reports_exact_row_counts() {
    let fx = Fixture::new("counts");
    let bundle = loader::load(&fx.sources()).unwrap();

    assert_eq!(bundle.transactions.len(), 30);
    assert_eq!(bundle.monthly_trend.len(), 3);
    assert_eq!(bundle.segment_performance.len(), 3);
    assert_eq!(bundle.top_products.len(), 4);
    assert_eq!(bundle.customer_risk.len(), 5);
    assert_eq!(bundle.kpis.customers.total_customers, 30);
}

#[test]
fn missing_artifact_fails_whole_load() {
    let fx = Fixture::new("missing");
    fs::remove_file(fx.path("dashboard/customer_risk.csv")).unwrap();

    match loader::load(&fx.sources()) {
        Err(LoadError::MissingArtifact { artifact, path }) => {
            assert_eq!(artifact, Artifact::CustomerRisk);
            assert_path_eq(&path, &fx.path("dashboard/customer_risk.csv"));
        }
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
}

#[test]
fn truncated_row_is_malformed() {
    let fx = Fixture::new("truncated");
    let mut facts = fact_table();
    facts.push_str("C99,I1,Item 1,Sna");
    fx.write("processed/master_dataset.csv", &facts);

    let cache = DatasetCache::new();
    match cache.get_or_load(&fx.sources()) {
        Err(LoadError::MalformedArtifact { artifact, path, detail }) => {
            assert_eq!(artifact, Artifact::FactTable);
            assert_path_eq(&path, &fx.path("processed/master_dataset.csv"));
            assert!(detail.contains("fields"), "detail={detail}");
        }
        other => panic!("expected MalformedArtifact, got {other:?}"),
    }
    assert!(cache.is_empty(), "a failed load must not be cached");
}

/// Relative path of every artifact in the conventional layout.
const LAYOUT: &[(Artifact, &str)] = &[
    (Artifact::FactTable, "processed/master_dataset.csv"),
    (Artifact::KpiDocument, "dashboard/kpis.json"),
    (Artifact::MonthlyTrend, "dashboard/monthly_trends.csv"),
    (Artifact::SegmentPerformance, "dashboard/segment_performance.csv"),
    (Artifact::TopProducts, "dashboard/top_products.csv"),
    (Artifact::CustomerRisk, "dashboard/customer_risk.csv"),
];

/// Broken variants of each artifact: cut off mid-record, emptied, or missing a required key.
fn corruptions(artifact: Artifact) -> Vec<String> {
    let cut = |s: &str, n: usize| s[..s.len() - n].to_string();
    match artifact {
        Artifact::FactTable => vec![format!("{}C99,I1,Item 1,Sna", fact_table()), String::new()],
        Artifact::KpiDocument => vec![
            cut(KPIS, KPIS.len() / 2),
            String::new(),
            KPIS.replace(r#""churn": {"customers_at_risk": 10, "churn_risk_percentage": 33.3}"#, r#""churn": {}"#),
        ],
        Artifact::MonthlyTrend => vec![format!("{MONTHLY_TRENDS}2023-04"), String::new()],
        Artifact::SegmentPerformance => vec![cut(SEGMENT_TABLE, 12), String::new()],
        Artifact::TopProducts => vec![format!("{TOP_PRODUCTS}Chips,"), String::new()],
        Artifact::CustomerRisk => vec![format!("{CUSTOMER_RISK}C30,12"), String::new()],
    }
}

#[test]
fn any_deleted_or_broken_artifact_fails_load_naming_it() {
    for (n, &(artifact, relative)) in LAYOUT.iter().enumerate() {
        let fx = Fixture::new(&format!("deleted-{n}"));
        fs::remove_file(fx.path(relative)).unwrap();
        match loader::load(&fx.sources()) {
            Err(LoadError::MissingArtifact { artifact: named, path }) => {
                assert_eq!(named, artifact, "deleting {relative}");
                assert_path_eq(&path, &fx.path(relative));
            }
            other => panic!("deleting {relative}: expected MissingArtifact, got {other:?}"),
        }

        for (m, contents) in corruptions(artifact).into_iter().enumerate() {
            let fx = Fixture::new(&format!("broken-{n}-{m}"));
            fx.write(relative, &contents);
            match loader::load(&fx.sources()) {
                Err(LoadError::MalformedArtifact { artifact: named, path, .. }) => {
                    assert_eq!(named, artifact, "breaking {relative} with {contents:?}");
                    assert_path_eq(&path, &fx.path(relative));
                }
                other => panic!("breaking {relative} with {contents:?}: expected MalformedArtifact, got {other:?}"),
            }
        }
    }
}

#[test]
fn renamed_column_is_caught_by_schema_check() {
    let fx = Fixture::new("schema");
    fx.write("dashboard/top_products.csv", "product,revenue,transactions\nRed Bull,1,1\n");

    let err = loader::load(&fx.sources()).unwrap_err();
    assert_eq!(err.artifact(), Artifact::TopProducts);
    assert!(err.to_string().contains("item_name"), "err={err}");
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[test]
fn cache_reuses_bundle_until_invalidated() {
    let fx = Fixture::new("cache");
    let sources = fx.sources();
    let cache = DatasetCache::new();

    let first = cache.get_or_load(&sources).unwrap();
    let second = cache.get_or_load(&sources).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.load_count(), 1);

    // Files changed on disk are not noticed until the entry is invalidated.
    fx.write("dashboard/top_products.csv", "item_name,revenue,transactions\nOnly One,5,1\n");
    assert_eq!(cache.get_or_load(&sources).unwrap().top_products.len(), 4);

    assert!(cache.invalidate(&sources));
    let reloaded = cache.get_or_load(&sources).unwrap();
    assert_eq!(reloaded.top_products.len(), 1);
    assert_eq!(cache.load_count(), 2);
}

// ---------------------------------------------------------------------------
// Builders over loaded data
// ---------------------------------------------------------------------------

#[test]
fn segment_table_is_reproduced_from_transactions() {
    let fx = Fixture::new("reconcile");
    let bundle = loader::load(&fx.sources()).unwrap();

    let per_segment = group_and_aggregate(
        &to_frame(&bundle.transactions),
        "customer_segment",
        &[
            Aggregation::sum("total_price", "revenue"),
            Aggregation::count("customer_key", "customers"),
        ],
    )
    .unwrap();

    let labels = per_segment.labels("customer_segment").unwrap();
    let revenue = per_segment.numbers("revenue").unwrap();
    let customers = per_segment.numbers("customers").unwrap();
    let shares = percentage_share(&revenue).unwrap();

    for expected in &bundle.segment_performance {
        let i = labels
            .iter()
            .position(|l| *l == expected.customer_segment)
            .unwrap_or_else(|| panic!("segment {} missing", expected.customer_segment));
        assert_eq!(customers[i] as u64, expected.customer_key, "customers for {}", labels[i]);
        assert!(
            (revenue[i] / 1_000_000.0 - expected.revenue_millions).abs() < 0.01,
            "revenue for {}: {}",
            labels[i],
            revenue[i]
        );
        assert!(
            (shares[i] - expected.revenue_share).abs() < 0.1,
            "share for {}: {}",
            labels[i],
            shares[i]
        );
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[test]
fn every_page_renders_from_loaded_files() {
    let fx = Fixture::new("pages");
    let cache = DatasetCache::new();

    for page in Page::ALL {
        let dashboard = Dashboard::new(Arc::clone(&cache), fx.sources(), page).unwrap();
        if page.needs_data() {
            assert_eq!(dashboard.status(), &DataStatus::Loaded { records: 30 }, "page {page}");
            assert!(dashboard.view().has_data_sections(), "page {page}");
        } else {
            assert_eq!(dashboard.status(), &DataStatus::NotNeeded, "page {page}");
        }

        let mut out = Vec::new();
        text::write_page(&mut out, dashboard.view()).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.starts_with(page.title()), "page {page}:\n{rendered}");
    }
    assert_eq!(cache.load_count(), 1, "pages share one cached bundle");
}

#[test]
fn refund_driven_negative_category_still_renders_products() {
    let fx = Fixture::new("refunds");
    let mut facts = fact_table();
    facts.push_str("C00,I9,Returned Case,Returns,-5000000,-5000000,P99,2023-01-15,Champions\n");
    fx.write("processed/master_dataset.csv", &facts);

    let dashboard = Dashboard::new(DatasetCache::new(), fx.sources(), Page::ProductPerformance).unwrap();
    assert_eq!(dashboard.status(), &DataStatus::Loaded { records: 31 });

    let mut out = Vec::new();
    text::write_page(&mut out, dashboard.view()).unwrap();
    let rendered = String::from_utf8(out).unwrap();
    let share_line = rendered
        .lines()
        .skip_while(|l| !l.contains("## Category Revenue Share"))
        .find(|l| l.trim_start().starts_with("Returns"))
        .unwrap_or_else(|| panic!("no Returns slice in:\n{rendered}"));
    assert!(share_line.trim_end().ends_with("0.0%"), "line={share_line}");
}

#[test]
fn home_page_reflects_fixture_kpis() {
    let fx = Fixture::new("home");
    let dashboard = Dashboard::new(DatasetCache::new(), fx.sources(), Page::Home).unwrap();
    let view = dashboard.view();

    assert_eq!(view.find_tile("Total Revenue").unwrap().value, "$10.0M");
    assert_eq!(view.find_tile("Customers at Risk").unwrap().value, "10");
    assert!(view.sidebar.iter().any(|l| l == "Date Range: 2023-01-01 to 2023-01-28"));

    let table = view.find_table("Segment Performance Metrics").unwrap();
    assert_eq!(table.rows[1], ["Loyal", "15", "5.00", "50.0"]);
}

#[test]
fn broken_files_show_banner_and_recover_on_reload() {
    let fx = Fixture::new("recover");
    fs::remove_file(fx.path("dashboard/kpis.json")).unwrap();

    let mut dashboard = Dashboard::new(DatasetCache::new(), fx.sources(), Page::Home).unwrap();
    assert_eq!(dashboard.status(), &DataStatus::Unavailable { artifact: Artifact::KpiDocument });
    assert!(!dashboard.view().has_data_sections());

    fx.write("dashboard/kpis.json", KPIS);
    dashboard.reload().unwrap();
    assert_eq!(dashboard.status(), &DataStatus::Loaded { records: 30 });
}
