pub mod customers;
pub mod home;
pub mod placeholder;
pub mod products;
pub mod text;
pub mod view;

use std::fmt;
use std::str::FromStr;

use crate::error::{ContractViolation, LoadError};
use crate::loader::DatasetBundle;

pub use view::{ChartKind, ChartPoint, ChartSpec, DeltaTone, MetricTile, NoteTone, PageView, Section, TableView};

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    CustomerInsights,
    ProductPerformance,
    GeographicAnalysis,
    PricingOptimizer,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 5] = [
        Page::Home,
        Page::CustomerInsights,
        Page::ProductPerformance,
        Page::GeographicAnalysis,
        Page::PricingOptimizer,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Retail Analytics Dashboard",
            Page::CustomerInsights => "Customer Insights & Segmentation",
            Page::ProductPerformance => "Product Performance Analysis",
            Page::GeographicAnalysis => "Geographic Analysis",
            Page::PricingOptimizer => "Pricing Optimizer",
        }
    }

    /// Short name used in navigation.
    pub fn nav_label(self) -> &'static str {
        match self {
            Page::Home => "Home Dashboard",
            Page::CustomerInsights => "Customer Insights",
            Page::ProductPerformance => "Product Performance",
            Page::GeographicAnalysis => "Geographic Analysis",
            Page::PricingOptimizer => "Pricing Optimizer",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::CustomerInsights => "customers",
            Page::ProductPerformance => "products",
            Page::GeographicAnalysis => "geography",
            Page::PricingOptimizer => "pricing",
        }
    }

    /// Placeholder pages render without touching the dataset.
    pub fn needs_data(self) -> bool {
        !matches!(self, Page::GeographicAnalysis | Page::PricingOptimizer)
    }

    pub fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn prev(self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Page::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Page::ALL.iter().map(|p| p.slug()).collect();
                format!("unknown page '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Build the full view of `page` from a loaded bundle.
pub fn render_page(page: Page, bundle: &DatasetBundle) -> Result<PageView, ContractViolation> {
    let mut view = match page {
        Page::Home => home::render(bundle)?,
        Page::CustomerInsights => customers::render(bundle)?,
        Page::ProductPerformance => products::render(bundle)?,
        Page::GeographicAnalysis | Page::PricingOptimizer => placeholder::render(page),
    };
    let mut sidebar = navigation_sidebar(page);
    sidebar.append(&mut view.sidebar);
    view.sidebar = sidebar;
    Ok(view)
}

/// View of a page that does not need the dataset.
pub fn render_static(page: Page) -> PageView {
    let mut view = placeholder::render(page);
    view.sidebar = navigation_sidebar(page);
    view
}

/// View shown when the dataset could not be loaded: an error banner and nothing data-dependent.
pub fn unavailable_page(page: Page, error: &LoadError) -> PageView {
    let mut view = PageView::new(page);
    view.sections.push(Section::Note {
        title: "Error loading data".to_string(),
        lines: vec![error.to_string()],
        tone: NoteTone::Error,
    });
    view.sidebar = navigation_sidebar(page);
    view
}

fn navigation_sidebar(current: Page) -> Vec<String> {
    let mut lines = vec![
        "Navigation".to_string(),
        format!("Current Page: {}", current.nav_label()),
        "Other Pages:".to_string(),
    ];
    lines.extend(
        Page::ALL
            .iter()
            .filter(|p| **p != current)
            .map(|p| format!("- {}", p.nav_label())),
    );
    lines
}
