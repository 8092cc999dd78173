use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ContractViolation;
use crate::loader::SourcePaths;
use crate::pages::{self, Page, PageView};
use crate::state::DatasetCache;
use crate::types::Artifact;

// ---------------------------------------------------------------------------
// Data status
// ---------------------------------------------------------------------------

/// What backed the most recent render cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DataStatus {
    /// The page renders without the dataset.
    NotNeeded,
    Loaded { records: usize },
    Unavailable { artifact: Artifact },
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Session state shared by the interactive and text front ends: the current
/// page and the view produced by the last render cycle.
pub struct Dashboard {
    cache: Arc<DatasetCache>,
    sources: SourcePaths,
    page: Page,
    view: PageView,
    status: DataStatus,
}

impl Dashboard {
    /// Run the first render cycle for `page`.
    pub fn new(cache: Arc<DatasetCache>, sources: SourcePaths, page: Page) -> Result<Self, ContractViolation> {
        let mut dashboard = Self {
            cache,
            sources,
            page,
            view: PageView::new(page),
            status: DataStatus::NotNeeded,
        };
        dashboard.render()?;
        Ok(dashboard)
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn status(&self) -> &DataStatus {
        &self.status
    }

    pub fn sources(&self) -> &SourcePaths {
        &self.sources
    }

    pub fn cache(&self) -> &Arc<DatasetCache> {
        &self.cache
    }

    pub fn select(&mut self, page: Page) -> Result<(), ContractViolation> {
        if page == self.page {
            return Ok(());
        }
        self.page = page;
        self.render()
    }

    pub fn next_page(&mut self) -> Result<(), ContractViolation> {
        self.select(self.page.next())
    }

    pub fn prev_page(&mut self) -> Result<(), ContractViolation> {
        self.select(self.page.prev())
    }

    /// Forget the bundle for this session's path set and render from freshly read files.
    pub fn reload(&mut self) -> Result<(), ContractViolation> {
        self.cache.invalidate(&self.sources);
        self.render()
    }

    /// Drop every cached bundle, then render again.
    pub fn clear_cache(&mut self) -> Result<(), ContractViolation> {
        self.cache.clear();
        self.render()
    }

    /// One render cycle. Load failures become an error banner; contract
    /// violations from the builders are returned to the caller.
    pub fn render(&mut self) -> Result<(), ContractViolation> {
        let (view, status) = if self.page.needs_data() {
            match self.cache.get_or_load(&self.sources) {
                Ok(bundle) => (
                    pages::render_page(self.page, &bundle)?,
                    DataStatus::Loaded {
                        records: bundle.transactions.len(),
                    },
                ),
                Err(e) => {
                    warn!(page = %self.page, "Rendering error banner: {e}");
                    (
                        pages::unavailable_page(self.page, &e),
                        DataStatus::Unavailable { artifact: e.artifact() },
                    )
                }
            }
        } else {
            (pages::render_static(self.page), DataStatus::NotNeeded)
        };

        debug!(page = %self.page, sections = view.sections.len(), "Page rendered");
        self.view = view;
        self.status = status;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{fixtures, NoteTone, Section};

    fn missing_dir() -> SourcePaths {
        SourcePaths::under(std::env::temp_dir().join(format!("retail-dashboard-missing-{}", std::process::id())))
    }

    /// A cache already holding the fixture bundle under `sources`.
    fn warm_cache(sources: &SourcePaths) -> Arc<DatasetCache> {
        let cache = DatasetCache::new();
        cache.get_or_load_with(sources, |_| Ok(fixtures::bundle())).unwrap();
        cache
    }

    #[test]
    fn renders_from_warm_cache_without_loading_again() {
        let sources = missing_dir();
        let cache = warm_cache(&sources);
        let dashboard = Dashboard::new(Arc::clone(&cache), sources, Page::Home).unwrap();

        assert_eq!(dashboard.status(), &DataStatus::Loaded { records: 4 });
        assert!(dashboard.view().find_tile("Total Revenue").is_some());
        assert_eq!(cache.load_count(), 1, "only the warm-up load should have run");
    }

    #[test]
    fn navigation_rerenders_the_selected_page() {
        let sources = missing_dir();
        let mut dashboard = Dashboard::new(warm_cache(&sources), sources, Page::Home).unwrap();

        dashboard.next_page().unwrap();
        assert_eq!(dashboard.page(), Page::CustomerInsights);
        assert_eq!(dashboard.view().title, Page::CustomerInsights.title());

        dashboard.prev_page().unwrap();
        dashboard.prev_page().unwrap();
        assert_eq!(dashboard.page(), Page::PricingOptimizer);
        assert_eq!(dashboard.status(), &DataStatus::NotNeeded);
    }

    #[test]
    fn missing_files_render_error_banner() {
        let dashboard = Dashboard::new(DatasetCache::new(), missing_dir(), Page::ProductPerformance).unwrap();

        assert_eq!(dashboard.status(), &DataStatus::Unavailable { artifact: Artifact::FactTable });
        assert!(!dashboard.view().has_data_sections());
        assert!(matches!(
            dashboard.view().sections[0],
            Section::Note { tone: NoteTone::Error, .. }
        ));
        assert!(dashboard.cache().is_empty(), "failed loads must not be cached");
    }

    #[test]
    fn reload_drops_cached_bundle() {
        let sources = missing_dir();
        let cache = warm_cache(&sources);
        let mut dashboard = Dashboard::new(Arc::clone(&cache), sources, Page::Home).unwrap();

        // Files are absent, so the reload turns the page into an error banner.
        dashboard.reload().unwrap();
        assert!(!cache.contains(dashboard.sources()));
        assert!(matches!(dashboard.status(), DataStatus::Unavailable { .. }));
    }

    #[test]
    fn clear_cache_empties_every_entry() {
        let sources = missing_dir();
        let cache = warm_cache(&sources);
        cache
            .get_or_load_with(&SourcePaths::under("elsewhere"), |_| Ok(fixtures::bundle()))
            .unwrap();
        let mut dashboard = Dashboard::new(Arc::clone(&cache), sources, Page::GeographicAnalysis).unwrap();

        dashboard.clear_cache().unwrap();
        assert!(cache.is_empty());
        assert_eq!(dashboard.status(), &DataStatus::NotNeeded);
    }

    #[test]
    fn placeholder_pages_never_touch_the_cache() {
        let cache = DatasetCache::new();
        let dashboard = Dashboard::new(Arc::clone(&cache), missing_dir(), Page::PricingOptimizer).unwrap();
        assert_eq!(cache.load_count(), 0);
        assert_eq!(dashboard.view().sidebar[1], "Current Page: Pricing Optimizer");
    }
}
