use crate::pages::view::{NoteTone, PageView, Section};
use crate::pages::Page;

/// Pages listed in navigation whose views are not part of this build.
pub fn render(page: Page) -> PageView {
    let mut view = PageView::new(page);
    view.sections.push(Section::Note {
        title: page.nav_label().to_string(),
        lines: vec!["This page is not available in this build.".to_string()],
        tone: NoteTone::Info,
    });
    view
}
