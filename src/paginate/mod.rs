//! Word pagination engine.
//!
//! Turns the flowed HTML of a converted Word document into discrete pages:
//!
//! 1. [`breaks`] decides once whether the document carries explicit page
//!    breaks. If it does, the HTML is split on them.
//! 2. Otherwise [`normalize`] extracts top-level blocks, a
//!    [`BlockMeasurer`] assigns heights, and [`assemble`] fills pages up to
//!    the configured capacity.
//! 3. Every page is passed through [`clean`].
//!
//! ```
//! use folio::config::PaginationConfig;
//! use folio::paginate::{Paginator, PaginationMode, BreakKind};
//!
//! let paginator = Paginator::new(PaginationConfig::default());
//! let result = paginator.paginate("<p>One</p><!-- pagebreak --><p>Two</p>");
//!
//! assert_eq!(result.mode, PaginationMode::Explicit(BreakKind::SentinelComment));
//! assert_eq!(result.pages.len(), 2);
//! assert_eq!(result.pages[1].html, "<p>Two</p>");
//! ```

pub mod assemble;
pub mod block;
pub mod breaks;
pub mod clean;
pub mod measure;
pub mod normalize;

pub use assemble::{Page, assemble};
pub use block::{Block, BlockKind};
pub use breaks::{
    BREAK_TOKEN, BreakDetector, BreakDetectors, BreakKind, LineBreakRunDetector, PaginationMode,
    SentinelCommentDetector, StyleBreakDetector,
};
pub use clean::{clean_page, placeholder};
pub use measure::{
    BlockMeasurer, HeuristicMeasurer, MeasureStrategy, RenderSurface, Scratch, SurfaceMeasurer,
    select_measurer,
};
pub use normalize::normalize;

use serde::Serialize;

use crate::config::PaginationConfig;

/// Result of paginating one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub mode: PaginationMode,
    /// Measurer used, `None` for explicit splits.
    pub measurement: Option<MeasureStrategy>,
    /// Never empty.
    pub pages: Vec<Page>,
}

impl Pagination {
    pub fn total_pages(&self) -> usize {
        self.pages.len()
    }

    /// Cleaned markup of every page, in order.
    pub fn page_contents(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.html.clone()).collect()
    }
}

/// Configured pagination pipeline.
pub struct Paginator {
    config: PaginationConfig,
    detectors: BreakDetectors,
}

impl Paginator {
    pub fn new(config: PaginationConfig) -> Self {
        let detectors = BreakDetectors::standard(config.detect_line_break_runs);
        Self { config, detectors }
    }

    /// Replace the break detection rules.
    pub fn with_detectors(mut self, detectors: BreakDetectors) -> Self {
        self.detectors = detectors;
        self
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Paginate with heuristic measurement.
    pub fn paginate(&self, html: &str) -> Pagination {
        self.paginate_with(html, None)
    }

    /// Paginate, measuring blocks on `surface` when it is available.
    pub fn paginate_with(&self, html: &str, surface: Option<&mut dyn RenderSurface>) -> Pagination {
        let mode = self.detectors.detect_mode(html);
        log::debug!("pagination mode: {mode:?}");

        let (measurement, pages) = match mode {
            PaginationMode::Explicit(_) => (None, self.split_explicit(html)),
            PaginationMode::Estimated => {
                let (strategy, pages) = self.split_estimated(html, surface);
                (Some(strategy), pages)
            }
        };

        let pages = pages
            .into_iter()
            .map(|mut page| {
                page.html = clean_page(&page.html, page.index);
                page
            })
            .collect();

        Pagination {
            mode,
            measurement,
            pages,
        }
    }

    fn split_explicit(&self, html: &str) -> Vec<Page> {
        let fragments = self.detectors.split(html);
        if fragments.is_empty() {
            return vec![Page::new(1, Vec::new(), "")];
        }
        fragments
            .into_iter()
            .enumerate()
            .map(|(i, fragment)| Page::new(i + 1, normalize(&fragment), fragment))
            .collect()
    }

    fn split_estimated(
        &self,
        html: &str,
        surface: Option<&mut dyn RenderSurface>,
    ) -> (MeasureStrategy, Vec<Page>) {
        let mut blocks = normalize(html);
        let mut measurer = select_measurer(surface, &self.config);
        let strategy = measurer.strategy();

        if blocks.is_empty() {
            return (strategy, vec![Page::new(1, Vec::new(), html)]);
        }

        measurer.measure(&mut blocks);
        (strategy, assemble(blocks, &self.config))
    }
}

/// Paginate `html` with heuristic measurement.
pub fn paginate(html: &str, config: &PaginationConfig) -> Pagination {
    Paginator::new(config.clone()).paginate(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_mode_uses_heuristic_without_surface() {
        let result = paginate("<h1>A</h1><p>b c</p>", &PaginationConfig::default());
        assert_eq!(result.mode, PaginationMode::Estimated);
        assert_eq!(result.measurement, Some(MeasureStrategy::Heuristic));
        assert_eq!(result.total_pages(), 1);
        assert_eq!(result.pages[0].html, "<h1>A</h1>\n<p>b c</p>");
    }

    #[test]
    fn test_empty_document_is_one_placeholder_page() {
        let result = paginate("   ", &PaginationConfig::default());
        assert_eq!(result.total_pages(), 1);
        assert_eq!(result.pages[0].html, placeholder(1));
    }

    #[test]
    fn test_markers_only_is_one_page() {
        let result = paginate("<!-- pagebreak --><!-- pagebreak -->", &PaginationConfig::default());
        assert_eq!(result.mode, PaginationMode::Explicit(BreakKind::SentinelComment));
        assert_eq!(result.total_pages(), 1);
    }

    #[test]
    fn test_custom_detectors() {
        let paginator = Paginator::new(PaginationConfig::default())
            .with_detectors(BreakDetectors::new(vec![Box::new(SentinelCommentDetector)]));
        let result = paginator.paginate(r#"<div style="page-break-before: always">a</div>"#);
        assert_eq!(result.mode, PaginationMode::Estimated);
    }

    #[test]
    fn test_explicit_pages_keep_their_blocks() {
        let result = paginate(
            r#"<p>a</p><p style="page-break-before: always">b</p><table><tr><td>c</td></tr></table>"#,
            &PaginationConfig::default(),
        );
        assert_eq!(
            result.mode,
            PaginationMode::Explicit(BreakKind::StyledParagraph)
        );
        assert_eq!(result.total_pages(), 2);
        assert_eq!(result.pages[1].blocks.len(), 2);
        assert!(result.pages[1].html.contains("doc-table"));
        assert_eq!(result.measurement, None);
    }
}
