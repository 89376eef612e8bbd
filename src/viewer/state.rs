//! Immutable viewer state.
//!
//! Every navigation, zoom or rotation operation takes a state by reference
//! and returns the next one; nothing is mutated in place. Operations that
//! cannot apply (next page on the last page, zooming past the limit) return
//! an equal state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ViewMode;
use crate::kind::DocumentKind;

pub const MIN_ZOOM: f32 = 0.5;
pub const ZOOM_STEP: f32 = 0.25;
/// Zoom ceiling for canvas-rendered documents.
pub const MAX_ZOOM: f32 = 3.0;
/// Zoom ceiling for Word documents, which scale with a CSS transform.
pub const MAX_WORD_ZOOM: f32 = 2.0;
/// Page width assumed when the rendered page reports none: A4 at 96 dpi.
pub const A4_WIDTH_PX: f32 = 794.0;
/// Horizontal padding of the page container.
const CONTAINER_PADDING: f32 = 40.0;

/// Emitted whenever the visible page, page count or view mode changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageChangeEvent {
    pub page: usize,
    pub total_pages: usize,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub view_mode: ViewMode,
}

/// Snapshot of what the viewer shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    kind: DocumentKind,
    view_mode: ViewMode,
    /// 1-based.
    current_page: usize,
    total_pages: usize,
    zoom: f32,
    /// Degrees, always in `0..360`.
    rotation: u16,
    sheet: usize,
    sheets: Arc<[String]>,
    pages: Arc<[String]>,
}

impl ViewerState {
    /// State for a document whose page contents are known.
    pub fn with_pages(kind: DocumentKind, pages: Vec<String>, view_mode: ViewMode) -> Self {
        let total = pages.len().max(1);
        Self {
            pages: pages.into(),
            ..Self::with_total_pages(kind, total, view_mode)
        }
    }

    /// State for a document rendered elsewhere, of which only the page
    /// count is known.
    pub fn with_total_pages(kind: DocumentKind, total_pages: usize, view_mode: ViewMode) -> Self {
        Self {
            kind,
            view_mode,
            current_page: 1,
            total_pages: total_pages.max(1),
            zoom: 1.0,
            rotation: 0,
            sheet: 0,
            sheets: Arc::from(Vec::new()),
            pages: Arc::from(Vec::new()),
        }
    }

    /// State for a workbook with the given sheet names.
    pub fn with_sheets(sheets: Vec<String>, view_mode: ViewMode) -> Self {
        Self {
            sheets: sheets.into(),
            ..Self::with_total_pages(DocumentKind::Excel, 1, view_mode)
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    pub fn sheet(&self) -> usize {
        self.sheet
    }

    pub fn sheets(&self) -> &[String] {
        &self.sheets
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Markup of the current page, when contents are held.
    pub fn current_content(&self) -> Option<&str> {
        self.pages.get(self.current_page - 1).map(String::as_str)
    }

    /// Pages to display: all of them when scrolling, the current one
    /// otherwise.
    pub fn visible_pages(&self) -> &[String] {
        match self.view_mode {
            ViewMode::Continuous => &self.pages,
            ViewMode::Page => {
                let i = self.current_page - 1;
                self.pages.get(i..=i).unwrap_or(&[])
            }
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn max_zoom(&self) -> f32 {
        match self.kind {
            DocumentKind::Word => MAX_WORD_ZOOM,
            _ => MAX_ZOOM,
        }
    }

    pub fn event(&self) -> PageChangeEvent {
        PageChangeEvent {
            page: self.current_page,
            total_pages: self.total_pages,
            kind: self.kind,
            view_mode: self.view_mode,
        }
    }

    // Transitions

    /// Go to `page`, clamped into `1..=total_pages`.
    pub fn go_to_page(&self, page: usize) -> Self {
        Self {
            current_page: page.clamp(1, self.total_pages),
            ..self.clone()
        }
    }

    pub fn first_page(&self) -> Self {
        self.go_to_page(1)
    }

    pub fn last_page(&self) -> Self {
        self.go_to_page(self.total_pages)
    }

    pub fn next_page(&self) -> Self {
        self.go_to_page(self.current_page + 1)
    }

    pub fn previous_page(&self) -> Self {
        self.go_to_page(self.current_page.saturating_sub(1))
    }

    pub fn zoom_in(&self) -> Self {
        if self.zoom >= self.max_zoom() {
            return self.clone();
        }
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&self) -> Self {
        if self.zoom <= MIN_ZOOM {
            return self.clone();
        }
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// Set the zoom factor, clamped to the kind's range.
    pub fn set_zoom(&self, zoom: f32) -> Self {
        let zoom = if zoom.is_finite() { zoom } else { 1.0 };
        Self {
            zoom: zoom.clamp(MIN_ZOOM, self.max_zoom()),
            ..self.clone()
        }
    }

    /// Zoom so a page of `page_width` fills a container of
    /// `container_width`, less its padding.
    pub fn fit_to_width(&self, container_width: f32, page_width: Option<f32>) -> Self {
        let page_width = page_width.filter(|w| *w > 0.0).unwrap_or(A4_WIDTH_PX);
        self.set_zoom((container_width - CONTAINER_PADDING) / page_width)
    }

    /// Rotate by `degrees`, which may be negative.
    pub fn rotate(&self, degrees: i32) -> Self {
        let rotation = (i32::from(self.rotation) + degrees.rem_euclid(360)).rem_euclid(360);
        Self {
            rotation: rotation as u16,
            ..self.clone()
        }
    }

    pub fn with_view_mode(&self, view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..self.clone()
        }
    }

    pub fn toggle_view_mode(&self) -> Self {
        self.with_view_mode(self.view_mode.toggled())
    }

    /// Switch sheets; out-of-range indices leave the state unchanged.
    pub fn select_sheet(&self, index: usize) -> Self {
        if index >= self.sheets.len() {
            return self.clone();
        }
        Self {
            sheet: index,
            ..self.clone()
        }
    }
}
