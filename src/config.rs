//! Viewer configuration.
//!
//! Keys are camelCase so a host can pass the same JSON object it already
//! uses for the embedding widget:
//!
//! ```
//! use folio::config::{ViewerConfig, ViewMode};
//!
//! let config = ViewerConfig::from_json(r#"{
//!     "defaultViewMode": "page",
//!     "forceChapterStartOnNewPage": true,
//!     "pagination": { "wordsPerLine": 10 }
//! }"#).unwrap();
//!
//! assert_eq!(config.default_view_mode, ViewMode::Page);
//! assert!(config.chapters.force_page_breaks);
//! assert_eq!(config.pagination.words_per_line, 10);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How pages are presented: one scrolling column or one page at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Continuous,
    Page,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Continuous => ViewMode::Page,
            ViewMode::Page => ViewMode::Continuous,
        }
    }
}

/// Top-level viewer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub default_view_mode: ViewMode,
    pub enable_download: bool,
    pub enable_print: bool,
    pub enable_zoom: bool,
    pub enable_navigation: bool,
    pub enable_view_mode_toggle: bool,
    pub toolbar: ToolbarConfig,
    pub pagination: PaginationConfig,
    /// Chapter grouping on the high-fidelity path. The upstream flag name
    /// `forceChapterStartOnNewPage` is accepted at the top level too.
    pub chapters: ChapterConfig,
    #[serde(rename = "forceChapterStartOnNewPage", skip_serializing)]
    force_chapter_start_on_new_page: Option<bool>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_view_mode: ViewMode::Continuous,
            enable_download: true,
            enable_print: true,
            enable_zoom: true,
            enable_navigation: true,
            enable_view_mode_toggle: true,
            toolbar: ToolbarConfig::default(),
            pagination: PaginationConfig::default(),
            chapters: ChapterConfig::default(),
            force_chapter_start_on_new_page: None,
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(force) = config.force_chapter_start_on_new_page.take() {
            config.chapters.force_page_breaks = force;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.pagination.validate()?;
        self.chapters.validate()
    }
}

/// Which toolbar controls the display layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolbarConfig {
    pub show_download: bool,
    pub show_print: bool,
    pub show_zoom: bool,
    pub show_rotation: bool,
    pub show_navigation: bool,
    pub show_page_input: bool,
    pub show_fit_to_width: bool,
    pub show_view_mode_toggle: bool,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            show_download: true,
            show_print: true,
            show_zoom: true,
            show_rotation: true,
            show_navigation: true,
            show_page_input: true,
            show_fit_to_width: true,
            show_view_mode_toggle: true,
        }
    }
}

/// Word pagination tuning.
///
/// Heights are CSS pixels at 96 dpi. The defaults approximate an A4 page
/// (794 x 1123 px) with 1 inch margins and 11pt body text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Usable content height of one page.
    pub page_capacity: f32,
    /// Usable content width, used by surface measurement.
    pub page_width: f32,
    /// Average words on one rendered line.
    pub words_per_line: usize,
    pub line_height: f32,
    /// Extra spacing added to every heading.
    pub heading_allowance: f32,
    /// Extra spacing added to every paragraph.
    pub paragraph_allowance: f32,
    /// Height used for images without a declared height.
    pub image_height: f32,
    /// Treat runs of three or more `<br>` as page breaks when a document has
    /// no explicit markers.
    pub detect_line_break_runs: bool,
    /// Move headings that end a page onto the next page with the content
    /// that follows them.
    pub keep_headings_with_next: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_capacity: 931.0,
            page_width: 602.0,
            words_per_line: 12,
            line_height: 20.0,
            heading_allowance: 24.0,
            paragraph_allowance: 12.0,
            image_height: 240.0,
            detect_line_break_runs: true,
            keep_headings_with_next: false,
        }
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.page_capacity.is_finite() && self.page_capacity > 0.0) {
            return Err(Error::Config(format!(
                "pageCapacity must be positive, got {}",
                self.page_capacity
            )));
        }
        if self.words_per_line == 0 {
            return Err(Error::Config("wordsPerLine must be at least 1".into()));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(Error::Config(format!(
                "lineHeight must be positive, got {}",
                self.line_height
            )));
        }
        Ok(())
    }
}

/// Chapter grouping on the high-fidelity render path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChapterConfig {
    /// Heading level that starts a chapter.
    pub heading_level: u8,
    /// Start every chapter after the first on a new printed page.
    pub force_page_breaks: bool,
    /// Class of the element holding the rendered document.
    pub root_class: String,
    /// Class of the rendered page containers.
    pub page_class: String,
    /// Class given to chapter wrappers.
    pub wrapper_class: String,
}

impl ChapterConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=6).contains(&self.heading_level) {
            return Err(Error::Config(format!(
                "chapters.headingLevel must be between 1 and 6, got {}",
                self.heading_level
            )));
        }
        Ok(())
    }
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            heading_level: 1,
            force_page_breaks: false,
            root_class: "docx".into(),
            page_class: "docx-page".into(),
            wrapper_class: "chapter-block".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_rejects_zero_words_per_line() {
        let err = ViewerConfig::from_json(r#"{"pagination":{"wordsPerLine":0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let err =
            ViewerConfig::from_json(r#"{"pagination":{"pageCapacity":-5}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_heading_level_outside_h1_to_h6() {
        let err = ViewerConfig::from_json(r#"{"chapters":{"headingLevel":7}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(ViewerConfig::from_json(r#"{"chapters":{"headingLevel":6}}"#).is_ok());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            ViewerConfig::from_json("{not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_view_mode_toggle() {
        assert_eq!(ViewMode::Continuous.toggled(), ViewMode::Page);
        assert_eq!(ViewMode::Page.toggled(), ViewMode::Continuous);
    }
}
