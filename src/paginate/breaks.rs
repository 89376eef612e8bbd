//! Explicit page-break detection and splitting.
//!
//! Detection runs over the serialized HTML. Each marker form is a separate
//! [`BreakDetector`] so rules can be swapped or tested on their own; a
//! [`BreakDetectors`] chain combines them in priority order and decides the
//! document's [`PaginationMode`] once.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::css::declares_page_break_before;

/// Separator every recognized marker is rewritten to before splitting.
/// Private-use code points keep it from colliding with document text.
pub const BREAK_TOKEN: &str = "\u{E000}folio:page-break\u{E000}";

/// Opening tag carrying a `style` attribute.
static STYLED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<([a-z][a-z0-9]*)\b[^>]*?\sstyle\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#,
    )
    .expect("styled tag pattern is valid")
});

static SENTINEL_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!--\s*page[-_ ]?break\s*-->").expect("sentinel pattern is valid")
});

static LINE_BREAK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:<br\s*/?>\s*){3,}").expect("line break run pattern is valid")
});

/// Block-level elements whose inline style can force a break.
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "pre",
    "section",
    "table",
    "ul",
];

/// Which marker form triggered explicit splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BreakKind {
    /// Block element (not `p`) styled `page-break-before: always`.
    StyledBlock,
    /// `p` styled `page-break-before: always`.
    StyledParagraph,
    /// `<!-- pagebreak -->` comment.
    SentinelComment,
    /// Three or more consecutive `<br>`.
    LineBreakRun,
}

/// How a document is split into pages. Fixed for a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PaginationMode {
    /// Split on explicit markers; the kind is the highest-priority one found.
    Explicit(BreakKind),
    /// No markers: split by estimated block heights.
    Estimated,
}

/// One page-break marker form.
pub trait BreakDetector {
    fn kind(&self) -> BreakKind;

    /// Heuristic detectors are consulted only when no explicit marker exists.
    fn is_heuristic(&self) -> bool {
        false
    }

    /// Whether the document contains this marker anywhere.
    fn detect(&self, html: &str) -> bool;

    /// Rewrite every occurrence of the marker into `token`.
    fn canonicalize(&self, html: &str, token: &str) -> String;
}

/// Break declared through an inline style on an opening tag.
#[derive(Debug, Clone, Copy)]
pub struct StyleBreakDetector {
    paragraphs: bool,
}

impl StyleBreakDetector {
    /// Styled block elements other than `p`.
    pub fn blocks() -> Self {
        Self { paragraphs: false }
    }

    /// Styled `p` elements.
    pub fn paragraphs() -> Self {
        Self { paragraphs: true }
    }

    fn qualifies(&self, caps: &Captures<'_>) -> bool {
        let tag = caps[1].to_ascii_lowercase();
        let tag_matches = if self.paragraphs {
            tag == "p"
        } else {
            BLOCK_TAGS.contains(&tag.as_str())
        };
        let style = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        tag_matches && declares_page_break_before(style)
    }
}

impl BreakDetector for StyleBreakDetector {
    fn kind(&self) -> BreakKind {
        if self.paragraphs {
            BreakKind::StyledParagraph
        } else {
            BreakKind::StyledBlock
        }
    }

    fn detect(&self, html: &str) -> bool {
        STYLED_TAG.captures_iter(html).any(|c| self.qualifies(&c))
    }

    fn canonicalize(&self, html: &str, token: &str) -> String {
        STYLED_TAG
            .replace_all(html, |caps: &Captures<'_>| {
                if self.qualifies(caps) {
                    format!("{token}{}", &caps[0])
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned()
    }
}

/// `<!-- pagebreak -->` / `<!-- page-break -->` comments.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelCommentDetector;

impl BreakDetector for SentinelCommentDetector {
    fn kind(&self) -> BreakKind {
        BreakKind::SentinelComment
    }

    fn detect(&self, html: &str) -> bool {
        SENTINEL_COMMENT.is_match(html)
    }

    fn canonicalize(&self, html: &str, token: &str) -> String {
        SENTINEL_COMMENT.replace_all(html, token).into_owned()
    }
}

/// Runs of three or more `<br>` treated as an implied page separator.
///
/// Documents that use blank lines for spacing trip this, so it can be
/// switched off through `PaginationConfig::detect_line_break_runs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineBreakRunDetector;

impl BreakDetector for LineBreakRunDetector {
    fn kind(&self) -> BreakKind {
        BreakKind::LineBreakRun
    }

    fn is_heuristic(&self) -> bool {
        true
    }

    fn detect(&self, html: &str) -> bool {
        LINE_BREAK_RUN.is_match(html)
    }

    fn canonicalize(&self, html: &str, token: &str) -> String {
        LINE_BREAK_RUN.replace_all(html, token).into_owned()
    }
}

/// Ordered set of detectors.
pub struct BreakDetectors {
    detectors: Vec<Box<dyn BreakDetector>>,
}

impl BreakDetectors {
    /// A chain from the given detectors, highest priority first.
    pub fn new(detectors: Vec<Box<dyn BreakDetector>>) -> Self {
        Self { detectors }
    }

    /// Styled blocks, styled paragraphs, sentinel comments and, when
    /// `line_break_runs` is set, the `<br>` run heuristic.
    pub fn standard(line_break_runs: bool) -> Self {
        let mut detectors: Vec<Box<dyn BreakDetector>> = vec![
            Box::new(StyleBreakDetector::blocks()),
            Box::new(StyleBreakDetector::paragraphs()),
            Box::new(SentinelCommentDetector),
        ];
        if line_break_runs {
            detectors.push(Box::new(LineBreakRunDetector));
        }
        Self::new(detectors)
    }

    /// Append a detector at the lowest priority.
    pub fn with(mut self, detector: Box<dyn BreakDetector>) -> Self {
        self.detectors.push(detector);
        self
    }

    /// Decide the pagination mode for a whole document.
    ///
    /// Explicit detectors are tried in priority order; heuristic ones only
    /// when no explicit marker exists anywhere.
    pub fn detect_mode(&self, html: &str) -> PaginationMode {
        let explicit = self.detectors.iter().filter(|d| !d.is_heuristic());
        let heuristic = self.detectors.iter().filter(|d| d.is_heuristic());

        explicit
            .chain(heuristic)
            .find(|d| d.detect(html))
            .map(|d| PaginationMode::Explicit(d.kind()))
            .unwrap_or(PaginationMode::Estimated)
    }

    /// Rewrite every marker into [`BREAK_TOKEN`]. Heuristic markers are left
    /// alone when the document has explicit ones.
    pub fn canonicalize(&self, html: &str) -> String {
        let has_explicit = self
            .detectors
            .iter()
            .any(|d| !d.is_heuristic() && d.detect(html));
        self.detectors
            .iter()
            .filter(|d| !(has_explicit && d.is_heuristic()))
            .fold(html.to_string(), |acc, d| d.canonicalize(&acc, BREAK_TOKEN))
    }

    /// Split a document on its markers into trimmed, non-empty page contents.
    pub fn split(&self, html: &str) -> Vec<String> {
        self.canonicalize(html)
            .split(BREAK_TOKEN)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for BreakDetectors {
    fn default() -> Self {
        Self::standard(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_styled_block_detection() {
        let d = StyleBreakDetector::blocks();
        assert!(d.detect(r#"<div style="page-break-before: always">x</div>"#));
        assert!(d.detect(r#"<h2 class="a" style='break-before:page'>x</h2>"#));
        assert!(!d.detect(r#"<p style="page-break-before: always">x</p>"#));
        assert!(!d.detect(r#"<span style="page-break-before: always">x</span>"#));
        assert!(!d.detect(r#"<div style="color: red">x</div>"#));
    }

    #[test]
    fn test_styled_paragraph_detection() {
        let d = StyleBreakDetector::paragraphs();
        assert!(d.detect(r#"<P STYLE="PAGE-BREAK-BEFORE: ALWAYS">x</P>"#));
        assert!(!d.detect(r#"<pre style="page-break-before: always">x</pre>"#));
    }

    #[test]
    fn test_data_style_attribute_is_not_style() {
        let d = StyleBreakDetector::blocks();
        assert!(!d.detect(r#"<div data-style="page-break-before: always">x</div>"#));
    }

    #[test]
    fn test_sentinel_variants() {
        let d = SentinelCommentDetector;
        assert!(d.detect("a<!-- pagebreak -->b"));
        assert!(d.detect("a<!--PAGE-BREAK-->b"));
        assert!(!d.detect("a<!-- page -->b"));
    }

    #[test]
    fn test_line_break_run() {
        let d = LineBreakRunDetector;
        assert!(d.detect("a<br><br/> <br />b"));
        assert!(!d.detect("a<br><br>b"));
        assert_eq!(d.canonicalize("a<br><br><br>b", "|"), "a|b");
    }

    #[test]
    fn test_mode_priority() {
        let chain = BreakDetectors::standard(true);
        let html = r#"<p style="page-break-before:always">a</p><div style="break-before:page">b</div><!-- pagebreak -->"#;
        assert_eq!(
            chain.detect_mode(html),
            PaginationMode::Explicit(BreakKind::StyledBlock)
        );
        assert_eq!(
            chain.detect_mode("<p>a</p><!-- pagebreak --><p>b</p>"),
            PaginationMode::Explicit(BreakKind::SentinelComment)
        );
        assert_eq!(chain.detect_mode("<p>a</p><p>b</p>"), PaginationMode::Estimated);
    }

    #[test]
    fn test_heuristic_only_when_no_explicit_markers() {
        let chain = BreakDetectors::standard(true);
        assert_eq!(
            chain.detect_mode("<p>a<br><br><br>b</p>"),
            PaginationMode::Explicit(BreakKind::LineBreakRun)
        );
        assert_eq!(
            chain.detect_mode("<p>a<br><br><br>b</p><!-- pagebreak -->"),
            PaginationMode::Explicit(BreakKind::SentinelComment)
        );

        let strict = BreakDetectors::standard(false);
        assert_eq!(
            strict.detect_mode("<p>a<br><br><br>b</p>"),
            PaginationMode::Estimated
        );
    }

    #[test]
    fn test_split_inserts_break_before_styled_element() {
        let chain = BreakDetectors::standard(false);
        let pages = chain.split(
            r#"<p>one</p><p style="page-break-before: always">two</p><p>three</p>"#,
        );
        assert_eq!(
            pages,
            vec![
                "<p>one</p>".to_string(),
                r#"<p style="page-break-before: always">two</p><p>three</p>"#.to_string(),
            ]
        );
    }

    #[test]
    fn test_split_drops_empty_fragments() {
        let chain = BreakDetectors::standard(true);
        let pages = chain.split("<!-- pagebreak -->  <!-- pagebreak --><p>a</p><!-- pagebreak -->\n");
        assert_eq!(pages, vec!["<p>a</p>".to_string()]);
    }

    #[test]
    fn test_split_normalizes_every_explicit_form() {
        let chain = BreakDetectors::standard(true);
        let pages = chain.split(
            r#"<p>a</p><!-- pagebreak --><p>b</p><div style="break-before: page">c</div>"#,
        );
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1], "<p>b</p>");
    }

    #[test]
    fn test_split_keeps_line_break_runs_beside_explicit_markers() {
        let chain = BreakDetectors::standard(true);
        let pages = chain.split("<p>a</p><br><br><br><p>b</p><!-- pagebreak --><p>c</p>");
        assert_eq!(
            pages,
            vec!["<p>a</p><br><br><br><p>b</p>".to_string(), "<p>c</p>".to_string()]
        );
    }
}
