//! Chapter grouping on a rendered document tree.
//!
//! Each chapter heading and everything after it up to the next heading is
//! moved into a wrapper element that the display layer keeps together when
//! printing. Node identity is preserved: only parentage changes.

use serde::Serialize;
use thiserror::Error;

use crate::config::ChapterConfig;
use crate::css::merge_declarations;
use crate::dom::{ArenaDom, ArenaNodeId, Attribute, outer_html};

/// Grouping hit a tree shape it cannot restructure.
///
/// Callers keep the ungrouped render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("chapter heading {0:?} is detached from the tree")]
    DetachedHeading(ArenaNodeId),

    #[error("chapter heading level {0} is out of range")]
    InvalidLevel(u8),
}

/// One wrapped chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterRange {
    pub wrapper: ArenaNodeId,
    pub heading: ArenaNodeId,
    /// Nodes moved into the wrapper, heading first.
    pub members: Vec<ArenaNodeId>,
}

/// What a grouping pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChapterLayout {
    /// Element grouping started from.
    pub root: Option<ArenaNodeId>,
    /// Chapters wrapped by this pass, in document order.
    pub chapters: Vec<ChapterRange>,
    /// Headings left alone because they were already wrapped.
    pub already_grouped: usize,
}

impl ChapterLayout {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }
}

/// Groups chapters of a rendered document.
#[derive(Debug, Clone, Default)]
pub struct ChapterGrouper {
    config: ChapterConfig,
}

impl ChapterGrouper {
    pub fn new(config: ChapterConfig) -> Self {
        Self { config }
    }

    /// The element holding the rendered document: the first descendant of
    /// `container` with the root class, else `container` itself.
    pub fn document_root(&self, dom: &ArenaDom, container: ArenaNodeId) -> ArenaNodeId {
        dom.descendants(container)
            .into_iter()
            .find(|&id| dom.has_class(id, &self.config.root_class))
            .unwrap_or(container)
    }

    /// Wrap every chapter under `container`.
    ///
    /// Headings already inside a wrapper are skipped, so a second pass over
    /// the same tree changes nothing. No headings is not an error.
    pub fn group(
        &self,
        dom: &mut ArenaDom,
        container: ArenaNodeId,
    ) -> Result<ChapterLayout, GroupingError> {
        let level = self.config.heading_level;
        if !(1..=6).contains(&level) {
            return Err(GroupingError::InvalidLevel(level));
        }
        let tag = format!("h{level}");

        let root = self.document_root(dom, container);
        let headings: Vec<ArenaNodeId> = dom
            .descendants(root)
            .into_iter()
            .filter(|&id| id != root && dom.is_tag(id, &tag))
            .collect();

        let mut layout = ChapterLayout {
            root: Some(root),
            ..Default::default()
        };

        for (i, &heading) in headings.iter().enumerate() {
            if self.is_wrapped(dom, heading) {
                layout.already_grouped += 1;
                continue;
            }
            if dom.parent(heading).is_none() {
                return Err(GroupingError::DetachedHeading(heading));
            }

            let wrapper = dom.create_html_element(
                "div",
                vec![Attribute::new("class", self.config.wrapper_class.as_str())],
            );
            dom.insert_before(heading, wrapper);
            let next = headings.get(i + 1).copied();
            let members = dom.reparent_range(heading, next, wrapper);

            layout.chapters.push(ChapterRange {
                wrapper,
                heading,
                members,
            });
        }

        log::debug!(
            "wrapped {} chapter(s), {} already grouped",
            layout.chapters.len(),
            layout.already_grouped
        );

        if self.config.force_page_breaks {
            self.force_page_breaks(dom, root);
        }

        Ok(layout)
    }

    fn is_wrapped(&self, dom: &ArenaDom, node: ArenaNodeId) -> bool {
        dom.ancestors(node)
            .any(|a| dom.has_class(a, &self.config.wrapper_class))
    }

    /// Every wrapper under `root`, in document order.
    pub fn wrappers(&self, dom: &ArenaDom, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        dom.descendants(root)
            .into_iter()
            .filter(|&id| dom.is_element(id) && dom.has_class(id, &self.config.wrapper_class))
            .collect()
    }

    /// Start every chapter but the first on a new printed page.
    pub fn force_page_breaks(&self, dom: &mut ArenaDom, root: ArenaNodeId) {
        for wrapper in self.wrappers(dom, root).into_iter().skip(1) {
            let style = merge_declarations(
                dom.get_attr(wrapper, "style"),
                &[("break-before", "page"), ("page-break-before", "always")],
            );
            dom.set_attr(wrapper, "style", &style);
        }
    }

    /// Best-effort rendered page count: the number of page containers,
    /// at least one.
    pub fn page_count(&self, dom: &ArenaDom, container: ArenaNodeId) -> usize {
        dom.descendants(container)
            .into_iter()
            .filter(|&id| dom.has_class(id, &self.config.page_class))
            .count()
            .max(1)
    }

    /// A standalone printable document for the rendered tree.
    pub fn print_document(&self, dom: &ArenaDom, container: ArenaNodeId) -> String {
        let root = self.document_root(dom, container);
        let content = outer_html(dom, root);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Print Document</title>\n\
             <style>\n@media print {{\n  body {{ margin: 0; background: white; }}\n  \
             .{root} .{page} {{ page-break-after: always; box-shadow: none; margin: 0 auto; }}\n  \
             .{wrapper} {{ break-inside: avoid; page-break-inside: avoid; }}\n}}\n</style>\n\
             </head>\n<body>{content}</body>\n</html>\n",
            root = self.config.root_class,
            page = self.config.page_class,
            wrapper = self.config.wrapper_class,
        )
    }
}

/// Group chapters under `container` with `config`.
pub fn group_chapters(
    dom: &mut ArenaDom,
    container: ArenaNodeId,
    config: &ChapterConfig,
) -> Result<ChapterLayout, GroupingError> {
    ChapterGrouper::new(config.clone()).group(dom, container)
}
