//! Top-level content blocks.

use serde::Serialize;

use crate::dom::{ArenaDom, ArenaNodeId, outer_html};
use crate::util::word_count;

/// What a block is, with the structural detail height estimation needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Heading { level: u8 },
    Paragraph,
    /// Word count of each list item.
    List { items: Vec<usize> },
    /// Word count of each table row.
    Table { rows: Vec<usize> },
    /// Declared pixel height, if the markup carries one.
    Image { height: Option<f32> },
    Rule,
    /// A bare text run sitting directly in the body.
    Text,
    Other,
}

/// One top-level unit of a flowed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    /// Serialized markup of the block.
    pub html: String,
    /// Whitespace-separated words of the block's text.
    pub words: usize,
    /// Estimated rendered height; `None` until measured.
    pub height: Option<f32>,
}

impl Block {
    pub fn new(kind: BlockKind, html: impl Into<String>, words: usize) -> Self {
        Self {
            kind,
            html: html.into(),
            words,
            height: None,
        }
    }

    /// Build a block from an element of a parsed document.
    pub fn from_element(dom: &ArenaDom, id: ArenaNodeId) -> Self {
        let kind = classify(dom, id);
        let words = word_count(&dom.deep_text(id));
        Self::new(kind, outer_html(dom, id), words)
    }

    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// Measured height, zero when not measured.
    pub fn height_or_zero(&self) -> f32 {
        self.height.unwrap_or(0.0)
    }
}

fn classify(dom: &ArenaDom, id: ArenaNodeId) -> BlockKind {
    let Some(tag) = dom.element_name(id) else {
        return BlockKind::Text;
    };

    match tag.as_ref() {
        "h1" => BlockKind::Heading { level: 1 },
        "h2" => BlockKind::Heading { level: 2 },
        "h3" => BlockKind::Heading { level: 3 },
        "h4" => BlockKind::Heading { level: 4 },
        "h5" => BlockKind::Heading { level: 5 },
        "h6" => BlockKind::Heading { level: 6 },
        "p" | "blockquote" | "pre" => BlockKind::Paragraph,
        "ul" | "ol" | "dl" => BlockKind::List {
            items: units(dom, id, &["li", "dt", "dd"]),
        },
        "table" => BlockKind::Table {
            rows: units(dom, id, &["tr"]),
        },
        "img" => BlockKind::Image {
            height: dom.get_attr(id, "height").and_then(parse_pixels),
        },
        "figure" => {
            let height = dom
                .descendants(id)
                .into_iter()
                .find(|&n| dom.is_tag(n, "img"))
                .and_then(|img| dom.get_attr(img, "height"))
                .and_then(parse_pixels);
            BlockKind::Image { height }
        }
        "hr" => BlockKind::Rule,
        _ => BlockKind::Other,
    }
}

/// Word counts of every descendant with one of `tags`, outermost only.
fn units(dom: &ArenaDom, root: ArenaNodeId, tags: &[&str]) -> Vec<usize> {
    let is_unit = |n: ArenaNodeId| tags.iter().any(|t| dom.is_tag(n, t));
    dom.descendants(root)
        .into_iter()
        .filter(|&n| n != root && is_unit(n))
        .filter(|&n| {
            !dom.ancestors(n)
                .take_while(|&a| a != root)
                .any(|a| is_unit(a))
        })
        .map(|n| word_count(&dom.deep_text(n)))
        .collect()
}

/// Parse `240`, `240px` or `240.5px`.
fn parse_pixels(value: &str) -> Option<f32> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f32>().ok().filter(|h| h.is_finite() && *h >= 0.0)
}
