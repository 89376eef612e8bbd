//! Flowed HTML → top-level blocks.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId, body, outer_html, parse_html};
use crate::util::word_count;

use super::block::{Block, BlockKind};

/// Phrasing elements. A run of these directly under `<body>` forms one
/// text block instead of one block per span.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em", "font", "i", "kbd",
    "label", "mark", "q", "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u",
    "var", "wbr",
];

/// Split a converted document body into its top-level blocks, in order.
///
/// Comments and whitespace-only text between blocks are dropped. Text and
/// inline elements sitting directly in the body are gathered into
/// [`BlockKind::Text`] blocks.
pub fn normalize(html: &str) -> Vec<Block> {
    let dom = parse_html(html);
    let Some(body) = body(&dom) else {
        return Vec::new();
    };
    blocks_of(&dom, body)
}

/// Top-level blocks among the children of `container`.
pub fn blocks_of(dom: &ArenaDom, container: ArenaNodeId) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut run: Vec<ArenaNodeId> = Vec::new();

    for child in dom.children(container) {
        let Some(node) = dom.get(child) else {
            continue;
        };
        match &node.data {
            ArenaNodeData::Comment(_) | ArenaNodeData::Document => {}
            ArenaNodeData::Text(_) => run.push(child),
            ArenaNodeData::Element { name, .. } if INLINE_TAGS.contains(&name.local.as_ref()) => {
                run.push(child)
            }
            ArenaNodeData::Element { .. } => {
                flush_run(dom, &mut run, &mut blocks);
                blocks.push(Block::from_element(dom, child));
            }
        }
    }
    flush_run(dom, &mut run, &mut blocks);

    blocks
}

fn flush_run(dom: &ArenaDom, run: &mut Vec<ArenaNodeId>, blocks: &mut Vec<Block>) {
    if run.is_empty() {
        return;
    }

    let has_content = run
        .iter()
        .any(|&id| dom.is_element(id) || dom.text_content(id).is_some_and(|t| !t.trim().is_empty()));
    if has_content {
        let html: String = run.iter().map(|&id| outer_html(dom, id)).collect();
        let text: String = run.iter().map(|&id| dom.deep_text(id)).collect();
        blocks.push(Block::new(BlockKind::Text, html.trim(), word_count(&text)));
    }
    run.clear();
}
