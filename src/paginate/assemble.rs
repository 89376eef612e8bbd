//! Greedy page assembly over measured blocks.

use serde::Serialize;

use super::block::Block;
use crate::config::PaginationConfig;

/// One output page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// 1-based position in the document.
    pub index: usize,
    pub blocks: Vec<Block>,
    /// Sum of the blocks' measured heights.
    pub height: f32,
    /// Page markup. Raw block markup after assembly, cleaned afterwards.
    pub html: String,
}

impl Page {
    pub fn new(index: usize, blocks: Vec<Block>, html: impl Into<String>) -> Self {
        let height = blocks.iter().map(Block::height_or_zero).sum();
        Self {
            index,
            blocks,
            height,
            html: html.into(),
        }
    }

    fn from_blocks(index: usize, blocks: Vec<Block>) -> Self {
        let html = blocks
            .iter()
            .map(|b| b.html.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(index, blocks, html)
    }
}

/// Distribute measured blocks over pages of `config.page_capacity`.
///
/// Blocks are never split: one taller than a page gets a page of its own.
/// A heading that would overflow starts the next page. With
/// `keep_headings_with_next`, headings ending a full page also move down
/// with the block that overflowed it. An empty input still yields one page.
pub fn assemble(blocks: Vec<Block>, config: &PaginationConfig) -> Vec<Page> {
    let capacity = config.page_capacity;
    let mut pages: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut used = 0.0_f32;

    for block in blocks {
        let height = block.height_or_zero();

        if !current.is_empty() && used + height > capacity {
            let carried = if config.keep_headings_with_next && !block.is_heading() {
                take_trailing_headings(&mut current, height, capacity)
            } else {
                Vec::new()
            };
            pages.push(std::mem::take(&mut current));
            used = carried.iter().map(Block::height_or_zero).sum();
            current = carried;
        }

        used += height;
        current.push(block);
    }

    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    log::debug!("assembled {} page(s) at capacity {capacity}", pages.len());

    pages
        .into_iter()
        .enumerate()
        .map(|(i, blocks)| Page::from_blocks(i + 1, blocks))
        .collect()
}

/// Split off the headings ending `page` so they can move with the next
/// block. Nothing moves if the page is all headings or if the headings and
/// the incoming block would not fit on a page together.
fn take_trailing_headings(page: &mut Vec<Block>, incoming: f32, capacity: f32) -> Vec<Block> {
    let keep = page
        .iter()
        .rposition(|b| !b.is_heading())
        .map_or(0, |i| i + 1);
    if keep == 0 || keep == page.len() {
        return Vec::new();
    }

    let trailing: f32 = page[keep..].iter().map(Block::height_or_zero).sum();
    if trailing + incoming > capacity {
        return Vec::new();
    }

    page.split_off(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::block::BlockKind;

    fn block(kind: BlockKind, label: &str, height: f32) -> Block {
        let mut b = Block::new(kind, format!("<x>{label}</x>"), 1);
        b.height = Some(height);
        b
    }

    fn para(label: &str, height: f32) -> Block {
        block(BlockKind::Paragraph, label, height)
    }

    fn heading(label: &str, height: f32) -> Block {
        block(BlockKind::Heading { level: 2 }, label, height)
    }

    fn config(capacity: f32) -> PaginationConfig {
        PaginationConfig {
            page_capacity: capacity,
            ..Default::default()
        }
    }

    fn labels(pages: &[Page]) -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|p| p.blocks.iter().map(|b| b.html.clone()).collect())
            .collect()
    }

    #[test]
    fn test_greedy_fill() {
        let pages = assemble(
            vec![para("a", 40.0), para("b", 40.0), para("c", 40.0)],
            &config(100.0),
        );
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 1);
        assert_eq!(pages[0].height, 80.0);
        assert_eq!(pages[1].index, 2);
        assert_eq!(pages[0].html, "<x>a</x>\n<x>b</x>");
    }

    #[test]
    fn test_exact_fit_stays_on_page() {
        let pages = assemble(vec![para("a", 50.0), para("b", 50.0)], &config(100.0));
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_overflowing_heading_starts_next_page() {
        let pages = assemble(
            vec![para("a", 90.0), heading("h", 20.0), para("b", 10.0)],
            &config(100.0),
        );
        assert_eq!(
            labels(&pages),
            vec![vec!["<x>a</x>"], vec!["<x>h</x>", "<x>b</x>"]]
        );
    }

    #[test]
    fn test_oversized_block_gets_own_page() {
        let pages = assemble(
            vec![para("a", 10.0), para("big", 500.0), para("c", 10.0)],
            &config(100.0),
        );
        assert_eq!(
            labels(&pages),
            vec![vec!["<x>a</x>"], vec!["<x>big</x>"], vec!["<x>c</x>"]]
        );
        assert_eq!(pages[1].height, 500.0);
    }

    #[test]
    fn test_trailing_heading_moves_with_overflowing_block() {
        let cfg = PaginationConfig {
            keep_headings_with_next: true,
            ..config(100.0)
        };
        let pages = assemble(
            vec![para("a", 60.0), heading("h", 20.0), para("b", 50.0)],
            &cfg,
        );
        assert_eq!(
            labels(&pages),
            vec![vec!["<x>a</x>"], vec!["<x>h</x>", "<x>b</x>"]]
        );
        assert_eq!(pages[1].height, 70.0);
    }

    #[test]
    fn test_overflowing_paragraph_starts_next_page_by_default() {
        let pages = assemble(
            vec![para("a", 60.0), heading("h", 20.0), para("b", 50.0)],
            &config(100.0),
        );
        assert_eq!(
            labels(&pages),
            vec![vec!["<x>a</x>", "<x>h</x>"], vec!["<x>b</x>"]]
        );
    }

    #[test]
    fn test_heading_only_page_is_not_emptied() {
        let pages = assemble(vec![heading("h", 30.0), para("b", 90.0)], &config(100.0));
        assert_eq!(labels(&pages), vec![vec!["<x>h</x>"], vec!["<x>b</x>"]]);
    }

    #[test]
    fn test_empty_input_yields_one_page() {
        let pages = assemble(Vec::new(), &config(100.0));
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 1);
        assert!(pages[0].blocks.is_empty());
    }
}
