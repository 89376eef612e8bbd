//! Block height measurement.
//!
//! Two measurers implement [`BlockMeasurer`]: [`SurfaceMeasurer`] renders
//! each block on an off-screen [`RenderSurface`], [`HeuristicMeasurer`]
//! estimates from word counts. [`select_measurer`] picks one per batch.

use serde::Serialize;

use super::block::{Block, BlockKind};
use crate::config::PaginationConfig;
use crate::error::{Error, Result};

/// Height of a horizontal rule including its margins.
const RULE_HEIGHT: f32 = 16.0;

/// Which measurer produced a batch's heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureStrategy {
    Surface,
    Heuristic,
}

/// Assigns a height to every block of a batch.
pub trait BlockMeasurer {
    fn strategy(&self) -> MeasureStrategy;

    /// Fill in `height` for every block. Never fails: a block that cannot be
    /// measured gets zero height.
    fn measure(&mut self, blocks: &mut [Block]);
}

/// Word-count based estimate.
#[derive(Debug, Clone)]
pub struct HeuristicMeasurer {
    config: PaginationConfig,
}

impl HeuristicMeasurer {
    pub fn new(config: &PaginationConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Rendered lines for `words` words; zero words take no lines.
    fn lines(&self, words: usize) -> usize {
        words.div_ceil(self.config.words_per_line.max(1))
    }

    fn line_block(&self, lines: usize) -> f32 {
        lines as f32 * self.config.line_height
    }

    /// Estimated height of one block.
    pub fn estimate(&self, block: &Block) -> f32 {
        let cfg = &self.config;
        match &block.kind {
            BlockKind::Heading { level } => {
                let lines = self.lines(block.words).max(1);
                self.line_block(lines) * heading_scale(*level) + cfg.heading_allowance
            }
            BlockKind::Paragraph => self.line_block(self.lines(block.words)) + cfg.paragraph_allowance,
            BlockKind::List { items } => {
                let lines: usize = items.iter().map(|&w| self.lines(w).max(1)).sum();
                self.line_block(lines) + cfg.paragraph_allowance
            }
            BlockKind::Table { rows } => {
                let lines: usize = rows.iter().map(|&w| self.lines(w).max(1)).sum();
                self.line_block(lines) + cfg.paragraph_allowance
            }
            BlockKind::Image { height } => height.unwrap_or(cfg.image_height),
            BlockKind::Rule => RULE_HEIGHT,
            BlockKind::Text | BlockKind::Other => self.line_block(self.lines(block.words)),
        }
    }
}

/// Line-height multiplier per heading level, tracking the usual
/// `2em / 1.5em / 1.17em` user-agent sizes.
fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.25,
        _ => 1.0,
    }
}

impl BlockMeasurer for HeuristicMeasurer {
    fn strategy(&self) -> MeasureStrategy {
        MeasureStrategy::Heuristic
    }

    fn measure(&mut self, blocks: &mut [Block]) {
        for block in blocks {
            block.height = Some(self.estimate(block));
        }
    }
}

/// An off-screen rendering surface able to report realized heights.
///
/// Implemented by the host platform (a hidden DOM container, a layout
/// engine). Calls always come in the order `attach`, any number of
/// `realized_height`, `detach`; [`Scratch`] enforces that.
pub trait RenderSurface {
    /// Whether the surface can lay out content at all.
    fn is_available(&self) -> bool;

    /// Prepare a scratch container of the given content width.
    fn attach(&mut self, width: f32) -> Result<()>;

    /// Render `html` into the scratch container and return its height.
    fn realized_height(&mut self, html: &str) -> Result<f32>;

    /// Remove the scratch container.
    fn detach(&mut self);
}

/// An attached scratch container. Detaches on drop.
pub struct Scratch<'s> {
    surface: &'s mut dyn RenderSurface,
}

impl<'s> Scratch<'s> {
    pub fn attach(surface: &'s mut dyn RenderSurface, width: f32) -> Result<Self> {
        surface.attach(width)?;
        Ok(Self { surface })
    }

    pub fn measure(&mut self, html: &str) -> Result<f32> {
        let height = self.surface.realized_height(html)?;
        if height.is_finite() && height >= 0.0 {
            Ok(height)
        } else {
            Err(Error::Render(format!("surface reported height {height}")))
        }
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        self.surface.detach();
    }
}

/// Measures blocks by rendering them on a [`RenderSurface`].
///
/// The surface is borrowed mutably for the measurer's lifetime, so two
/// batches can never write to it at once.
pub struct SurfaceMeasurer<'s> {
    surface: &'s mut dyn RenderSurface,
    width: f32,
    fallback: HeuristicMeasurer,
}

impl<'s> SurfaceMeasurer<'s> {
    pub fn new(surface: &'s mut dyn RenderSurface, config: &PaginationConfig) -> Self {
        Self {
            surface,
            width: config.page_width,
            fallback: HeuristicMeasurer::new(config),
        }
    }
}

impl BlockMeasurer for SurfaceMeasurer<'_> {
    fn strategy(&self) -> MeasureStrategy {
        MeasureStrategy::Surface
    }

    fn measure(&mut self, blocks: &mut [Block]) {
        let mut scratch = match Scratch::attach(&mut *self.surface, self.width) {
            Ok(scratch) => scratch,
            Err(e) => {
                log::warn!("could not attach measuring surface ({e}); estimating heights");
                self.fallback.measure(blocks);
                return;
            }
        };

        for (i, block) in blocks.iter_mut().enumerate() {
            let height = scratch.measure(&block.html).unwrap_or_else(|e| {
                log::warn!("block {i} could not be measured ({e}); counting it as zero height");
                0.0
            });
            block.height = Some(height);
        }
    }
}

/// Pick the measurer for one batch.
///
/// Without a surface, or with one that reports itself unavailable, the
/// heuristic measurer is used.
pub fn select_measurer<'s>(
    surface: Option<&'s mut dyn RenderSurface>,
    config: &PaginationConfig,
) -> Box<dyn BlockMeasurer + 's> {
    match surface {
        Some(surface) if surface.is_available() => {
            Box::new(SurfaceMeasurer::new(surface, config))
        }
        _ => {
            log::debug!("{}; using heuristic measurement", Error::MeasurementUnavailable);
            Box::new(HeuristicMeasurer::new(config))
        }
    }
}
