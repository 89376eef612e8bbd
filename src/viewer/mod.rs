//! Document loading and the owner of the current [`ViewerState`].
//!
//! A [`Viewer`] resolves bytes, works out the document kind and, for Word
//! documents, either paginates converted HTML or hands the bytes to a
//! high-fidelity renderer and groups chapters. Loads may overlap on one
//! executor; only the most recently started one commits.

mod state;

pub use state::{
    A4_WIDTH_PX, MAX_WORD_ZOOM, MAX_ZOOM, MIN_ZOOM, PageChangeEvent, ViewerState, ZOOM_STEP,
};

use std::cell::{Cell, RefCell};

use crate::chapters::{ChapterGrouper, ChapterLayout};
use crate::config::ViewerConfig;
use crate::convert::DocumentConverter;
use crate::dom::{ArenaDom, ArenaNodeId};
use crate::error::{Error, Result};
use crate::io::{ByteResolver, DocumentSource};
use crate::kind::DocumentKind;
use crate::paginate::{Pagination, Paginator, RenderSurface};
use crate::render::HighFidelityRenderer;

/// Number of placeholder slides shown for presentations.
pub const PLACEHOLDER_SLIDES: usize = 5;

/// Placeholder slides shown for presentations, which are not rendered.
pub fn placeholder_slides() -> Vec<String> {
    (1..=PLACEHOLDER_SLIDES)
        .map(|n| format!(r#"<div class="ppt-slide"><h1>Slide {n}</h1></div>"#))
        .collect()
}

/// Identifies one load. Only the ticket issued last may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Load counter for last-load-wins.
#[derive(Debug, Default)]
pub struct Generation(Cell<u64>);

impl Generation {
    /// Start a load, superseding every earlier ticket.
    pub fn begin(&self) -> LoadTicket {
        let next = self.0.get() + 1;
        self.0.set(next);
        LoadTicket(next)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.0.get() == ticket.0
    }
}

/// A document ready for display.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub state: ViewerState,
    /// Present on the paginated Word path.
    pub pagination: Option<Pagination>,
    /// Present on the high-fidelity Word path when grouping succeeded.
    pub chapters: Option<ChapterLayout>,
}

impl LoadedDocument {
    fn new(state: ViewerState) -> Self {
        Self {
            state,
            pagination: None,
            chapters: None,
        }
    }

    pub fn event(&self) -> PageChangeEvent {
        self.state.event()
    }
}

/// How a load ended.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded(LoadedDocument),
    /// A newer load started before this one finished; its results were
    /// discarded.
    Superseded,
}

impl LoadOutcome {
    pub fn loaded(self) -> Option<LoadedDocument> {
        match self {
            LoadOutcome::Loaded(doc) => Some(doc),
            LoadOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, LoadOutcome::Superseded)
    }
}

/// One document load.
pub struct LoadRequest<'s> {
    pub source: DocumentSource,
    /// Forced kind; detected from name and content when absent.
    pub kind: Option<DocumentKind>,
    surface: Option<&'s mut dyn RenderSurface>,
}

impl<'s> LoadRequest<'s> {
    pub fn new(source: DocumentSource) -> Self {
        Self {
            source,
            kind: None,
            surface: None,
        }
    }

    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Measure blocks on `surface` instead of estimating them.
    pub fn with_surface(mut self, surface: &'s mut dyn RenderSurface) -> Self {
        self.surface = Some(surface);
        self
    }
}

impl From<DocumentSource> for LoadRequest<'_> {
    fn from(source: DocumentSource) -> Self {
        Self::new(source)
    }
}

/// Loads documents and owns the state shown to the user.
pub struct Viewer<R, C> {
    config: ViewerConfig,
    resolver: R,
    converter: C,
    generation: Generation,
    state: RefCell<Option<ViewerState>>,
}

impl<R: ByteResolver, C: DocumentConverter> Viewer<R, C> {
    pub fn new(config: ViewerConfig, resolver: R, converter: C) -> Self {
        Self {
            config,
            resolver,
            converter,
            generation: Generation::default(),
            state: RefCell::new(None),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// State of the last committed load.
    pub fn state(&self) -> Option<ViewerState> {
        self.state.borrow().clone()
    }

    /// Apply a transition to the current state and return the resulting
    /// page-change event.
    pub fn apply<F>(&self, transition: F) -> Option<PageChangeEvent>
    where
        F: FnOnce(&ViewerState) -> ViewerState,
    {
        let mut slot = self.state.borrow_mut();
        let next = transition(slot.as_ref()?);
        let event = next.event();
        *slot = Some(next);
        Some(event)
    }

    /// Start a load whose pages are produced outside the viewer (PDF
    /// canvases, spreadsheet tables). Pair with [`Viewer::commit`].
    pub fn begin_load(&self) -> LoadTicket {
        self.generation.begin()
    }

    /// Commit `state` if `ticket` is still the newest load.
    pub fn commit(&self, ticket: LoadTicket, state: ViewerState) -> LoadOutcome {
        self.commit_document(ticket, LoadedDocument::new(state))
    }

    fn commit_document(&self, ticket: LoadTicket, doc: LoadedDocument) -> LoadOutcome {
        if !self.generation.is_current(ticket) {
            log::debug!("discarding superseded load {ticket:?}");
            return LoadOutcome::Superseded;
        }
        *self.state.borrow_mut() = Some(doc.state.clone());
        LoadOutcome::Loaded(doc)
    }

    /// Resolve, detect and, for Word documents, paginate.
    ///
    /// PDF and Excel documents fail with [`Error::UnsupportedFormat`]: the
    /// display layer renders those and commits through
    /// [`Viewer::begin_load`]/[`Viewer::commit`].
    pub async fn load<'s>(&self, request: impl Into<LoadRequest<'s>>) -> Result<LoadOutcome> {
        let LoadRequest {
            source,
            kind,
            surface,
        } = request.into();
        let ticket = self.generation.begin();

        let data = self.resolver.resolve(&source).await?;
        if !self.generation.is_current(ticket) {
            return Ok(LoadOutcome::Superseded);
        }

        let kind = detect_kind(&source, kind, &data)?;
        log::debug!("loading {} document ({} bytes)", kind, data.len());
        let view_mode = self.config.default_view_mode;

        let doc = match kind {
            DocumentKind::Word => {
                let html = self.converter.convert(&data).await?;
                if !self.generation.is_current(ticket) {
                    return Ok(LoadOutcome::Superseded);
                }
                let pagination =
                    Paginator::new(self.config.pagination.clone()).paginate_with(&html, surface);
                log::debug!("paginated into {} page(s)", pagination.total_pages());
                LoadedDocument {
                    state: ViewerState::with_pages(kind, pagination.page_contents(), view_mode),
                    pagination: Some(pagination),
                    chapters: None,
                }
            }
            DocumentKind::Ppt => {
                LoadedDocument::new(ViewerState::with_pages(kind, placeholder_slides(), view_mode))
            }
            DocumentKind::Pdf | DocumentKind::Excel => {
                return Err(Error::UnsupportedFormat(format!(
                    "{kind} documents are rendered by the display layer"
                )));
            }
        };

        Ok(self.commit_document(ticket, doc))
    }

    /// Render a Word document with `renderer` into `container`, then group
    /// its chapters.
    ///
    /// A grouping failure is logged and the ungrouped render kept. The page
    /// count is the number of rendered page containers.
    pub async fn load_rendered<H: HighFidelityRenderer>(
        &self,
        source: &DocumentSource,
        renderer: &H,
        dom: &mut ArenaDom,
        container: ArenaNodeId,
    ) -> Result<LoadOutcome> {
        let ticket = self.generation.begin();

        let data = self.resolver.resolve(source).await?;
        if !self.generation.is_current(ticket) {
            return Ok(LoadOutcome::Superseded);
        }

        renderer.render(&data, dom, container).await?;
        if !self.generation.is_current(ticket) {
            return Ok(LoadOutcome::Superseded);
        }

        let grouper = ChapterGrouper::new(self.config.chapters.clone());
        let chapters = match grouper.group(dom, container) {
            Ok(layout) => Some(layout),
            Err(e) => {
                log::warn!("chapter grouping failed, keeping ungrouped render: {e}");
                None
            }
        };

        let total = grouper.page_count(dom, container);
        let state =
            ViewerState::with_total_pages(DocumentKind::Word, total, self.config.default_view_mode);

        Ok(self.commit_document(
            ticket,
            LoadedDocument {
                state,
                pagination: None,
                chapters,
            },
        ))
    }
}

fn detect_kind(
    source: &DocumentSource,
    forced: Option<DocumentKind>,
    data: &[u8],
) -> Result<DocumentKind> {
    if let Some(kind) = forced {
        return Ok(kind);
    }
    let name = source.name_hint();
    let media = source.declared_media_type();
    DocumentKind::detect(name.as_deref(), media.as_deref(), data).ok_or_else(|| {
        Error::UnsupportedFormat(format!(
            "cannot determine the type of {}",
            name.as_deref().unwrap_or("the document")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewMode;
    use crate::convert::HtmlConverter;
    use crate::io::DefaultResolver;

    fn viewer() -> Viewer<DefaultResolver, HtmlConverter> {
        Viewer::new(ViewerConfig::default(), DefaultResolver::new(), HtmlConverter)
    }

    fn word_bytes(html: &str) -> DocumentSource {
        DocumentSource::Bytes {
            data: html.as_bytes().to_vec(),
            name: Some("doc.docx".into()),
        }
    }

    #[test]
    fn test_generation() {
        let generation = Generation::default();
        let first = generation.begin();
        assert!(generation.is_current(first));
        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn test_word_load_commits_state() {
        let viewer = viewer();
        let outcome = viewer
            .load(word_bytes("<p>a</p><!-- pagebreak --><p>b</p>"))
            .await
            .unwrap();
        let doc = outcome.loaded().unwrap();
        assert_eq!(doc.state.total_pages(), 2);
        assert_eq!(viewer.state(), Some(doc.state));

        let event = viewer.apply(ViewerState::next_page).unwrap();
        assert_eq!(event.page, 2);
        assert_eq!(event.kind, DocumentKind::Word);
    }

    #[tokio::test]
    async fn test_ppt_placeholder() {
        let viewer = viewer();
        let source = DocumentSource::Bytes {
            data: Vec::new(),
            name: Some("deck.pptx".into()),
        };
        let doc = viewer.load(source).await.unwrap().loaded().unwrap();
        assert_eq!(doc.state.total_pages(), PLACEHOLDER_SLIDES);
        assert_eq!(
            doc.state.current_content(),
            Some(r#"<div class="ppt-slide"><h1>Slide 1</h1></div>"#)
        );
    }

    #[tokio::test]
    async fn test_pdf_is_left_to_display_layer() {
        let viewer = viewer();
        let err = viewer
            .load(DocumentSource::bytes(b"%PDF-1.7".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));

        let ticket = viewer.begin_load();
        let state = ViewerState::with_total_pages(DocumentKind::Pdf, 12, ViewMode::Page);
        assert!(!viewer.commit(ticket, state).is_superseded());
        assert_eq!(viewer.state().map(|s| s.total_pages()), Some(12));
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let err = viewer()
            .load(DocumentSource::bytes(b"hello".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_forced_kind() {
        let request = LoadRequest::new(DocumentSource::bytes(b"<p>x</p>".to_vec()))
            .with_kind(DocumentKind::Word);
        let doc = viewer().load(request).await.unwrap().loaded().unwrap();
        assert_eq!(doc.state.kind(), DocumentKind::Word);
    }

    #[tokio::test]
    async fn test_stale_commit_is_superseded() {
        let viewer = viewer();
        let stale = viewer.begin_load();
        let _newer = viewer.begin_load();
        let state = ViewerState::with_total_pages(DocumentKind::Pdf, 1, ViewMode::Page);
        assert!(viewer.commit(stale, state).is_superseded());
        assert_eq!(viewer.state(), None);
    }
}
