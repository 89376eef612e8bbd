//! # folio
//!
//! Document-model core of an embeddable office-document viewer.
//!
//! ## Features
//!
//! - Detect PDF, Word, Excel and PowerPoint documents by name or content
//! - Resolve documents from paths, data URLs, buffers or a host fetcher
//! - Convert DOCX to flowed HTML
//! - Paginate flowed HTML into A4 pages, honoring explicit page breaks
//! - Group chapters of a rendered document for print
//! - Immutable viewer state with page navigation, zoom and rotation
//!
//! ## Quick Start
//!
//! ```
//! use folio::config::PaginationConfig;
//! use folio::paginate::paginate;
//!
//! let html = "<h1>Intro</h1><p>Hello.</p><!-- pagebreak --><h1>Next</h1>";
//! let result = paginate(html, &PaginationConfig::default());
//!
//! assert_eq!(result.pages.len(), 2);
//! assert_eq!(result.pages[0].html, "<h1>Intro</h1><p>Hello.</p>");
//! ```
//!
//! ## Loading documents
//!
//! A [`Viewer`] ties the pieces together and keeps the state of the last
//! load:
//!
//! ```no_run
//! use folio::{DefaultResolver, DocumentSource, DocxConverter, Viewer, ViewerConfig};
//!
//! # async fn run() -> folio::Result<()> {
//! let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), DocxConverter);
//! let outcome = viewer.load(DocumentSource::from_reference("report.docx")).await?;
//! if let Some(doc) = outcome.loaded() {
//!     println!("{} pages", doc.state.total_pages());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chapters;
pub mod config;
pub mod convert;
pub mod css;
pub mod dom;
pub mod error;
pub mod io;
pub mod kind;
pub mod paginate;
pub mod render;
pub(crate) mod util;
pub mod viewer;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use chapters::{ChapterGrouper, ChapterLayout, ChapterRange, GroupingError, group_chapters};
pub use config::{ChapterConfig, PaginationConfig, ToolbarConfig, ViewMode, ViewerConfig};
pub use convert::{DocumentConverter, DocxConverter, HtmlConverter};
pub use error::{Error, Result};
pub use io::{ByteResolver, DefaultResolver, DocumentSource, Fetcher};
pub use kind::DocumentKind;
pub use paginate::{Page, Pagination, PaginationMode, Paginator, RenderSurface, paginate};
pub use render::{DocxRenderer, HighFidelityRenderer};
pub use viewer::{LoadOutcome, LoadRequest, LoadedDocument, PageChangeEvent, Viewer, ViewerState};
