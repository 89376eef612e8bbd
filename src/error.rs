//! Error types for folio operations.

use thiserror::Error;

/// Errors that can occur while loading, paginating or rendering a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Byte retrieval failed (network, file system, malformed data URL).
    #[error("failed to fetch document: {0}")]
    Fetch(String),

    /// The document reference is of a kind the resolver does not understand.
    #[error("invalid document source: {0}")]
    InvalidSource(String),

    /// The document-to-HTML converter failed.
    #[error("document conversion failed: {0}")]
    Conversion(String),

    /// The high-fidelity renderer failed.
    #[error("document render failed: {0}")]
    Render(String),

    /// No rendering surface is available for block measurement.
    ///
    /// Never surfaced by a load; the pipeline falls back to heuristic
    /// height estimation when it sees this.
    #[error("no rendering surface available for measurement")]
    MeasurementUnavailable,

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
