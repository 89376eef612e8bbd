//! Byte sources and document resolution.

mod adapter;
mod byte_source;
mod source;

pub use adapter::ByteSourceCursor;
pub use byte_source::{ByteSource, FileSource, MemorySource};
pub use source::{ByteResolver, DataUrl, DefaultResolver, DocumentSource, Fetcher, NoFetcher};
