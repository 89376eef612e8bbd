//! Bytes → flowed HTML.

mod docx;

pub use docx::DocxConverter;

use std::future::Future;

use crate::error::Result;
use crate::util::{decode_text, extract_declared_encoding};

/// Turns document bytes into the flowed HTML the paginator consumes.
pub trait DocumentConverter {
    /// Fails with [`Error::Conversion`](crate::Error::Conversion).
    fn convert(&self, data: &[u8]) -> impl Future<Output = Result<String>>;
}

/// Input that is already HTML, in any encoding `encoding_rs` knows.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlConverter;

impl HtmlConverter {
    pub fn decode(data: &[u8]) -> String {
        decode_text(data, extract_declared_encoding(data)).into_owned()
    }
}

impl DocumentConverter for HtmlConverter {
    async fn convert(&self, data: &[u8]) -> Result<String> {
        Ok(Self::decode(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_html_passthrough() {
        let html = HtmlConverter.convert(b"<p>caf\xc3\xa9</p>").await.unwrap();
        assert_eq!(html, "<p>café</p>");
    }

    #[tokio::test]
    async fn test_html_declared_charset() {
        let html = HtmlConverter
            .convert(b"<meta charset=\"iso-8859-1\"><p>caf\xe9</p>")
            .await
            .unwrap();
        assert!(html.ends_with("<p>café</p>"));
    }
}
