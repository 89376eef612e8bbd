//! Document references and byte resolution.

use std::future::Future;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;

use super::byte_source::{ByteSource, FileSource};
use crate::error::{Error, Result};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local file path.
    Path(PathBuf),
    /// `http(s)://` or `data:` URL.
    Url(String),
    /// In-memory buffer (an uploaded file or blob contents), with an
    /// optional file name used for kind detection.
    Bytes { data: Vec<u8>, name: Option<String> },
}

impl DocumentSource {
    /// Classify a textual reference as a URL or a file path.
    pub fn from_reference(reference: &str) -> Self {
        let lower = reference.trim_start().to_ascii_lowercase();
        if lower.starts_with("data:") || lower.contains("://") {
            DocumentSource::Url(reference.trim().to_string())
        } else {
            DocumentSource::Path(PathBuf::from(reference))
        }
    }

    pub fn bytes(data: Vec<u8>) -> Self {
        DocumentSource::Bytes { data, name: None }
    }

    /// The file name or URL used for extension-based kind detection.
    pub fn name_hint(&self) -> Option<String> {
        match self {
            DocumentSource::Path(p) => Some(p.to_string_lossy().into_owned()),
            DocumentSource::Url(u) if is_data_url(u) => None,
            DocumentSource::Url(u) => {
                let without_query = u.split(['?', '#']).next().unwrap_or(u);
                Some(without_query.to_string())
            }
            DocumentSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Media type declared by a `data:` URL, if any.
    pub fn declared_media_type(&self) -> Option<String> {
        match self {
            DocumentSource::Url(u) if is_data_url(u) => {
                DataUrl::parse(u).ok().map(|d| d.media_type).filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }
}

fn is_data_url(url: &str) -> bool {
    url.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:"))
}

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    /// Parse `data:[<mediatype>][;base64],<data>`.
    pub fn parse(url: &str) -> Result<Self> {
        if !is_data_url(url) {
            return Err(Error::InvalidSource(format!("not a data URL: {url:.32}")));
        }
        let (header, payload) = url[5..]
            .split_once(',')
            .ok_or_else(|| Error::InvalidSource("data URL without payload".into()))?;

        let mut params = header.split(';');
        let media_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let data = if is_base64 {
            let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map_err(|e| Error::InvalidSource(format!("invalid base64 in data URL: {e}")))?
        } else {
            percent_decode_str(payload).collect()
        };

        Ok(Self { media_type, data })
    }
}

/// Retrieves remote documents. Injected by the host; folio ships no HTTP
/// client.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Fetcher used when the host provides none: every remote fetch fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Err(Error::Fetch(format!("no fetcher configured for {url}")))
    }
}

/// Turns a [`DocumentSource`] into bytes.
pub trait ByteResolver {
    fn resolve(&self, source: &DocumentSource) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Resolver for paths, data URLs and buffers, delegating `http(s)` to a
/// [`Fetcher`].
#[derive(Debug, Default, Clone)]
pub struct DefaultResolver<F = NoFetcher> {
    fetcher: F,
}

impl DefaultResolver<NoFetcher> {
    pub fn new() -> Self {
        Self { fetcher: NoFetcher }
    }
}

impl<F: Fetcher> DefaultResolver<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    fn read_path(path: &Path) -> Result<Vec<u8>> {
        FileSource::open(path)
            .and_then(|source| source.read_all())
            .map_err(|e| Error::Fetch(format!("{}: {e}", path.display())))
    }
}

impl<F: Fetcher> ByteResolver for DefaultResolver<F> {
    async fn resolve(&self, source: &DocumentSource) -> Result<Vec<u8>> {
        match source {
            DocumentSource::Path(path) => Self::read_path(path),
            DocumentSource::Bytes { data, .. } => Ok(data.clone()),
            DocumentSource::Url(url) if is_data_url(url) => DataUrl::parse(url).map(|d| d.data),
            DocumentSource::Url(url) => {
                let scheme = url.split("://").next().unwrap_or_default();
                if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
                    log::debug!("fetching {url}");
                    self.fetcher.fetch(url).await
                } else if scheme.eq_ignore_ascii_case("file") {
                    Self::read_path(Path::new(&url[scheme.len() + 3..]))
                } else {
                    Err(Error::InvalidSource(format!(
                        "unsupported URL scheme '{scheme}'"
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_reference() {
        assert_eq!(
            DocumentSource::from_reference("docs/report.docx"),
            DocumentSource::Path(PathBuf::from("docs/report.docx"))
        );
        assert!(matches!(
            DocumentSource::from_reference("https://example.com/a.pdf"),
            DocumentSource::Url(_)
        ));
        assert!(matches!(
            DocumentSource::from_reference("data:text/html,hi"),
            DocumentSource::Url(_)
        ));
    }

    #[test]
    fn test_name_hint_strips_query() {
        let src = DocumentSource::from_reference("https://example.com/files/a.xlsx?token=1");
        assert_eq!(
            src.name_hint().as_deref(),
            Some("https://example.com/files/a.xlsx")
        );
    }

    #[test]
    fn test_data_url_base64() {
        let url = DataUrl::parse("data:application/pdf;base64,JVBERi0=").unwrap();
        assert_eq!(url.media_type, "application/pdf");
        assert_eq!(url.data, b"%PDF-");
    }

    #[test]
    fn test_data_url_percent_encoded() {
        let url = DataUrl::parse("data:text/html,%3Cp%3Ehi%3C%2Fp%3E").unwrap();
        assert_eq!(url.data, b"<p>hi</p>");
    }

    #[test]
    fn test_data_url_without_comma_is_invalid() {
        assert!(matches!(
            DataUrl::parse("data:text/html"),
            Err(Error::InvalidSource(_))
        ));
    }

    #[test]
    fn test_data_url_bad_base64_is_invalid() {
        assert!(matches!(
            DataUrl::parse("data:application/pdf;base64,@@not base64@@"),
            Err(Error::InvalidSource(_))
        ));
    }

    #[tokio::test]
    async fn test_resolver_rejects_unknown_scheme() {
        let resolver = DefaultResolver::new();
        let err = resolver
            .resolve(&DocumentSource::Url("ftp://host/a.docx".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSource(_)));
    }

    #[tokio::test]
    async fn test_resolver_without_fetcher_fails_fetch() {
        let resolver = DefaultResolver::new();
        let err = resolver
            .resolve(&DocumentSource::Url("https://host/a.docx".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }

    #[tokio::test]
    async fn test_resolver_missing_file_is_fetch_error() {
        let resolver = DefaultResolver::new();
        let err = resolver
            .resolve(&DocumentSource::Path("/definitely/not/here.docx".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
    }
}
