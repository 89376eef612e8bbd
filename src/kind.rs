//! Document kind detection.

use std::fmt;
use std::sync::Arc;

use memchr::memmem;
use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::io::{ByteSource, ByteSourceCursor, MemorySource};

/// The document families the viewer displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Word,
    Excel,
    Ppt,
}

impl DocumentKind {
    /// Kind from a file name or URL path extension.
    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" | "docx" => Some(Self::Word),
            "xls" | "xlsx" => Some(Self::Excel),
            "ppt" | "pptx" => Some(Self::Ppt),
            _ => None,
        }
    }

    /// Kind from a MIME type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "application/pdf" => Some(Self::Pdf),
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Word)
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Excel)
            }
            "application/vnd.ms-powerpoint"
            | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
                Some(Self::Ppt)
            }
            _ => None,
        }
    }

    /// Kind from content: `%PDF` header, or the part folders of an OOXML zip.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let head = &data[..data.len().min(1024)];
        if memmem::find(head, b"%PDF-").is_some() {
            return Some(Self::Pdf);
        }
        if data.starts_with(b"PK\x03\x04") {
            return sniff_ooxml(data);
        }
        None
    }

    /// Detect a kind: extension first, then declared media type, then content.
    pub fn detect(name: Option<&str>, media_type: Option<&str>, data: &[u8]) -> Option<Self> {
        name.and_then(Self::from_extension)
            .or_else(|| media_type.and_then(Self::from_media_type))
            .or_else(|| Self::sniff(data))
    }

    /// MIME type used when offering the original file for download.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Word => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Ppt => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        }
    }

    /// Default file name used when offering a buffer for download.
    pub fn download_name(&self) -> &'static str {
        match self {
            Self::Pdf => "document.pdf",
            Self::Word => "document.docx",
            Self::Excel => "spreadsheet.xlsx",
            Self::Ppt => "presentation.pptx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Excel => "excel",
            Self::Ppt => "ppt",
        })
    }
}

fn sniff_ooxml(data: &[u8]) -> Option<DocumentKind> {
    let source: Arc<dyn ByteSource> = Arc::new(MemorySource::new(data.to_vec()));
    let archive = ZipArchive::new(ByteSourceCursor::new(source)).ok()?;

    archive.file_names().find_map(|name| {
        if name.starts_with("word/") {
            Some(DocumentKind::Word)
        } else if name.starts_with("xl/") {
            Some(DocumentKind::Excel)
        } else if name.starts_with("ppt/") {
            Some(DocumentKind::Ppt)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;

    use super::*;

    fn zip_with(entry: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(entry, SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<x/>").unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(DocumentKind::from_extension("a.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("r.doc"), Some(DocumentKind::Word));
        assert_eq!(DocumentKind::from_extension("s.xlsx"), Some(DocumentKind::Excel));
        assert_eq!(DocumentKind::from_extension("p.pptx"), Some(DocumentKind::Ppt));
        assert_eq!(DocumentKind::from_extension("notes.txt"), None);
        assert_eq!(DocumentKind::from_extension("noext"), None);
    }

    #[test]
    fn test_sniff_pdf() {
        assert_eq!(DocumentKind::sniff(b"%PDF-1.4\n..."), Some(DocumentKind::Pdf));
    }

    #[test]
    fn test_sniff_ooxml_parts() {
        assert_eq!(
            DocumentKind::sniff(&zip_with("word/document.xml")),
            Some(DocumentKind::Word)
        );
        assert_eq!(
            DocumentKind::sniff(&zip_with("xl/workbook.xml")),
            Some(DocumentKind::Excel)
        );
        assert_eq!(
            DocumentKind::sniff(&zip_with("ppt/presentation.xml")),
            Some(DocumentKind::Ppt)
        );
    }

    #[test]
    fn test_detect_prefers_extension() {
        assert_eq!(
            DocumentKind::detect(Some("x.xlsx"), None, b"%PDF-1.4"),
            Some(DocumentKind::Excel)
        );
        assert_eq!(
            DocumentKind::detect(None, Some("application/pdf"), b""),
            Some(DocumentKind::Pdf)
        );
    }
}
