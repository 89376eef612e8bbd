//! Viewer loading, last-load-wins and state transitions.

use std::io::{Cursor, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use folio::dom::{ArenaDom, inner_html};
use folio::viewer::MAX_WORD_ZOOM;
use folio::{
    ByteResolver, ChapterConfig, DefaultResolver, DocumentKind, DocumentSource, DocxConverter,
    DocxRenderer, Error, HtmlConverter, LoadRequest, Result, ViewMode, Viewer, ViewerConfig,
    ViewerState,
};

const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

fn docx(body: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    write!(
        writer,
        r#"<?xml version="1.0"?><w:document {W}><w:body>{body}</w:body></w:document>"#
    )
    .unwrap();
    writer.finish().unwrap().into_inner()
}

fn para(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

const PAGE_BREAK: &str = r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#;

fn html_doc(name: &str, html: &str) -> DocumentSource {
    DocumentSource::Bytes {
        data: html.as_bytes().to_vec(),
        name: Some(name.into()),
    }
}

/// Resolver that keeps documents named `slow*` pending for a few polls.
struct SlowResolver;

impl ByteResolver for SlowResolver {
    async fn resolve(&self, source: &DocumentSource) -> Result<Vec<u8>> {
        let DocumentSource::Bytes { data, name } = source else {
            return Err(Error::InvalidSource("buffers only".into()));
        };
        if name.as_deref().is_some_and(|n| n.starts_with("slow")) {
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
        }
        Ok(data.clone())
    }
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_docx_file_is_paginated_on_explicit_breaks() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.docx");
    let body = format!("{}{PAGE_BREAK}{}", para("First"), para("Second"));
    std::fs::write(&path, docx(&body)).unwrap();

    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), DocxConverter);
    let doc = viewer
        .load(DocumentSource::Path(path))
        .await
        .unwrap()
        .loaded()
        .unwrap();

    assert_eq!(doc.state.kind(), DocumentKind::Word);
    assert_eq!(doc.state.total_pages(), 2);
    assert!(doc.state.pages()[0].contains("First"));
    assert!(doc.state.pages()[1].contains("Second"));
    assert!(doc.pagination.is_some());
    assert_eq!(viewer.state(), Some(doc.state));
}

#[tokio::test]
async fn test_data_url_load_detects_kind_from_media_type() {
    let data = docx(&para("Inline"));
    let url = format!(
        "data:{};base64,{}",
        DocumentKind::Word.mime_type(),
        STANDARD.encode(&data)
    );

    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), DocxConverter);
    let doc = viewer
        .load(DocumentSource::from_reference(&url))
        .await
        .unwrap()
        .loaded()
        .unwrap();

    assert_eq!(doc.state.total_pages(), 1);
    assert!(doc.state.current_content().unwrap().contains("Inline"));
}

#[tokio::test]
async fn test_presentations_show_placeholder_slides() {
    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), HtmlConverter);
    let doc = viewer
        .load(html_doc("deck.pptx", ""))
        .await
        .unwrap()
        .loaded()
        .unwrap();

    assert_eq!(doc.state.kind(), DocumentKind::Ppt);
    assert_eq!(doc.state.total_pages(), 5);
    assert!(doc.state.pages()[4].contains("Slide 5"));
}

#[tokio::test]
async fn test_pdf_is_left_to_the_display_layer() {
    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), HtmlConverter);
    let err = viewer
        .load(DocumentSource::bytes(b"%PDF-1.7\n".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
    assert_eq!(viewer.state(), None);

    let ticket = viewer.begin_load();
    let state = ViewerState::with_total_pages(DocumentKind::Pdf, 12, ViewMode::Continuous);
    let doc = viewer.commit(ticket, state).loaded().unwrap();
    assert_eq!(doc.event().total_pages, 12);
}

#[tokio::test]
async fn test_remote_url_without_fetcher_fails() {
    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), HtmlConverter);
    let err = viewer
        .load(DocumentSource::from_reference("https://example.com/a.docx"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
}

#[tokio::test]
async fn test_rendered_load_groups_chapters() {
    let body = format!(
        "{}{}{PAGE_BREAK}{}",
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
        para("text"),
        para("more")
    );
    let data = docx(&body);

    let config = ViewerConfig::default();
    let renderer = DocxRenderer::new(&config.chapters);
    let viewer = Viewer::new(config, DefaultResolver::new(), DocxConverter);

    let mut dom = ArenaDom::new();
    let container = dom.create_html_element("div", Vec::new());
    dom.append(dom.document(), container);

    let source = DocumentSource::Bytes {
        data,
        name: Some("book.docx".into()),
    };
    let doc = viewer
        .load_rendered(&source, &renderer, &mut dom, container)
        .await
        .unwrap()
        .loaded()
        .unwrap();

    assert_eq!(doc.state.total_pages(), 2);
    assert!(doc.pagination.is_none());
    let layout = doc.chapters.unwrap();
    assert_eq!(layout.len(), 1);
    assert_eq!(dom.deep_text(layout.chapters[0].heading), "Intro");
}

#[tokio::test]
async fn test_grouping_failure_keeps_ungrouped_render() {
    let body = format!(
        "{}{}{PAGE_BREAK}{}",
        r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Intro</w:t></w:r></w:p>"#,
        para("text"),
        para("more")
    );
    let data = docx(&body);

    let mut config = ViewerConfig::default();
    config.chapters = ChapterConfig {
        heading_level: 9,
        ..Default::default()
    };
    let renderer = DocxRenderer::new(&config.chapters);

    let mut expected = ArenaDom::new();
    let expected_container = expected.create_html_element("div", Vec::new());
    expected.append(expected.document(), expected_container);
    let html = DocxConverter::to_html(&data).unwrap();
    renderer.render_html(&html, &mut expected, expected_container);

    let viewer = Viewer::new(config, DefaultResolver::new(), DocxConverter);
    let mut dom = ArenaDom::new();
    let container = dom.create_html_element("div", Vec::new());
    dom.append(dom.document(), container);

    let doc = viewer
        .load_rendered(&DocumentSource::bytes(data), &renderer, &mut dom, container)
        .await
        .unwrap()
        .loaded()
        .unwrap();

    assert!(doc.chapters.is_none());
    assert_eq!(doc.state.total_pages(), 2);
    assert_eq!(
        inner_html(&dom, container),
        inner_html(&expected, expected_container)
    );
    assert!(!inner_html(&dom, container).contains("chapter-block"));
}

// ============================================================================
// Last load wins
// ============================================================================

#[tokio::test]
async fn test_newer_load_supersedes_slower_one() {
    let viewer = Viewer::new(ViewerConfig::default(), SlowResolver, HtmlConverter);

    // the second load starts after the first is already waiting on its bytes
    let (slow, fast) = tokio::join!(viewer.load(html_doc("slow.docx", "<p>old</p>")), async {
        tokio::task::yield_now().await;
        viewer.load(html_doc("fast.docx", "<p>new</p>")).await
    });

    assert!(slow.unwrap().is_superseded());
    assert!(!fast.unwrap().is_superseded());
    let state = viewer.state().unwrap();
    assert_eq!(state.current_content(), Some("<p>new</p>"));
}

#[tokio::test]
async fn test_superseded_load_does_not_overwrite_state() {
    let viewer = Viewer::new(ViewerConfig::default(), SlowResolver, HtmlConverter);
    viewer.load(html_doc("a.docx", "<p>first</p>")).await.unwrap();

    let ticket = viewer.begin_load();
    viewer.load(html_doc("b.docx", "<p>second</p>")).await.unwrap();

    let stale = ViewerState::with_total_pages(DocumentKind::Pdf, 3, ViewMode::Page);
    assert!(viewer.commit(ticket, stale).is_superseded());
    assert_eq!(
        viewer.state().unwrap().current_content(),
        Some("<p>second</p>")
    );
}

// ============================================================================
// Transitions through the viewer
// ============================================================================

#[tokio::test]
async fn test_transitions_emit_page_change_events() {
    let html = "<p>1</p><!-- pagebreak --><p>2</p><!-- pagebreak --><p>3</p>";
    let viewer = Viewer::new(ViewerConfig::default(), DefaultResolver::new(), HtmlConverter);

    assert_eq!(viewer.apply(|s| s.next_page()), None);

    let request = LoadRequest::new(html_doc("three.docx", html));
    viewer.load(request).await.unwrap();

    let event = viewer.apply(ViewerState::last_page).unwrap();
    assert_eq!(event.page, 3);
    assert_eq!(event.total_pages, 3);
    assert_eq!(event.kind, DocumentKind::Word);

    let event = viewer.apply(|s| s.go_to_page(2)).unwrap();
    assert_eq!(event.page, 2);

    assert_eq!(event.view_mode, ViewMode::Continuous);
    let event = viewer.apply(ViewerState::toggle_view_mode).unwrap();
    assert_eq!(event.view_mode, ViewMode::Page);

    for _ in 0..10 {
        viewer.apply(ViewerState::zoom_in);
    }
    assert_eq!(viewer.state().unwrap().zoom(), MAX_WORD_ZOOM);
}
