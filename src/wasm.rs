//! WASM bindings for browser-side pagination.
//!
//! This module exposes the pagination pipeline to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::chapters::ChapterGrouper;
use crate::config::ViewerConfig;
use crate::convert::DocxConverter;
use crate::dom::{ArenaDom, body, inner_html, parse_html};
use crate::kind::DocumentKind;
use crate::paginate::Paginator;
use crate::render::DocxRenderer;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn config_from(config_json: Option<String>) -> Result<ViewerConfig, JsValue> {
    match config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => ViewerConfig::from_json(json).map_err(to_js),
        _ => Ok(ViewerConfig::default()),
    }
}

/// Paginate flowed HTML.
///
/// Takes the converted document HTML and an optional viewer configuration
/// (JSON, camelCase keys) and returns the pagination result as JSON.
#[wasm_bindgen]
pub fn paginate_html(html: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let config = config_from(config_json)?;
    let result = Paginator::new(config.pagination).paginate(html);
    serde_json::to_string(&result).map_err(to_js)
}

/// Convert DOCX bytes to flowed HTML.
#[wasm_bindgen]
pub fn docx_to_html(data: &[u8]) -> Result<String, JsValue> {
    DocxConverter::to_html(data).map_err(to_js)
}

/// Render DOCX bytes into page sections, group chapters and return the
/// resulting markup.
#[wasm_bindgen]
pub fn render_docx(data: &[u8], config_json: Option<String>) -> Result<String, JsValue> {
    let config = config_from(config_json)?;
    let html = DocxConverter::to_html(data).map_err(to_js)?;

    let mut dom = ArenaDom::new();
    let container = dom.create_html_element("div", Vec::new());
    dom.append(dom.document(), container);
    DocxRenderer::new(&config.chapters).render_html(&html, &mut dom, container);

    let grouper = ChapterGrouper::new(config.chapters);
    if let Err(e) = grouper.group(&mut dom, container) {
        log::warn!("chapter grouping failed, keeping ungrouped render: {e}");
    }
    Ok(inner_html(&dom, container))
}

/// Group chapters of already rendered markup (for renders produced by a
/// JavaScript renderer).
#[wasm_bindgen]
pub fn group_chapters_html(html: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let config = config_from(config_json)?;
    let mut dom = parse_html(html);
    let Some(container) = body(&dom) else {
        return Ok(html.to_string());
    };
    ChapterGrouper::new(config.chapters)
        .group(&mut dom, container)
        .map_err(to_js)?;
    Ok(inner_html(&dom, container))
}

/// Detect the document kind from a file name and/or content.
///
/// Returns `pdf`, `word`, `excel`, `ppt`, or `undefined`.
#[wasm_bindgen]
pub fn detect_kind(name: Option<String>, data: &[u8]) -> Option<String> {
    DocumentKind::detect(name.as_deref(), None, data).map(|k| k.to_string())
}
