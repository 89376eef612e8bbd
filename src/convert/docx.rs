//! Minimal DOCX → HTML conversion.
//!
//! Reads `word/document.xml` and produces flowed HTML good enough to
//! paginate: headings from `Heading1`..`Heading6`/`Title` styles, bold,
//! italic and underlined runs, hyperlinks, line and page breaks, tables,
//! list paragraphs and inline images. Page breaks become
//! `<p style="page-break-before: always">`, which the break detector
//! recognizes. Numbering definitions are not read, so every list renders as
//! `<ul>`.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use super::DocumentConverter;
use crate::dom::{escape_attr, escape_text};
use crate::error::{Error, Result};
use crate::io::{ByteSource, ByteSourceCursor, MemorySource};
use crate::util::decode_text;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const RELS_PART: &str = "word/_rels/document.xml.rels";

/// EMUs per CSS pixel at 96 dpi.
const EMU_PER_PX: f32 = 9525.0;

/// Markup inserted for a hard page break.
const PAGE_BREAK_HTML: &str = r#"<p style="page-break-before: always"></p>"#;

/// Converts Office Open XML word-processing documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxConverter;

impl DocxConverter {
    /// Convert synchronously.
    pub fn to_html(data: &[u8]) -> Result<String> {
        let source: Arc<dyn ByteSource> = Arc::new(MemorySource::new(data.to_vec()));
        let mut archive = ZipArchive::new(ByteSourceCursor::new(source))?;
        convert_archive(&mut archive)
    }
}

impl DocumentConverter for DocxConverter {
    async fn convert(&self, data: &[u8]) -> Result<String> {
        Self::to_html(data).map_err(|e| match e {
            Error::Conversion(_) => e,
            other => Error::Conversion(other.to_string()),
        })
    }
}

fn convert_archive<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let document = read_part(archive, DOCUMENT_PART)?
        .ok_or_else(|| Error::Conversion(format!("missing {DOCUMENT_PART}")))?;
    let styles = match read_part(archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => HashMap::new(),
    };
    let rels = match read_part(archive, RELS_PART)? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };

    let body = parse_document(&document)?;

    let mut images = HashMap::new();
    for rel_id in body.iter().flat_map(BodyItem::image_rels) {
        if images.contains_key(rel_id) {
            continue;
        }
        let Some(rel) = rels.get(rel_id).filter(|r| !r.external) else {
            continue;
        };
        let path = resolve_part_path(&rel.target);
        match read_part_bytes(archive, &path)? {
            Some(bytes) => {
                let url = format!("data:{};base64,{}", image_mime(&path), STANDARD.encode(bytes));
                images.insert(rel_id.to_string(), url);
            }
            None => log::warn!("image part {path} is missing"),
        }
    }

    let ctx = RenderContext {
        styles: &styles,
        rels: &rels,
        images: &images,
    };
    let mut out = String::new();
    render_items(&body, &ctx, &mut out);
    Ok(out)
}

fn read_part_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            Ok(Some(contents))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Option<String>> {
    Ok(read_part_bytes(archive, path)?.map(|bytes| decode_text(&bytes, None).into_owned()))
}

/// Relationship targets are relative to `word/`.
fn resolve_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["word"];
    for segment in target.split('/') {
        match segment {
            ".." => {
                parts.pop();
            }
            "." | "" => {}
            s => parts.push(s),
        }
    }
    parts.join("/")
}

fn image_mime(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

struct Relationship {
    target: String,
    external: bool,
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    let external = attr(&e, b"TargetMode").is_some_and(|m| m == "External");
                    rels.insert(id, Relationship { target, external });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(rels)
}

/// Style id → heading level, for paragraph styles that are headings.
fn parse_styles(xml: &str) -> Result<HashMap<String, u8>> {
    let mut reader = Reader::from_str(xml);
    let mut levels = HashMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if local_name(e.name().as_ref()) == b"style" => {
                current = attr(&e, b"styleId");
                if let Some(id) = &current
                    && let Some(level) = heading_level_from_name(id)
                {
                    levels.insert(id.clone(), level);
                }
            }
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                let Some(id) = &current else { continue };
                match local_name(e.name().as_ref()) {
                    b"name" => {
                        if let Some(level) = attr(&e, b"val").and_then(|n| heading_level_from_name(&n))
                        {
                            levels.insert(id.clone(), level);
                        }
                    }
                    b"outlineLvl" => {
                        if let Some(level) = attr(&e, b"val").and_then(|v| v.parse::<u8>().ok())
                            && level < 6
                        {
                            levels.entry(id.clone()).or_insert(level + 1);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) if local_name(e.name().as_ref()) == b"style" => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(levels)
}

/// `Heading2`, `heading 2` and `Title` style names.
fn heading_level_from_name(name: &str) -> Option<u8> {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    if compact == "title" {
        return Some(1);
    }
    let level: u8 = compact.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

// ---------------------------------------------------------------------------
// Document body
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Inline {
    Text {
        text: String,
        style: RunStyle,
        link: Option<Link>,
    },
    LineBreak,
    PageBreak,
    Tab,
    Image(Image),
}

#[derive(Debug, Clone, PartialEq)]
enum Link {
    Rel(String),
    Anchor(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Image {
    rel_id: Option<String>,
    alt: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Paragraph {
    style: Option<String>,
    list: bool,
    break_before: bool,
    inlines: Vec<Inline>,
}

#[derive(Debug, Clone, PartialEq)]
enum BodyItem {
    Paragraph(Paragraph),
    Table(Vec<Vec<Vec<BodyItem>>>),
}

impl BodyItem {
    fn image_rels(&self) -> Vec<&str> {
        match self {
            BodyItem::Paragraph(p) => p
                .inlines
                .iter()
                .filter_map(|i| match i {
                    Inline::Image(img) => img.rel_id.as_deref(),
                    _ => None,
                })
                .collect(),
            BodyItem::Table(rows) => rows
                .iter()
                .flatten()
                .flatten()
                .flat_map(BodyItem::image_rels)
                .collect(),
        }
    }
}

/// Tables open while parsing; each holds its rows of cells.
#[derive(Default)]
struct TableFrame {
    rows: Vec<Vec<Vec<BodyItem>>>,
}

struct BodyParser {
    body: Vec<BodyItem>,
    tables: Vec<TableFrame>,
    paragraph: Option<Paragraph>,
    run: Option<RunStyle>,
    in_run_props: bool,
    in_text: bool,
    link: Option<Link>,
    image: Option<Image>,
}

impl BodyParser {
    fn new() -> Self {
        Self {
            body: Vec::new(),
            tables: Vec::new(),
            paragraph: None,
            run: None,
            in_run_props: false,
            in_text: false,
            link: None,
            image: None,
        }
    }

    /// Where a finished paragraph or table goes: the innermost open cell,
    /// else the body.
    fn container(&mut self) -> &mut Vec<BodyItem> {
        match self
            .tables
            .last_mut()
            .and_then(|t| t.rows.last_mut())
            .and_then(|r| r.last_mut())
        {
            Some(cell) => cell,
            None => &mut self.body,
        }
    }

    fn push_text(&mut self, text: &str) {
        let (Some(paragraph), Some(style)) = (self.paragraph.as_mut(), self.run.as_ref()) else {
            return;
        };
        if let Some(Inline::Text {
            text: last,
            style: last_style,
            link: last_link,
        }) = paragraph.inlines.last_mut()
            && last_style == style
            && *last_link == self.link
        {
            last.push_str(text);
            return;
        }
        paragraph.inlines.push(Inline::Text {
            text: text.to_string(),
            style: style.clone(),
            link: self.link.clone(),
        });
    }

    fn push_inline(&mut self, inline: Inline) {
        if let Some(paragraph) = self.paragraph.as_mut() {
            paragraph.inlines.push(inline);
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"tbl" if !empty => self.tables.push(TableFrame::default()),
            b"tr" if !empty => {
                if let Some(table) = self.tables.last_mut() {
                    table.rows.push(Vec::new());
                }
            }
            b"tc" => {
                if let Some(row) = self.tables.last_mut().and_then(|t| t.rows.last_mut()) {
                    row.push(Vec::new());
                }
            }
            b"p" if !empty => self.paragraph = Some(Paragraph::default()),
            b"p" => self.container().push(BodyItem::Paragraph(Paragraph::default())),
            b"pStyle" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.style = attr(e, b"val");
                }
            }
            b"pageBreakBefore" if toggle_on(e) => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.break_before = true;
                }
            }
            b"numPr" => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.list = true;
                }
            }
            b"r" if !empty => self.run = Some(RunStyle::default()),
            b"rPr" if !empty => self.in_run_props = true,
            b"b" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.bold = toggle_on(e);
                }
            }
            b"i" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.italic = toggle_on(e);
                }
            }
            b"u" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.underline = attr(e, b"val").is_none_or(|v| v != "none");
                }
            }
            b"t" if !empty && self.run.is_some() => self.in_text = true,
            b"br" if self.run.is_some() => {
                if attr(e, b"type").as_deref() == Some("page") {
                    self.push_inline(Inline::PageBreak);
                } else {
                    self.push_inline(Inline::LineBreak);
                }
            }
            b"cr" if self.run.is_some() => self.push_inline(Inline::LineBreak),
            b"tab" if self.run.is_some() && !self.in_run_props => self.push_inline(Inline::Tab),
            b"hyperlink" if !empty => {
                self.link = attr(e, b"id")
                    .map(Link::Rel)
                    .or_else(|| attr(e, b"anchor").map(Link::Anchor));
            }
            b"drawing" | b"pict" if !empty => self.image = Some(Image::default()),
            b"extent" => {
                if let Some(image) = self.image.as_mut()
                    && image.width.is_none()
                {
                    image.width = attr_f32(e, b"cx").map(|v| v / EMU_PER_PX);
                    image.height = attr_f32(e, b"cy").map(|v| v / EMU_PER_PX);
                }
            }
            b"docPr" => {
                if let Some(image) = self.image.as_mut() {
                    image.alt = attr(e, b"descr")
                        .filter(|d| !d.is_empty())
                        .or_else(|| attr(e, b"name"));
                }
            }
            b"blip" | b"imagedata" => {
                if let Some(image) = self.image.as_mut() {
                    image.rel_id = attr(e, b"embed").or_else(|| attr(e, b"id"));
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, local: &[u8]) {
        match local {
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_props = false,
            b"r" => self.run = None,
            b"hyperlink" => self.link = None,
            b"drawing" | b"pict" => {
                if let Some(image) = self.image.take() {
                    self.push_inline(Inline::Image(image));
                }
            }
            b"p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.container().push(BodyItem::Paragraph(paragraph));
                }
            }
            b"tbl" => {
                if let Some(table) = self.tables.pop() {
                    self.container().push(BodyItem::Table(table.rows));
                }
            }
            _ => {}
        }
    }
}

fn parse_document(xml: &str) -> Result<Vec<BodyItem>> {
    let mut reader = Reader::from_str(xml);
    let mut parser = BodyParser::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => parser.start(&e, false),
            Ok(Event::Empty(e)) => parser.start(&e, true),
            Ok(Event::Text(e)) => {
                if parser.in_text {
                    parser.push_text(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if parser.in_text {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        parser.push_text(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                parser.end(local_name(name.as_ref()));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(parser.body)
}

// ---------------------------------------------------------------------------
// HTML output
// ---------------------------------------------------------------------------

struct RenderContext<'a> {
    styles: &'a HashMap<String, u8>,
    rels: &'a HashMap<String, Relationship>,
    images: &'a HashMap<String, String>,
}

impl RenderContext<'_> {
    fn heading_level(&self, style: Option<&str>) -> Option<u8> {
        let style = style?;
        self.styles
            .get(style)
            .copied()
            .or_else(|| heading_level_from_name(style))
    }

    fn href(&self, link: &Link) -> Option<String> {
        match link {
            Link::Anchor(anchor) => Some(format!("#{anchor}")),
            Link::Rel(id) => self
                .rels
                .get(id)
                .filter(|r| r.external)
                .map(|r| r.target.clone()),
        }
    }
}

fn render_items(items: &[BodyItem], ctx: &RenderContext<'_>, out: &mut String) {
    let mut in_list = false;

    for item in items {
        let list_item = matches!(item, BodyItem::Paragraph(p) if p.list && ctx.heading_level(p.style.as_deref()).is_none());
        let breaks_before = matches!(item, BodyItem::Paragraph(p) if p.break_before);

        if in_list && (!list_item || breaks_before) {
            out.push_str("</ul>");
            in_list = false;
        }

        match item {
            BodyItem::Paragraph(p) => {
                let tag = match ctx.heading_level(p.style.as_deref()) {
                    Some(level) => format!("h{level}"),
                    None if list_item => "li".to_string(),
                    None => "p".to_string(),
                };
                if list_item {
                    if breaks_before {
                        out.push_str(PAGE_BREAK_HTML);
                    }
                    if !in_list {
                        out.push_str("<ul>");
                        in_list = true;
                    }
                }
                render_paragraph(p, &tag, breaks_before && !list_item, ctx, out);
            }
            BodyItem::Table(rows) => {
                out.push_str("<table>");
                for row in rows {
                    out.push_str("<tr>");
                    for cell in row {
                        out.push_str("<td>");
                        render_items(cell, ctx, out);
                        out.push_str("</td>");
                    }
                    out.push_str("</tr>");
                }
                out.push_str("</table>");
            }
        }
    }

    if in_list {
        out.push_str("</ul>");
    }
}

/// Emit one paragraph. A page break inside it closes the element, emits the
/// break marker and reopens the same element for the remaining runs.
fn render_paragraph(
    p: &Paragraph,
    tag: &str,
    break_before: bool,
    ctx: &RenderContext<'_>,
    out: &mut String,
) {
    let open = |out: &mut String, with_break: bool| {
        out.push('<');
        out.push_str(tag);
        if with_break {
            out.push_str(r#" style="page-break-before: always""#);
        }
        out.push('>');
    };
    let close = |out: &mut String| {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    };

    open(out, break_before);
    for inline in &p.inlines {
        match inline {
            Inline::PageBreak => {
                close(out);
                open(out, true);
            }
            other => render_inline(other, ctx, out),
        }
    }
    close(out);
}

fn render_inline(inline: &Inline, ctx: &RenderContext<'_>, out: &mut String) {
    match inline {
        Inline::Text { text, style, link } => {
            let href = link.as_ref().and_then(|l| ctx.href(l));
            if let Some(href) = &href {
                out.push_str(&format!(r#"<a href="{}">"#, escape_attr(href)));
            }
            let wrappers: Vec<&str> = [
                (style.bold, "strong"),
                (style.italic, "em"),
                (style.underline, "u"),
            ]
            .into_iter()
            .filter_map(|(on, tag)| on.then_some(tag))
            .collect();
            for tag in &wrappers {
                out.push_str(&format!("<{tag}>"));
            }
            out.push_str(&escape_text(text));
            for tag in wrappers.iter().rev() {
                out.push_str(&format!("</{tag}>"));
            }
            if href.is_some() {
                out.push_str("</a>");
            }
        }
        Inline::LineBreak => out.push_str("<br>"),
        Inline::Tab => out.push('\u{2003}'),
        Inline::PageBreak => {}
        Inline::Image(image) => {
            let alt = image.alt.as_deref().unwrap_or("image");
            match image.rel_id.as_ref().and_then(|id| ctx.images.get(id)) {
                Some(src) => {
                    out.push_str(&format!(r#"<img src="{}" alt="{}""#, src, escape_attr(alt)));
                    if let Some(w) = image.width {
                        out.push_str(&format!(r#" width="{}""#, w.round()));
                    }
                    if let Some(h) = image.height {
                        out.push_str(&format!(r#" height="{}""#, h.round()));
                    }
                    out.push('>');
                }
                None => {
                    out.push_str(&format!(
                        r#"<span class="image-placeholder">[{}]</span>"#,
                        escape_text(alt)
                    ));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// XML helpers
// ---------------------------------------------------------------------------

fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Attribute value by local name, ignoring the namespace prefix.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

fn attr_f32(e: &BytesStart<'_>, key: &[u8]) -> Option<f32> {
    attr(e, key).and_then(|v| v.parse().ok())
}

/// OOXML on/off property: present without `val`, or with a truthy `val`.
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr(e, b"val").as_deref(), Some("0" | "false" | "off" | "none"))
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else {
        entity.strip_prefix('#').and_then(|dec| dec.parse().ok())
    };
    code.and_then(char::from_u32).map(String::from)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use zip::write::SimpleFileOptions;

    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn docx(body: &str, extra: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        write!(writer, r#"<?xml version="1.0"?><w:document {W}><w:body>{body}</w:body></w:document>"#)
            .unwrap();
        for (name, data) in extra {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn para(style: Option<&str>, text: &str) -> String {
        let ppr = style
            .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{s}"/></w:pPr>"#))
            .unwrap_or_default();
        format!(r#"<w:p>{ppr}<w:r><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let body = [
            para(Some("Title"), "Report"),
            para(Some("Heading2"), "Scope"),
            para(None, "Plain &amp; simple"),
        ]
        .concat();
        let html = DocxConverter::to_html(&docx(&body, &[])).unwrap();
        assert_eq!(html, "<h1>Report</h1><h2>Scope</h2><p>Plain &amp; simple</p>");
    }

    #[test]
    fn test_localized_heading_style_from_styles_part() {
        let styles = format!(
            r#"<w:styles {W}><w:style w:type="paragraph" w:styleId="berschrift1"><w:name w:val="heading 1"/></w:style></w:styles>"#
        );
        let html = DocxConverter::to_html(&docx(
            &para(Some("berschrift1"), "Kapitel"),
            &[(STYLES_PART, styles.as_bytes())],
        ))
        .unwrap();
        assert_eq!(html, "<h1>Kapitel</h1>");
    }

    #[test]
    fn test_run_formatting_and_breaks() {
        let body = r#"<w:p><w:r><w:rPr><w:b/><w:i w:val="0"/></w:rPr><w:t>bold</w:t></w:r><w:r><w:br/><w:t>next</w:t><w:tab/></w:r></w:p>"#;
        let html = DocxConverter::to_html(&docx(body, &[])).unwrap();
        assert_eq!(html, "<p><strong>bold</strong><br>next\u{2003}</p>");
    }

    #[test]
    fn test_page_breaks() {
        let body = r#"<w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:t>b</w:t></w:r></w:p><w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>c</w:t></w:r></w:p>"#;
        let html = DocxConverter::to_html(&docx(body, &[])).unwrap();
        assert_eq!(
            html,
            r#"<p>a</p><p style="page-break-before: always">b</p><p style="page-break-before: always">c</p>"#
        );
    }

    #[test]
    fn test_tables_and_lists() {
        let body = format!(
            r#"<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl><w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>one</w:t></w:r></w:p><w:p><w:pPr><w:numPr><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>two</w:t></w:r></w:p>{}"#,
            para(None, "x"),
            para(None, "y"),
            para(None, "after"),
        );
        let html = DocxConverter::to_html(&docx(&body, &[])).unwrap();
        assert_eq!(
            html,
            "<table><tr><td><p>x</p></td><td><p>y</p></td></tr></table><ul><li>one</li><li>two</li></ul><p>after</p>"
        );
    }

    #[test]
    fn test_embedded_image() {
        let rels = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId5" Type="image" Target="media/image1.png"/></Relationships>"#;
        let body = r#"<w:p><w:r><w:drawing><wp:inline xmlns:wp="wp"><wp:extent cx="952500" cy="476250"/><wp:docPr id="1" name="Picture 1" descr="Logo"/><a:graphic xmlns:a="a"><a:blip r:embed="rId5"/></a:graphic></wp:inline></w:drawing></w:r></w:p>"#;
        let html = DocxConverter::to_html(&docx(
            body,
            &[(RELS_PART, rels), ("word/media/image1.png", b"PNG")],
        ))
        .unwrap();
        assert_eq!(
            html,
            r#"<p><img src="data:image/png;base64,UE5H" alt="Logo" width="100" height="50"></p>"#
        );
    }

    #[test]
    fn test_missing_image_is_placeholder() {
        let body = r#"<w:p><w:r><w:drawing><a:blip xmlns:a="a" r:embed="rId9"/></w:drawing></w:r></w:p>"#;
        let html = DocxConverter::to_html(&docx(body, &[])).unwrap();
        assert_eq!(html, r#"<p><span class="image-placeholder">[image]</span></p>"#);
    }

    #[test]
    fn test_external_hyperlink() {
        let rels = br#"<Relationships><Relationship Id="rId1" Target="https://example.com/?a=1" TargetMode="External"/></Relationships>"#;
        let body = r#"<w:p><w:hyperlink r:id="rId1"><w:r><w:t>site</w:t></w:r></w:hyperlink></w:p>"#;
        let html = DocxConverter::to_html(&docx(body, &[(RELS_PART, rels)])).unwrap();
        assert_eq!(html, r#"<p><a href="https://example.com/?a=1">site</a></p>"#);
    }

    #[tokio::test]
    async fn test_not_a_zip_is_conversion_error() {
        let err = DocxConverter.convert(b"plain text").await.unwrap_err();
        assert!(matches!(err, Error::Conversion(_)));
    }

    #[tokio::test]
    async fn test_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let data = writer.finish().unwrap().into_inner();

        let err = DocxConverter.convert(&data).await.unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(resolve_part_path("media/a.png"), "word/media/a.png");
        assert_eq!(resolve_part_path("../customXml/a.png"), "customXml/a.png");
        assert_eq!(resolve_part_path("/word/media/b.jpg"), "word/media/b.jpg");
    }
}
