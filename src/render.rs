//! High-fidelity rendering into an arena container.

use std::future::Future;

use crate::config::ChapterConfig;
use crate::convert::DocxConverter;
use crate::dom::{ArenaDom, ArenaNodeId, Attribute, body, parse_html};
use crate::error::{Error, Result};
use crate::paginate::BreakDetectors;

/// Populates a container with a styled rendition of a document.
pub trait HighFidelityRenderer {
    /// Fails with [`Error::Render`]; the container may then hold a partial
    /// render and should be discarded.
    fn render(
        &self,
        data: &[u8],
        dom: &mut ArenaDom,
        container: ArenaNodeId,
    ) -> impl Future<Output = Result<()>>;
}

/// Renders DOCX files as one `section` per explicit page under a root
/// `div`, with class names taken from [`ChapterConfig`]:
///
/// ```text
/// <div class="docx">
///   <section class="docx-page">...</section>
///   <section class="docx-page">...</section>
/// </div>
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer {
    root_class: String,
    page_class: String,
}

impl DocxRenderer {
    pub fn new(config: &ChapterConfig) -> Self {
        Self {
            root_class: config.root_class.clone(),
            page_class: config.page_class.clone(),
        }
    }

    /// Lay converted HTML out into page sections under `container`.
    pub fn render_html(&self, html: &str, dom: &mut ArenaDom, container: ArenaNodeId) -> usize {
        let mut segments = BreakDetectors::standard(false).split(html);
        if segments.is_empty() {
            segments.push(String::new());
        }

        let root = dom.create_html_element(
            "div",
            vec![Attribute::new("class", self.class(&self.root_class, "docx"))],
        );
        dom.append(container, root);

        for segment in &segments {
            let page = dom.create_html_element(
                "section",
                vec![Attribute::new("class", self.class(&self.page_class, "docx-page"))],
            );
            dom.append(root, page);

            let parsed = parse_html(segment);
            if let Some(body) = body(&parsed) {
                for child in parsed.children(body) {
                    dom.append_copy(page, &parsed, child);
                }
            }
        }

        log::debug!("rendered {} page section(s)", segments.len());
        segments.len()
    }

    fn class<'a>(&self, configured: &'a str, fallback: &'a str) -> &'a str {
        if configured.is_empty() { fallback } else { configured }
    }
}

impl HighFidelityRenderer for DocxRenderer {
    async fn render(&self, data: &[u8], dom: &mut ArenaDom, container: ArenaNodeId) -> Result<()> {
        if dom.get(container).is_none() {
            return Err(Error::Render(format!("container {container:?} does not exist")));
        }
        let html = DocxConverter::to_html(data).map_err(|e| Error::Render(e.to_string()))?;
        self.render_html(&html, dom, container);
        Ok(())
    }
}
