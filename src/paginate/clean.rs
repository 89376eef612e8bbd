//! Per-page markup cleanup.

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId, body, inner_html, parse_html};

/// Elements dropped with their content.
const UNSAFE_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed", "link", "meta"];

/// Attributes that may carry a URL.
const URL_ATTRS: &[&str] = &["href", "src", "action", "formaction", "xlink:href"];

/// Class given to tables for display styling.
pub const TABLE_CLASS: &str = "doc-table";
/// Class given to images for display styling.
pub const IMAGE_CLASS: &str = "doc-image";

/// Markup shown in place of a page with no content.
pub fn placeholder(page_number: usize) -> String {
    format!(r#"<div class="page-placeholder">Page {page_number} is empty</div>"#)
}

/// Sanitize one page, drop empty paragraphs and divs, and mark tables and
/// images. Returns the placeholder when nothing is left.
pub fn clean_page(html: &str, page_number: usize) -> String {
    let mut dom = parse_html(html);
    let Some(body) = body(&dom) else {
        return placeholder(page_number);
    };

    sanitize(&mut dom, body);
    prune_empty(&mut dom, body);
    annotate(&mut dom, body);

    let cleaned = inner_html(&dom, body);
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        placeholder(page_number)
    } else {
        cleaned.to_string()
    }
}

fn sanitize(dom: &mut ArenaDom, root: ArenaNodeId) {
    for id in dom.descendants(root) {
        if UNSAFE_TAGS.iter().any(|t| dom.is_tag(id, t)) {
            dom.detach(id);
            continue;
        }
        dom.retain_attrs(id, |attr| {
            let name = attr.name.local.as_ref();
            if name.len() > 2 && name.as_bytes()[..2].eq_ignore_ascii_case(b"on") {
                return false;
            }
            !(URL_ATTRS.contains(&name) && is_script_url(&attr.value))
        });
    }
}

fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take(11)
        .collect();
    compact.to_ascii_lowercase().starts_with("javascript:")
}

/// Remove `p` and `div` holding nothing but whitespace or `<br>`.
///
/// Runs children-first, so a div left empty by removing its paragraphs
/// goes too.
fn prune_empty(dom: &mut ArenaDom, root: ArenaNodeId) {
    let mut order = dom.descendants(root);
    order.reverse();
    for id in order {
        if id != root && (dom.is_tag(id, "p") || dom.is_tag(id, "div")) && is_blank(dom, id) {
            dom.detach(id);
        }
    }
}

fn is_blank(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    dom.children(id).all(|child| match dom.get(child).map(|n| &n.data) {
        Some(ArenaNodeData::Text(text)) => text.trim().is_empty(),
        Some(ArenaNodeData::Comment(_)) => true,
        Some(ArenaNodeData::Element { name, .. }) => name.local.as_ref() == "br",
        _ => true,
    })
}

fn annotate(dom: &mut ArenaDom, root: ArenaNodeId) {
    for id in dom.descendants(root) {
        if dom.is_tag(id, "table") {
            dom.add_class(id, TABLE_CLASS);
        } else if dom.is_tag(id, "img") {
            dom.add_class(id, IMAGE_CLASS);
        }
    }
}
