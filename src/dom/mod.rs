//! Arena DOM, HTML parsing and serialization.
//!
//! Both the pagination pipeline and the chapter grouper work on this tree:
//! the former reads top-level blocks out of it, the latter restructures it in
//! place.
//!
//! ```
//! use folio::dom::{parse_html, outer_html};
//!
//! let dom = parse_html("<h1>Title</h1><p>Body</p>");
//! let h1 = dom.find_by_tag("h1").unwrap();
//! assert_eq!(outer_html(&dom, h1), "<h1>Title</h1>");
//! ```

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter};
pub use serialize::{escape_attr, escape_text, inner_html, outer_html};
pub use tree_sink::DomSink;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

/// Parse an HTML document or fragment into an arena DOM.
///
/// Fragments are accepted as-is; the parser supplies the implied
/// `html`/`head`/`body` elements, so [`body`] always finds a container.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = DomSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// The `<body>` element of a parsed document, if present.
pub fn body(dom: &ArenaDom) -> Option<ArenaNodeId> {
    dom.find_by_tag("body")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parse() {
        let dom = parse_html("<html><body><p>Hello</p></body></html>");

        let p = dom.find_by_tag("p").expect("should find p");
        let text_id = dom.children(p).next().expect("p should have child");
        assert_eq!(dom.text_content(text_id), Some("Hello"));
    }

    #[test]
    fn test_fragment_gets_body() {
        let dom = parse_html("<h1>A</h1><p>B</p>");
        let body = body(&dom).expect("implied body");
        let tags: Vec<_> = dom
            .children(body)
            .filter_map(|c| dom.element_name(c).map(|n| n.to_string()))
            .collect();
        assert_eq!(tags, vec!["h1", "p"]);
    }

    #[test]
    fn test_attributes() {
        let dom = parse_html(r#"<div id="main" class="container header">Content</div>"#);

        let div = dom.find_by_tag("div").expect("should find div");
        assert_eq!(dom.get_attr(div, "id"), Some("main"));
        assert!(dom.has_class(div, "container"));
        assert!(dom.has_class(div, "header"));
    }
}
