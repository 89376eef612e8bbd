//! Inline `style` attribute handling.
//!
//! Converters mark forced page boundaries with inline declarations such as
//! `page-break-before: always`. This module parses declaration blocks with
//! cssparser so such markers are recognized regardless of spacing, case or
//! neighbouring declarations.

use cssparser::{Parser, ParserInput, Token};

/// One `property: value` pair from a declaration block.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lowercased property name.
    pub property: String,
    /// Raw value text as written, trimmed.
    pub value: String,
    /// Lowercased identifier tokens of the value, in order.
    pub keywords: Vec<String>,
}

/// Parse an inline declaration block (`a: b; c: d`).
///
/// Malformed declarations are skipped up to the next semicolon.
pub fn parse_declarations(style: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let result: Result<Declaration, cssparser::ParseError<'_, ()>> = parser.try_parse(|i| {
            let property = match i.next()? {
                Token::Ident(name) => name.to_ascii_lowercase(),
                _ => return Err(i.new_custom_error(())),
            };

            i.skip_whitespace();
            match i.next()? {
                Token::Colon => {}
                _ => return Err(i.new_custom_error(())),
            }
            i.skip_whitespace();

            let start = i.position();
            let mut end = start;
            let mut keywords = Vec::new();
            loop {
                let before = i.position();
                match i.next() {
                    Ok(Token::Semicolon) => {
                        end = before;
                        break;
                    }
                    Ok(Token::Ident(ident)) => {
                        keywords.push(ident.to_ascii_lowercase());
                        end = i.position();
                    }
                    Ok(_) => end = i.position(),
                    Err(_) => break,
                }
            }

            Ok(Declaration {
                property,
                value: i.slice(start..end).trim().to_string(),
                keywords,
            })
        });

        match result {
            Ok(decl) => out.push(decl),
            Err(_) => loop {
                match parser.next() {
                    Ok(Token::Semicolon) | Err(_) => break,
                    Ok(_) => continue,
                }
            },
        }
    }

    out
}

/// Whether a declaration block forces a page break before its element.
///
/// Recognizes `page-break-before` and `break-before` with any value that
/// starts a new page.
pub fn declares_page_break_before(style: &str) -> bool {
    parse_declarations(style).iter().any(|d| {
        matches!(d.property.as_str(), "page-break-before" | "break-before")
            && d.keywords.first().is_some_and(|k| {
                matches!(
                    k.as_str(),
                    "always" | "page" | "left" | "right" | "recto" | "verso"
                )
            })
    })
}

/// Set declarations on an existing block, replacing same-named properties.
pub fn merge_declarations(existing: Option<&str>, updates: &[(&str, &str)]) -> String {
    let mut decls: Vec<(String, String)> = existing
        .map(parse_declarations)
        .unwrap_or_default()
        .into_iter()
        .filter(|d| !updates.iter().any(|(p, _)| p.eq_ignore_ascii_case(&d.property)))
        .map(|d| (d.property, d.value))
        .collect();
    decls.extend(updates.iter().map(|(p, v)| (p.to_string(), v.to_string())));

    decls
        .iter()
        .map(|(p, v)| format!("{p}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let decls = parse_declarations("Color: Red; font-family: Arial, sans-serif");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].property, "color");
        assert_eq!(decls[0].keywords, vec!["red"]);
        assert_eq!(decls[1].value, "Arial, sans-serif");
    }

    #[test]
    fn test_page_break_variants() {
        assert!(declares_page_break_before("page-break-before: always"));
        assert!(declares_page_break_before("PAGE-BREAK-BEFORE:ALWAYS"));
        assert!(declares_page_break_before("margin: 0; break-before: page"));
        assert!(declares_page_break_before("page-break-before: always !important"));
        assert!(!declares_page_break_before("page-break-before: auto"));
        assert!(!declares_page_break_before("page-break-after: always"));
        assert!(!declares_page_break_before("break-before: avoid"));
    }

    #[test]
    fn test_recovers_from_garbage() {
        assert!(declares_page_break_before(
            "%%%; ; break-before: page"
        ));
    }

    #[test]
    fn test_merge_replaces_existing() {
        let merged = merge_declarations(
            Some("color: red; break-before: auto"),
            &[("break-before", "page")],
        );
        assert_eq!(merged, "color: red; break-before: page;");

        assert_eq!(
            merge_declarations(None, &[("break-before", "page")]),
            "break-before: page;"
        );
    }
}
