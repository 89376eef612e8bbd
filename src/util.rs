//! Text decoding helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling various encodings.
///
/// 1. UTF-8 first (BOM handled by encoding_rs)
/// 2. the hint encoding (from `<?xml encoding="..."?>` or `<meta charset>`)
/// 3. Windows-1252, which is what old Word "Save as HTML" output usually is
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the declared encoding from an XML declaration or `<meta charset>`.
///
/// Only the first 1024 bytes are inspected.
pub fn extract_declared_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];

    for needle in [&b"encoding="[..], &b"charset="[..]] {
        let Some(pos) = prefix
            .windows(needle.len())
            .position(|w| w.eq_ignore_ascii_case(needle))
        else {
            continue;
        };
        let after = &prefix[pos + needle.len()..];
        let (start, quote) = match after.first() {
            Some(&q) if q == b'"' || q == b'\'' => (1, Some(q)),
            Some(_) => (0, None),
            None => continue,
        };
        let end = after[start..]
            .iter()
            .position(|&b| match quote {
                Some(q) => b == q,
                None => matches!(b, b'"' | b'\'' | b';' | b'>' | b' ' | b'/'),
            })
            .map(|p| p + start)?;
        return std::str::from_utf8(&after[start..end]).ok();
    }

    None
}

/// Count whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
