//! `key=value` scanning in free-text ImageDescription tags.
//!
//! Ventana writes whitespace-separated tokens into the description of each
//! pyramid directory, e.g. `level=2 mag=10 quality=95`. The grammar is:
//!
//! ```text
//! token  := key "=" value
//! value  := "'" [^']* "'" | '"' [^"]* '"' | non-space+
//! ```
//!
//! A key only matches at the start of the text or after whitespace, so
//! `sublevel=3` never answers a lookup of `level`. A quote without its
//! closing partner is read as part of an unquoted value.

/// Find the value of `key` in `text`.
///
/// Returns the first non-empty value, without surrounding quotes, or `None`
/// when the key does not appear.
pub fn find_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    if key.is_empty() {
        return None;
    }

    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(key) {
        let start = search_from + found;
        search_from = start + key.len();

        let at_boundary = text[..start]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !at_boundary {
            continue;
        }

        let Some(rest) = text[search_from..].strip_prefix('=') else {
            continue;
        };

        if let Some(value) = value_at(rest) {
            return Some(value);
        }
    }

    None
}

fn value_at(rest: &str) -> Option<&str> {
    let mut chars = rest.chars();
    if let Some(quote @ ('\'' | '"')) = chars.next() {
        let inner = &rest[1..];
        if let Some(end) = inner.find(quote) {
            let value = &inner[..end];
            return (!value.is_empty()).then_some(value);
        }
    }

    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let value = &rest[..end];
    (!value.is_empty()).then_some(value)
}
