//! Percent encoding for URL query values, form bodies and paths.

use crate::table::{EscapeTable, Lookup};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use std::sync::LazyLock;

fn unreserved(cp: u32) -> bool {
    char::from_u32(cp).is_some_and(|ch| ch.is_ascii_alphanumeric() || "-._~".contains(ch))
}

fn percent(byte: u32) -> String {
    format!("%{byte:02X}")
}

static QUERY: LazyLock<EscapeTable> =
    LazyLock::new(|| EscapeTable::escape_all("url", 256, percent).punch_where(unreserved));

static FORM: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("url-form", 256, percent)
        .punch_where(unreserved)
        .with(u32::from(b' '), "+")
});

static PATH: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("url-path", 256, percent)
        .punch_where(unreserved)
        .punch("/:@!$*+,;=".bytes().map(u32::from))
});

/// Query rules that keep the pair separators of an existing query string.
static PATH_QUERY: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("url-path-query", 256, percent)
        .punch_where(unreserved)
        .punch("=&".bytes().map(u32::from))
});

fn encode_bytes(table: &EscapeTable, bytes: &[u8], out: &mut String) {
    for &byte in bytes {
        match table.lookup(u32::from(byte)) {
            Lookup::Safe => out.push(char::from(byte)),
            Lookup::Escape(replacement) => out.push_str(replacement),
            Lookup::Fallback => out.push_str(&percent(u32::from(byte))),
        }
    }
}

fn encode_in(table: &EscapeTable, input: &str, encoding: &'static Encoding) -> String {
    if input.is_empty() {
        return String::new();
    }
    let (bytes, used, had_errors) = encoding.encode(input);
    if had_errors {
        debug!(
            target: "encoder.tables",
            "{} cannot represent every character; using numeric references",
            used.name()
        );
    }
    let mut out = String::with_capacity(bytes.len() * 3);
    encode_bytes(table, &bytes, &mut out);
    out
}

/// Encode a query-string value as UTF-8.
pub fn url_encode(input: &str) -> String {
    url_encode_with(input, UTF_8)
}

/// Encode a query-string value in the given character encoding.
///
/// Characters the encoding cannot represent become `&#N;` before percent
/// encoding, which is what a browser submits for them.
pub fn url_encode_with(input: &str, encoding: &'static Encoding) -> String {
    encode_in(&QUERY, input, encoding)
}

/// Encode a form value: like `url_encode`, with `+` for space.
pub fn url_form_encode(input: &str) -> String {
    url_form_encode_with(input, UTF_8)
}

pub fn url_form_encode_with(input: &str, encoding: &'static Encoding) -> String {
    encode_in(&FORM, input, encoding)
}

/// Encode a URL path, leaving its structure intact.
///
/// Everything after the first `?` is treated as a query string whose `=`
/// and `&` separators are kept.
pub fn url_path_encode(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len() * 2);
    match memchr::memchr(b'?', bytes) {
        Some(split) => {
            encode_bytes(&PATH, &bytes[..split], &mut out);
            out.push('?');
            encode_bytes(&PATH_QUERY, &bytes[split + 1..], &mut out);
        }
        None => encode_bytes(&PATH, bytes, &mut out),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_values() {
        assert_eq!(url_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(url_encode("-._~"), "-._~");
        assert_eq!(url_encode("é"), "%C3%A9");
        assert_eq!(url_encode(""), "");
    }

    #[test]
    fn form_values_use_plus() {
        assert_eq!(url_form_encode("a b+c"), "a+b%2Bc");
    }

    #[test]
    fn other_encodings() {
        assert_eq!(url_encode_with("é", encoding_rs::WINDOWS_1252), "%E9");
        assert_eq!(url_encode_with("日", encoding_rs::SHIFT_JIS), "%93%FA");
        assert_eq!(
            url_encode_with("\u{1F600}", encoding_rs::WINDOWS_1252),
            "%26%23128512%3B"
        );
    }

    #[test]
    fn paths_keep_structure() {
        assert_eq!(
            url_path_encode("http://x.com/a b/c?q=1 2&r=<"),
            "http://x.com/a%20b/c?q=1%202&r=%3C"
        );
        assert_eq!(url_path_encode("/a%b#c"), "/a%25b%23c");
        assert_eq!(url_path_encode("/p?a?b"), "/p?a%3Fb");
    }
}
