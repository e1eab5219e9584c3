//! LDAP search filter and distinguished name encoding.

use crate::table::{EscapeTable, Lookup};
use memchr::{memchr, memchr3};
use std::fmt::Write;
use std::sync::LazyLock;

fn hex_escape(cp: u32) -> String {
    format!("\\{cp:02x}")
}

fn printable(cp: u32) -> bool {
    (0x20..0x7F).contains(&cp)
}

static FILTER: LazyLock<EscapeTable> = LazyLock::new(|| {
    EscapeTable::escape_all("ldap-filter", 128, hex_escape)
        .punch_where(|cp| printable(cp) && !matches!(cp, 0x2A | 0x28 | 0x29 | 0x5C))
});

const DN_SPECIALS: &str = ",+\"\\<>;=";

static DN: LazyLock<EscapeTable> = LazyLock::new(|| {
    let mut table = EscapeTable::escape_all("ldap-dn", 128, hex_escape).punch_where(printable);
    for ch in DN_SPECIALS.chars() {
        table = table.with(ch as u32, &format!("\\{ch}"));
    }
    table
});

fn push_utf8_escapes(ch: char, out: &mut String) {
    let mut buf = [0u8; 4];
    for &byte in ch.encode_utf8(&mut buf).as_bytes() {
        let _ = write!(out, "\\{byte:02x}");
    }
}

fn encode_char(table: &EscapeTable, ch: char, out: &mut String) {
    match table.lookup(ch as u32) {
        Lookup::Safe => out.push(ch),
        Lookup::Escape(replacement) => out.push_str(replacement),
        Lookup::Fallback => push_utf8_escapes(ch, out),
    }
}

/// Printable ASCII with none of the filter specials.
fn filter_is_clean(input: &str) -> bool {
    let bytes = input.as_bytes();
    memchr3(b'*', b'(', b')', bytes).is_none()
        && memchr(b'\\', bytes).is_none()
        && bytes.iter().all(|&b| printable(u32::from(b)))
}

/// Encode a value for an LDAP search filter (RFC 4515).
pub fn ldap_filter_encode(input: &str) -> String {
    if filter_is_clean(input) {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len() * 3);
    for ch in input.chars() {
        encode_char(&FILTER, ch, &mut out);
    }
    out
}

/// Encode a distinguished name attribute value, escaping a leading `#` or
/// space and a trailing space.
pub fn ldap_distinguished_name_encode(input: &str) -> String {
    ldap_distinguished_name_encode_with(input, true, true)
}

/// Encode a distinguished name attribute value (RFC 4514).
///
/// `use_initial_rules` escapes a leading `#` or space; `use_final_rules`
/// escapes a trailing space. Turn them off when encoding a piece that is
/// concatenated into the middle of a value.
pub fn ldap_distinguished_name_encode_with(
    input: &str,
    use_initial_rules: bool,
    use_final_rules: bool,
) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut out = String::with_capacity(input.len() * 2);
    let last = input.len() - input.chars().next_back().map_or(0, char::len_utf8);
    for (idx, ch) in input.char_indices() {
        let edge = (idx == 0 && use_initial_rules && matches!(ch, '#' | ' '))
            || (idx == last && use_final_rules && ch == ' ');
        if edge {
            out.push('\\');
            out.push(ch);
        } else {
            encode_char(&DN, ch, &mut out);
        }
    }
    out
}
