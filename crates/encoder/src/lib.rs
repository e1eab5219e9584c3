//! Context-aware output encoding driven by safe-character tables.
//!
//! Each context has a lazily built table that maps a character to "pass
//! through" or to its replacement. Markup contexts share one safe list that
//! can be reconfigured at runtime with [`mark_as_safe`].

pub mod charts;
mod css;
mod ldap;
mod markup;
pub mod safe_list;
mod script;
mod table;
mod url;

use std::fmt;
use std::str::FromStr;

pub use crate::charts::{
    CodeCharts, LowerCodeCharts, LowerMidCodeCharts, MidCodeCharts, UpperCodeCharts,
    UpperMidCodeCharts,
};
pub use crate::css::css_encode;
pub use crate::ldap::{
    ldap_distinguished_name_encode, ldap_distinguished_name_encode_with, ldap_filter_encode,
};
pub use crate::markup::{html_attribute_encode, html_encode, xml_attribute_encode, xml_encode};
pub use crate::safe_list::{SafeList, mark_as_safe};
pub use crate::script::{javascript_encode, visual_basic_script_encode};
pub use crate::url::{url_encode, url_encode_with, url_form_encode, url_form_encode_with, url_path_encode};
pub use encoding_rs::Encoding;

use crate::markup::Flavor;

/// An output context, for callers that pick the encoder at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Html,
    HtmlAttribute,
    Xml,
    XmlAttribute,
    Css,
    Url,
    UrlForm,
    UrlPath,
    /// JavaScript literal body, without quotes.
    JavaScript,
    VbScript,
    LdapFilter,
    LdapDistinguishedName,
}

impl Context {
    pub const ALL: &'static [Context] = &[
        Context::Html,
        Context::HtmlAttribute,
        Context::Xml,
        Context::XmlAttribute,
        Context::Css,
        Context::Url,
        Context::UrlForm,
        Context::UrlPath,
        Context::JavaScript,
        Context::VbScript,
        Context::LdapFilter,
        Context::LdapDistinguishedName,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Context::Html => "html",
            Context::HtmlAttribute => "html-attribute",
            Context::Xml => "xml",
            Context::XmlAttribute => "xml-attribute",
            Context::Css => "css",
            Context::Url => "url",
            Context::UrlForm => "url-form",
            Context::UrlPath => "url-path",
            Context::JavaScript => "javascript",
            Context::VbScript => "vbscript",
            Context::LdapFilter => "ldap-filter",
            Context::LdapDistinguishedName => "ldap-dn",
        }
    }

    fn flavor(self) -> Option<Flavor> {
        match self {
            Context::Html => Some(Flavor::Html),
            Context::HtmlAttribute => Some(Flavor::HtmlAttribute),
            Context::Xml => Some(Flavor::Xml),
            Context::XmlAttribute => Some(Flavor::XmlAttribute),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A context name that `Context::from_str` does not know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownContext(pub String);

impl fmt::Display for UnknownContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown encoding context `{}`", self.0)
    }
}

impl std::error::Error for UnknownContext {}

impl FromStr for Context {
    type Err = UnknownContext;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Context::ALL
            .iter()
            .copied()
            .find(|ctx| ctx.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownContext(name.to_string()))
    }
}

/// Encode `input` for `context`.
pub fn encode(context: Context, input: &str) -> String {
    match context {
        Context::Html => html_encode(input),
        Context::HtmlAttribute => html_attribute_encode(input),
        Context::Xml => xml_encode(input),
        Context::XmlAttribute => xml_attribute_encode(input),
        Context::Css => css_encode(input),
        Context::Url => url_encode(input),
        Context::UrlForm => url_form_encode(input),
        Context::UrlPath => url_path_encode(input),
        Context::JavaScript => javascript_encode(input, false),
        Context::VbScript => visual_basic_script_encode(input),
        Context::LdapFilter => ldap_filter_encode(input),
        Context::LdapDistinguishedName => ldap_distinguished_name_encode(input),
    }
}

/// Encode UTF-16 input for `context`.
///
/// Surrogate pairs are combined and unpaired surrogates become U+FFFD
/// before encoding. Character contexts encode straight from the decoded
/// scalars; byte contexts collect them first.
pub fn encode_utf16(context: Context, units: &[u16]) -> String {
    if units.is_empty() {
        return String::new();
    }
    let chars = tools::ScalarReader::new(units);
    let mut out = String::with_capacity(units.len() * 2);
    if let Some(flavor) = context.flavor() {
        markup::encode_chars(flavor, chars, &mut out);
        return out;
    }
    match context {
        Context::Css => css::encode_chars(chars, &mut out),
        Context::JavaScript => script::javascript_chars(chars, false, &mut out),
        Context::VbScript => script::vbscript_chars(chars, &mut out),
        _ => {
            let text: String = chars.collect();
            return encode(context, &text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_names_round_trip() {
        for &ctx in Context::ALL {
            assert_eq!(ctx.name().parse::<Context>(), Ok(ctx));
        }
        assert_eq!("HTML".parse::<Context>(), Ok(Context::Html));
        assert_eq!(
            "sql".parse::<Context>(),
            Err(UnknownContext("sql".to_string()))
        );
    }

    #[test]
    fn utf16_matches_str() {
        let text = "<a\u{1F600}é*(x)";
        let units: Vec<u16> = text.encode_utf16().collect();
        for &ctx in Context::ALL {
            assert_eq!(encode_utf16(ctx, &units), encode(ctx, text), "{ctx}");
        }
    }

    #[test]
    fn utf16_replaces_lone_surrogates() {
        assert_eq!(encode_utf16(Context::Html, &[0x61, 0xD800]), "a&#65533;");
        assert_eq!(encode_utf16(Context::Css, &[]), "");
    }
}
