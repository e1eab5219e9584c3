//! What the rewriter keeps.
//!
//! A policy is three tables indexed by the name ids of the tag, attribute
//! and property name tables, the URL schemes a link may use, and the style
//! function allow-lists. `Policy::default()` is the built-in policy; a TOML
//! document can overlay any part of it.
//!
//! ```toml
//! schemes = ["https", "mailto"]
//!
//! [tags]
//! img = "drop"
//! table = "keep"
//!
//! [attributes]
//! class = "drop"
//!
//! [properties]
//! position = "drop"
//!
//! [functions]
//! terms = ["rgb", "rgba"]
//! ```

use std::collections::BTreeMap;

use css::{FunctionPolicy, PropertyId};
use html::{AttributeId, TagId};
use log::debug;
use serde::Deserialize;

use crate::error::PolicyError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagAction {
    /// Write the tag with its allowed attributes.
    Keep,
    /// Drop the tag, keep its content.
    Drop,
    /// Drop the tag and everything up to its end tag.
    DropWithContent,
    /// Keep the tag and sanitize its content as a style sheet.
    CheckContent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttributeAction {
    Keep,
    Drop,
    /// `style` is sanitized as declarations; any other attribute is a URL
    /// whose scheme must be allowed.
    CheckContent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyAction {
    Keep,
    Drop,
}

const KEEP_TAGS: &[TagId] = &[
    TagId::A,
    TagId::Abbr,
    TagId::Acronym,
    TagId::Address,
    TagId::Article,
    TagId::Aside,
    TagId::B,
    TagId::Bdi,
    TagId::Bdo,
    TagId::Big,
    TagId::Blockquote,
    TagId::Body,
    TagId::Br,
    TagId::Caption,
    TagId::Center,
    TagId::Cite,
    TagId::Code,
    TagId::Col,
    TagId::Colgroup,
    TagId::Dd,
    TagId::Del,
    TagId::Details,
    TagId::Dfn,
    TagId::Dir,
    TagId::Div,
    TagId::Dl,
    TagId::Dt,
    TagId::Em,
    TagId::Fieldset,
    TagId::Figcaption,
    TagId::Figure,
    TagId::Font,
    TagId::Footer,
    TagId::H1,
    TagId::H2,
    TagId::H3,
    TagId::H4,
    TagId::H5,
    TagId::H6,
    TagId::Head,
    TagId::Header,
    TagId::Hr,
    TagId::Html,
    TagId::I,
    TagId::Img,
    TagId::Ins,
    TagId::Kbd,
    TagId::Label,
    TagId::Legend,
    TagId::Li,
    TagId::Main,
    TagId::Map,
    TagId::Area,
    TagId::Mark,
    TagId::Menu,
    TagId::Nav,
    TagId::Nobr,
    TagId::Ol,
    TagId::P,
    TagId::Pre,
    TagId::Q,
    TagId::Rp,
    TagId::Rt,
    TagId::Ruby,
    TagId::S,
    TagId::Samp,
    TagId::Section,
    TagId::Small,
    TagId::Span,
    TagId::Strike,
    TagId::Strong,
    TagId::Sub,
    TagId::Summary,
    TagId::Sup,
    TagId::Table,
    TagId::Tbody,
    TagId::Td,
    TagId::Tfoot,
    TagId::Th,
    TagId::Thead,
    TagId::Time,
    TagId::Title,
    TagId::Tr,
    TagId::Tt,
    TagId::U,
    TagId::Ul,
    TagId::Var,
    TagId::Wbr,
];

const DROP_WITH_CONTENT_TAGS: &[TagId] = &[
    TagId::Applet,
    TagId::Audio,
    TagId::Button,
    TagId::Canvas,
    TagId::Dialog,
    TagId::Embed,
    TagId::Frameset,
    TagId::Iframe,
    TagId::Math,
    TagId::Noembed,
    TagId::Noframes,
    TagId::Noscript,
    TagId::Object,
    TagId::Plaintext,
    TagId::Script,
    TagId::Select,
    TagId::Svg,
    TagId::Template,
    TagId::Textarea,
    TagId::Video,
    TagId::Xml,
    TagId::Xmp,
];

const KEEP_ATTRIBUTES: &[AttributeId] = &[
    AttributeId::Abbr,
    AttributeId::Align,
    AttributeId::Alt,
    AttributeId::Axis,
    AttributeId::Bgcolor,
    AttributeId::Border,
    AttributeId::Cellpadding,
    AttributeId::Cellspacing,
    AttributeId::Char,
    AttributeId::Charoff,
    AttributeId::Class,
    AttributeId::Clear,
    AttributeId::Color,
    AttributeId::Cols,
    AttributeId::Colspan,
    AttributeId::Compact,
    AttributeId::Coords,
    AttributeId::Datetime,
    AttributeId::Dir,
    AttributeId::Face,
    AttributeId::Frame,
    AttributeId::Headers,
    AttributeId::Height,
    AttributeId::Hreflang,
    AttributeId::Hspace,
    AttributeId::Id,
    AttributeId::Label,
    AttributeId::Lang,
    AttributeId::Name,
    AttributeId::Noshade,
    AttributeId::Nowrap,
    AttributeId::Rel,
    AttributeId::Rev,
    AttributeId::Rows,
    AttributeId::Rowspan,
    AttributeId::Rules,
    AttributeId::Scope,
    AttributeId::Shape,
    AttributeId::Size,
    AttributeId::Span,
    AttributeId::Start,
    AttributeId::Summary,
    AttributeId::Tabindex,
    AttributeId::Title,
    AttributeId::Valign,
    AttributeId::Value,
    AttributeId::Vspace,
    AttributeId::Width,
];

const CHECKED_ATTRIBUTES: &[AttributeId] = &[
    AttributeId::Background,
    AttributeId::Cite,
    AttributeId::Href,
    AttributeId::Longdesc,
    AttributeId::Src,
    AttributeId::Style,
    AttributeId::Usemap,
];

const DROP_PROPERTIES: &[PropertyId] = &[
    PropertyId::Behavior,
    PropertyId::Filter,
    PropertyId::MozBinding,
];

const DEFAULT_SCHEMES: &[&str] = &["http", "https", "mailto", "ftp"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    tags: Vec<TagAction>,
    attributes: Vec<AttributeAction>,
    properties: Vec<PropertyAction>,
    schemes: Vec<String>,
    functions: FunctionPolicy,
}

impl Default for Policy {
    fn default() -> Self {
        let mut tags = vec![TagAction::Drop; TagId::COUNT];
        for &id in KEEP_TAGS {
            tags[id.index()] = TagAction::Keep;
        }
        for &id in DROP_WITH_CONTENT_TAGS {
            tags[id.index()] = TagAction::DropWithContent;
        }
        tags[TagId::Style.index()] = TagAction::CheckContent;

        let mut attributes = vec![AttributeAction::Drop; AttributeId::COUNT];
        for &id in KEEP_ATTRIBUTES {
            attributes[id.index()] = AttributeAction::Keep;
        }
        for &id in CHECKED_ATTRIBUTES {
            attributes[id.index()] = AttributeAction::CheckContent;
        }

        let mut properties = vec![PropertyAction::Keep; PropertyId::COUNT];
        properties[PropertyId::Unknown.index()] = PropertyAction::Drop;
        for &id in DROP_PROPERTIES {
            properties[id.index()] = PropertyAction::Drop;
        }

        Self {
            tags,
            attributes,
            properties,
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
            functions: FunctionPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PolicyOverlay {
    schemes: Option<Vec<String>>,
    tags: BTreeMap<String, TagAction>,
    attributes: BTreeMap<String, AttributeAction>,
    properties: BTreeMap<String, PropertyAction>,
    functions: Option<FunctionsOverlay>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FunctionsOverlay {
    terms: Option<Vec<String>>,
    pseudo_classes: Option<Vec<String>>,
}

impl Policy {
    /// The built-in policy with `text` laid over it.
    pub fn from_toml_str(text: &str) -> Result<Self, PolicyError> {
        let mut policy = Self::default();
        policy.overlay_toml(text)?;
        Ok(policy)
    }

    /// Apply a TOML overlay. Nothing changes when the overlay is rejected.
    pub fn overlay_toml(&mut self, text: &str) -> Result<(), PolicyError> {
        let overlay: PolicyOverlay = toml::from_str(text)?;
        let mut next = self.clone();
        for (name, action) in overlay.tags {
            let id = known(TagId::lookup(&name), TagId::Unknown, "tags", &name)?;
            next.set_tag(id, action);
        }
        for (name, action) in overlay.attributes {
            let id = known(AttributeId::lookup(&name), AttributeId::Unknown, "attributes", &name)?;
            next.set_attribute(id, action);
        }
        for (name, action) in overlay.properties {
            let id = known(PropertyId::lookup(&name), PropertyId::Unknown, "properties", &name)?;
            next.set_property(id, action);
        }
        if let Some(schemes) = overlay.schemes {
            next.set_schemes(schemes)?;
        }
        if let Some(functions) = overlay.functions {
            if let Some(terms) = functions.terms {
                next.functions.terms = terms;
            }
            if let Some(pseudo_classes) = functions.pseudo_classes {
                next.functions.pseudo_classes = pseudo_classes;
            }
        }
        debug!(target: "sanitizer.rewriter", "policy overlay applied");
        *self = next;
        Ok(())
    }

    pub fn tag(&self, id: TagId) -> TagAction {
        self.tags[id.index()]
    }

    pub fn set_tag(&mut self, id: TagId, action: TagAction) {
        self.tags[id.index()] = action;
    }

    pub fn attribute(&self, id: AttributeId) -> AttributeAction {
        self.attributes[id.index()]
    }

    pub fn set_attribute(&mut self, id: AttributeId, action: AttributeAction) {
        self.attributes[id.index()] = action;
    }

    pub fn property(&self, id: PropertyId) -> PropertyAction {
        self.properties[id.index()]
    }

    pub fn set_property(&mut self, id: PropertyId, action: PropertyAction) {
        self.properties[id.index()] = action;
    }

    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    /// Replace the allowed URL schemes; names are stored lower-case.
    pub fn set_schemes(&mut self, schemes: Vec<String>) -> Result<(), PolicyError> {
        let mut checked = Vec::with_capacity(schemes.len());
        for scheme in schemes {
            let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid {
                return Err(PolicyError::InvalidScheme(scheme));
            }
            checked.push(scheme.to_ascii_lowercase());
        }
        self.schemes = checked;
        Ok(())
    }

    pub fn functions(&self) -> &FunctionPolicy {
        &self.functions
    }

    pub fn set_functions(&mut self, functions: FunctionPolicy) {
        self.functions = functions;
    }

    /// Relative references are allowed; absolute ones need an allowed
    /// scheme. Anything that does not parse as a URL is refused.
    pub fn allows_url(&self, value: &str) -> bool {
        let trimmed = value.trim_matches(|c: char| c <= ' ');
        if trimmed.is_empty() {
            return true;
        }
        match url::Url::parse(trimmed) {
            Ok(parsed) => self.schemes.iter().any(|s| s == parsed.scheme()),
            Err(url::ParseError::RelativeUrlWithoutBase) => true,
            Err(err) => {
                debug!(target: "sanitizer.rewriter", "refusing url: {err}");
                false
            }
        }
    }
}

fn known<T: PartialEq>(id: T, unknown: T, table: &'static str, name: &str) -> Result<T, PolicyError> {
    if id == unknown {
        return Err(PolicyError::UnknownName {
            table,
            name: name.to_string(),
        });
    }
    Ok(id)
}
