//! Well-known tag and attribute names.
//!
//! Each table is generated from one `Variant => "name"` list by
//! `define_names!`. Lookup goes through a lazily built `HashMap` keyed by the
//! lower-case name; mixed-case input is folded before the second lookup, so the
//! lookup is ASCII case-insensitive.

/// Names longer than this never match a table entry.
pub const MAX_NAME_LEN: usize = 32;

/// Generate a name table enum with `Unknown`, `ALL`, `name`, `flags` and
/// `lookup`. Optional flags are `|`-joined constants in scope at the call site.
#[macro_export]
macro_rules! define_names {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident {
            $($id:ident => $name:literal $(: $($flag:ident)|+)?,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $ty {
            #[default]
            Unknown,
            $($id,)*
        }

        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$id,)*];
            /// Number of variants including `Unknown`; valid bound for `index()`.
            pub const COUNT: usize = Self::ALL.len() + 1;

            pub fn name(self) -> &'static str {
                match self {
                    $ty::Unknown => "",
                    $($ty::$id => $name,)*
                }
            }

            pub fn flags(self) -> u16 {
                match self {
                    $ty::Unknown => 0,
                    $($ty::$id => 0 $($(| $flag)+)?,)*
                }
            }

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn is_known(self) -> bool {
                self != $ty::Unknown
            }

            pub fn lookup(name: &str) -> $ty {
                static INDEX: std::sync::OnceLock<std::collections::HashMap<&'static str, $ty>> =
                    std::sync::OnceLock::new();
                if name.len() > $crate::names::MAX_NAME_LEN {
                    return $ty::Unknown;
                }
                let index = INDEX.get_or_init(|| $ty::ALL.iter().map(|&id| (id.name(), id)).collect());
                if let Some(&id) = index.get(name) {
                    return id;
                }
                if name.bytes().any(|b| b.is_ascii_uppercase()) {
                    let folded = name.to_ascii_lowercase();
                    return index.get(folded.as_str()).copied().unwrap_or($ty::Unknown);
                }
                $ty::Unknown
            }
        }
    };
}

pub const VOID: u16 = 1 << 0;
/// Block-level: whitespace around the element is insignificant.
pub const BLOCK: u16 = 1 << 1;
pub const RAW_TEXT: u16 = 1 << 2;
pub const RCDATA: u16 = 1 << 3;
pub const PLAINTEXT: u16 = 1 << 4;

/// How the tokenizer reads the content of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextMode {
    Normal,
    /// No markup and no character references until the end tag.
    RawText,
    /// No markup until the end tag; character references are decoded.
    RcData,
    /// Everything to end of stream is text.
    PlainText,
}

define_names! {
    pub enum TagId {
        A => "a",
        Abbr => "abbr",
        Acronym => "acronym",
        Address => "address": BLOCK,
        Applet => "applet",
        Area => "area": VOID,
        Article => "article": BLOCK,
        Aside => "aside": BLOCK,
        Audio => "audio",
        B => "b",
        Base => "base": VOID,
        Basefont => "basefont": VOID,
        Bdi => "bdi",
        Bdo => "bdo",
        Bgsound => "bgsound": VOID,
        Big => "big",
        Blink => "blink",
        Blockquote => "blockquote": BLOCK,
        Body => "body": BLOCK,
        Br => "br": VOID,
        Button => "button",
        Canvas => "canvas",
        Caption => "caption": BLOCK,
        Center => "center": BLOCK,
        Cite => "cite",
        Code => "code",
        Col => "col": VOID | BLOCK,
        Colgroup => "colgroup": BLOCK,
        Dd => "dd": BLOCK,
        Del => "del",
        Details => "details": BLOCK,
        Dfn => "dfn",
        Dialog => "dialog": BLOCK,
        Dir => "dir": BLOCK,
        Div => "div": BLOCK,
        Dl => "dl": BLOCK,
        Dt => "dt": BLOCK,
        Em => "em",
        Embed => "embed": VOID,
        Fieldset => "fieldset": BLOCK,
        Figcaption => "figcaption": BLOCK,
        Figure => "figure": BLOCK,
        Font => "font",
        Footer => "footer": BLOCK,
        Form => "form": BLOCK,
        Frame => "frame": VOID,
        Frameset => "frameset": BLOCK,
        H1 => "h1": BLOCK,
        H2 => "h2": BLOCK,
        H3 => "h3": BLOCK,
        H4 => "h4": BLOCK,
        H5 => "h5": BLOCK,
        H6 => "h6": BLOCK,
        Head => "head": BLOCK,
        Header => "header": BLOCK,
        Hgroup => "hgroup": BLOCK,
        Hr => "hr": VOID | BLOCK,
        Html => "html": BLOCK,
        I => "i",
        Iframe => "iframe": RAW_TEXT,
        Img => "img": VOID,
        Input => "input": VOID,
        Ins => "ins",
        Isindex => "isindex": VOID,
        Kbd => "kbd",
        Keygen => "keygen": VOID,
        Label => "label",
        Legend => "legend": BLOCK,
        Li => "li": BLOCK,
        Link => "link": VOID,
        Listing => "listing": BLOCK,
        Main => "main": BLOCK,
        Map => "map",
        Mark => "mark",
        Marquee => "marquee",
        Math => "math",
        Menu => "menu": BLOCK,
        Meta => "meta": VOID,
        Meter => "meter",
        Nav => "nav": BLOCK,
        Nobr => "nobr",
        Noembed => "noembed": RAW_TEXT,
        Noframes => "noframes": RAW_TEXT,
        Noscript => "noscript": RAW_TEXT,
        Object => "object",
        Ol => "ol": BLOCK,
        Optgroup => "optgroup": BLOCK,
        Option => "option": BLOCK,
        Output => "output",
        P => "p": BLOCK,
        Param => "param": VOID,
        Picture => "picture",
        Plaintext => "plaintext": PLAINTEXT | BLOCK,
        Pre => "pre": BLOCK,
        Progress => "progress",
        Q => "q",
        Rp => "rp",
        Rt => "rt",
        Ruby => "ruby",
        S => "s",
        Samp => "samp",
        Script => "script": RAW_TEXT,
        Section => "section": BLOCK,
        Select => "select": BLOCK,
        Small => "small",
        Source => "source": VOID,
        Span => "span",
        Strike => "strike",
        Strong => "strong",
        Style => "style": RAW_TEXT,
        Sub => "sub",
        Summary => "summary",
        Sup => "sup",
        Svg => "svg",
        Table => "table": BLOCK,
        Tbody => "tbody": BLOCK,
        Td => "td": BLOCK,
        Template => "template",
        Textarea => "textarea": RCDATA,
        Tfoot => "tfoot": BLOCK,
        Th => "th": BLOCK,
        Thead => "thead": BLOCK,
        Time => "time",
        Title => "title": RCDATA,
        Tr => "tr": BLOCK,
        Track => "track": VOID,
        Tt => "tt",
        U => "u",
        Ul => "ul": BLOCK,
        Var => "var",
        Video => "video",
        Wbr => "wbr": VOID,
        Xml => "xml",
        Xmp => "xmp": RAW_TEXT | BLOCK,
    }
}

impl TagId {
    pub fn is_void(self) -> bool {
        self.flags() & VOID != 0
    }

    pub fn is_block(self) -> bool {
        self.flags() & BLOCK != 0
    }

    pub fn text_mode(self) -> TextMode {
        let flags = self.flags();
        if flags & RAW_TEXT != 0 {
            TextMode::RawText
        } else if flags & RCDATA != 0 {
            TextMode::RcData
        } else if flags & PLAINTEXT != 0 {
            TextMode::PlainText
        } else {
            TextMode::Normal
        }
    }
}

define_names! {
    pub enum AttributeId {
        Abbr => "abbr",
        Accept => "accept",
        AcceptCharset => "accept-charset",
        Accesskey => "accesskey",
        Action => "action",
        Align => "align",
        Alink => "alink",
        Alt => "alt",
        Archive => "archive",
        Autofocus => "autofocus",
        Axis => "axis",
        Background => "background",
        Behavior => "behavior",
        Bgcolor => "bgcolor",
        Border => "border",
        Bordercolor => "bordercolor",
        Cellpadding => "cellpadding",
        Cellspacing => "cellspacing",
        Char => "char",
        Charoff => "charoff",
        Charset => "charset",
        Checked => "checked",
        Cite => "cite",
        Class => "class",
        Classid => "classid",
        Clear => "clear",
        Code => "code",
        Codebase => "codebase",
        Codetype => "codetype",
        Color => "color",
        Cols => "cols",
        Colspan => "colspan",
        Compact => "compact",
        Content => "content",
        Contenteditable => "contenteditable",
        Coords => "coords",
        Data => "data",
        Datasrc => "datasrc",
        Datetime => "datetime",
        Declare => "declare",
        Defer => "defer",
        Dir => "dir",
        Disabled => "disabled",
        Dynsrc => "dynsrc",
        Enctype => "enctype",
        Face => "face",
        For => "for",
        Formaction => "formaction",
        Frame => "frame",
        Frameborder => "frameborder",
        Headers => "headers",
        Height => "height",
        Href => "href",
        Hreflang => "hreflang",
        Hspace => "hspace",
        HttpEquiv => "http-equiv",
        Id => "id",
        Ismap => "ismap",
        Label => "label",
        Lang => "lang",
        Language => "language",
        Link => "link",
        Longdesc => "longdesc",
        Lowsrc => "lowsrc",
        Marginheight => "marginheight",
        Marginwidth => "marginwidth",
        Maxlength => "maxlength",
        Media => "media",
        Method => "method",
        Multiple => "multiple",
        Name => "name",
        Nohref => "nohref",
        Noresize => "noresize",
        Noshade => "noshade",
        Nowrap => "nowrap",
        Onabort => "onabort",
        Onblur => "onblur",
        Onchange => "onchange",
        Onclick => "onclick",
        Ondblclick => "ondblclick",
        Onerror => "onerror",
        Onfocus => "onfocus",
        Onkeydown => "onkeydown",
        Onkeypress => "onkeypress",
        Onkeyup => "onkeyup",
        Onload => "onload",
        Onmousedown => "onmousedown",
        Onmousemove => "onmousemove",
        Onmouseout => "onmouseout",
        Onmouseover => "onmouseover",
        Onmouseup => "onmouseup",
        Onreset => "onreset",
        Onselect => "onselect",
        Onsubmit => "onsubmit",
        Onunload => "onunload",
        Poster => "poster",
        Profile => "profile",
        Readonly => "readonly",
        Rel => "rel",
        Rev => "rev",
        Rows => "rows",
        Rowspan => "rowspan",
        Rules => "rules",
        Scheme => "scheme",
        Scope => "scope",
        Scrolling => "scrolling",
        Selected => "selected",
        Shape => "shape",
        Size => "size",
        Span => "span",
        Src => "src",
        Srcdoc => "srcdoc",
        Srcset => "srcset",
        Standby => "standby",
        Start => "start",
        Style => "style",
        Summary => "summary",
        Tabindex => "tabindex",
        Target => "target",
        Text => "text",
        Title => "title",
        Type => "type",
        Usemap => "usemap",
        Valign => "valign",
        Value => "value",
        Valuetype => "valuetype",
        Version => "version",
        Vlink => "vlink",
        Vspace => "vspace",
        Width => "width",
        Xmlns => "xmlns",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(TagId::lookup("div"), TagId::Div);
        assert_eq!(TagId::lookup("DiV"), TagId::Div);
        assert_eq!(AttributeId::lookup("ONCLICK"), AttributeId::Onclick);
        assert_eq!(AttributeId::lookup("http-equiv"), AttributeId::HttpEquiv);
    }

    #[test]
    fn unknown_and_overlong_names() {
        assert_eq!(TagId::lookup("blarg"), TagId::Unknown);
        assert_eq!(TagId::lookup(""), TagId::Unknown);
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert_eq!(TagId::lookup(&long), TagId::Unknown);
        assert!(!TagId::Unknown.is_known());
        assert_eq!(TagId::Unknown.name(), "");
    }

    #[test]
    fn every_name_round_trips() {
        for &id in TagId::ALL {
            assert_eq!(TagId::lookup(id.name()), id, "{id:?}");
            assert!(id.index() < TagId::COUNT);
        }
        for &id in AttributeId::ALL {
            assert_eq!(AttributeId::lookup(id.name()), id, "{id:?}");
        }
    }

    #[test]
    fn tag_flags_drive_text_modes() {
        assert_eq!(TagId::Script.text_mode(), TextMode::RawText);
        assert_eq!(TagId::Textarea.text_mode(), TextMode::RcData);
        assert_eq!(TagId::Plaintext.text_mode(), TextMode::PlainText);
        assert_eq!(TagId::Div.text_mode(), TextMode::Normal);
        assert!(TagId::Br.is_void());
        assert!(TagId::Hr.is_block());
        assert!(!TagId::Span.is_block());
    }
}
