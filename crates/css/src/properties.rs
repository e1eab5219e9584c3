//! Well-known CSS property names.

use html::define_names;

/// The value may carry `url(...)` terms.
pub const URL_VALUE: u16 = 1 << 0;
/// Shorthand for several longhand properties.
pub const SHORTHAND: u16 = 1 << 1;

define_names! {
    pub enum PropertyId {
        Azimuth => "azimuth",
        Background => "background": URL_VALUE | SHORTHAND,
        BackgroundAttachment => "background-attachment",
        BackgroundColor => "background-color",
        BackgroundImage => "background-image": URL_VALUE,
        BackgroundPosition => "background-position",
        BackgroundRepeat => "background-repeat",
        Behavior => "behavior": URL_VALUE,
        Border => "border": SHORTHAND,
        BorderBottom => "border-bottom": SHORTHAND,
        BorderBottomColor => "border-bottom-color",
        BorderBottomStyle => "border-bottom-style",
        BorderBottomWidth => "border-bottom-width",
        BorderCollapse => "border-collapse",
        BorderColor => "border-color": SHORTHAND,
        BorderLeft => "border-left": SHORTHAND,
        BorderLeftColor => "border-left-color",
        BorderLeftStyle => "border-left-style",
        BorderLeftWidth => "border-left-width",
        BorderRadius => "border-radius": SHORTHAND,
        BorderRight => "border-right": SHORTHAND,
        BorderRightColor => "border-right-color",
        BorderRightStyle => "border-right-style",
        BorderRightWidth => "border-right-width",
        BorderSpacing => "border-spacing",
        BorderStyle => "border-style": SHORTHAND,
        BorderTop => "border-top": SHORTHAND,
        BorderTopColor => "border-top-color",
        BorderTopStyle => "border-top-style",
        BorderTopWidth => "border-top-width",
        BorderWidth => "border-width": SHORTHAND,
        Bottom => "bottom",
        BoxShadow => "box-shadow",
        CaptionSide => "caption-side",
        Clear => "clear",
        Clip => "clip",
        Color => "color",
        Content => "content": URL_VALUE,
        CounterIncrement => "counter-increment",
        CounterReset => "counter-reset",
        Cue => "cue": URL_VALUE | SHORTHAND,
        CueAfter => "cue-after": URL_VALUE,
        CueBefore => "cue-before": URL_VALUE,
        Cursor => "cursor": URL_VALUE,
        Direction => "direction",
        Display => "display",
        Elevation => "elevation",
        EmptyCells => "empty-cells",
        Filter => "filter",
        Float => "float",
        Font => "font": SHORTHAND,
        FontFamily => "font-family",
        FontSize => "font-size",
        FontSizeAdjust => "font-size-adjust",
        FontStretch => "font-stretch",
        FontStyle => "font-style",
        FontVariant => "font-variant",
        FontWeight => "font-weight",
        Height => "height",
        Left => "left",
        LetterSpacing => "letter-spacing",
        LineHeight => "line-height",
        ListStyle => "list-style": URL_VALUE | SHORTHAND,
        ListStyleImage => "list-style-image": URL_VALUE,
        ListStylePosition => "list-style-position",
        ListStyleType => "list-style-type",
        Margin => "margin": SHORTHAND,
        MarginBottom => "margin-bottom",
        MarginLeft => "margin-left",
        MarginRight => "margin-right",
        MarginTop => "margin-top",
        MaxHeight => "max-height",
        MaxWidth => "max-width",
        MinHeight => "min-height",
        MinWidth => "min-width",
        MozBinding => "-moz-binding": URL_VALUE,
        Opacity => "opacity",
        Orphans => "orphans",
        Outline => "outline": SHORTHAND,
        OutlineColor => "outline-color",
        OutlineStyle => "outline-style",
        OutlineWidth => "outline-width",
        Overflow => "overflow",
        Padding => "padding": SHORTHAND,
        PaddingBottom => "padding-bottom",
        PaddingLeft => "padding-left",
        PaddingRight => "padding-right",
        PaddingTop => "padding-top",
        PageBreakAfter => "page-break-after",
        PageBreakBefore => "page-break-before",
        PageBreakInside => "page-break-inside",
        Pause => "pause": SHORTHAND,
        PauseAfter => "pause-after",
        PauseBefore => "pause-before",
        Pitch => "pitch",
        PitchRange => "pitch-range",
        PlayDuring => "play-during": URL_VALUE,
        Position => "position",
        Quotes => "quotes",
        Richness => "richness",
        Right => "right",
        Speak => "speak",
        SpeakHeader => "speak-header",
        SpeakNumeral => "speak-numeral",
        SpeakPunctuation => "speak-punctuation",
        SpeechRate => "speech-rate",
        Src => "src": URL_VALUE,
        Stress => "stress",
        TableLayout => "table-layout",
        TextAlign => "text-align",
        TextDecoration => "text-decoration",
        TextIndent => "text-indent",
        TextShadow => "text-shadow",
        TextTransform => "text-transform",
        Top => "top",
        UnicodeBidi => "unicode-bidi",
        UnicodeRange => "unicode-range",
        VerticalAlign => "vertical-align",
        Visibility => "visibility",
        VoiceFamily => "voice-family",
        Volume => "volume",
        WhiteSpace => "white-space",
        Widows => "widows",
        Width => "width",
        WordSpacing => "word-spacing",
        ZIndex => "z-index",
    }
}

impl PropertyId {
    pub fn takes_url(self) -> bool {
        self.flags() & URL_VALUE != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(PropertyId::lookup("color"), PropertyId::Color);
        assert_eq!(PropertyId::lookup("Background-Image"), PropertyId::BackgroundImage);
        assert_eq!(PropertyId::lookup("-moz-binding"), PropertyId::MozBinding);
        assert_eq!(PropertyId::lookup("colour"), PropertyId::Unknown);
    }

    #[test]
    fn names_are_unique_and_lower_case() {
        let mut seen = std::collections::HashSet::new();
        for id in PropertyId::ALL {
            assert!(seen.insert(id.name()), "duplicate {}", id.name());
            assert_eq!(id.name(), id.name().to_ascii_lowercase());
        }
    }

    #[test]
    fn url_flags() {
        assert!(PropertyId::BackgroundImage.takes_url());
        assert!(!PropertyId::Color.takes_url());
    }
}
