//! Unicode code charts that can be marked safe for markup encoding.
//!
//! The Basic Multilingual Plane is split into five groups of up to 31
//! charts, each group a bitmask type. A chart names one or more code point
//! ranges; `ranges()` yields every range whose bit is set.

use std::ops::{BitOr, BitOrAssign, RangeInclusive};

macro_rules! define_charts {
    (
        $(#[$meta:meta])*
        $ty:ident {
            $($flag:ident = $bit:literal => [$($lo:literal ..= $hi:literal),+ $(,)?],)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $ty(u32);

        impl $ty {
            pub const NONE: $ty = $ty(0);
            $(pub const $flag: $ty = $ty(1 << $bit);)*
            pub const ALL: $ty = $ty(0 $(| (1 << $bit))*);

            const RANGES: &'static [(u32, &'static [(u32, u32)])] = &[
                $((1 << $bit, &[$(($lo, $hi)),+]),)*
            ];

            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Unknown bits are dropped.
            pub const fn from_bits_truncate(bits: u32) -> Self {
                $ty(bits & Self::ALL.0)
            }

            pub const fn contains(self, other: $ty) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn ranges(self) -> impl Iterator<Item = RangeInclusive<u32>> {
                Self::RANGES
                    .iter()
                    .filter(move |(bit, _)| self.0 & bit != 0)
                    .flat_map(|(_, ranges)| ranges.iter().map(|&(lo, hi)| lo..=hi))
            }
        }

        impl BitOr for $ty {
            type Output = $ty;

            fn bitor(self, rhs: $ty) -> $ty {
                $ty(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $ty {
            fn bitor_assign(&mut self, rhs: $ty) {
                self.0 |= rhs.0;
            }
        }
    };
}

define_charts! {
    /// U+0000 to U+0FFF.
    LowerCodeCharts {
        BASIC_LATIN = 0 => [0x0020..=0x007E],
        C1_CONTROLS_AND_LATIN1_SUPPLEMENT = 1 => [0x00A1..=0x00AC, 0x00AE..=0x00FF],
        LATIN_EXTENDED_A = 2 => [0x0100..=0x017F],
        LATIN_EXTENDED_B = 3 => [0x0180..=0x024F],
        IPA_EXTENSIONS = 4 => [0x0250..=0x02AF],
        SPACING_MODIFIER_LETTERS = 5 => [0x02B0..=0x02FF],
        COMBINING_DIACRITICAL_MARKS = 6 => [0x0300..=0x036F],
        GREEK_AND_COPTIC = 7 => [0x0370..=0x0377, 0x037A..=0x037E, 0x0384..=0x038A, 0x038C..=0x038C, 0x038E..=0x03A1, 0x03A3..=0x03FF],
        CYRILLIC = 8 => [0x0400..=0x04FF],
        CYRILLIC_SUPPLEMENT = 9 => [0x0500..=0x052F],
        ARMENIAN = 10 => [0x0531..=0x0556, 0x0559..=0x058A],
        HEBREW = 11 => [0x0591..=0x05C7, 0x05D0..=0x05EA, 0x05F0..=0x05F4],
        ARABIC = 12 => [0x0600..=0x06FF],
        SYRIAC = 13 => [0x0700..=0x070D, 0x070F..=0x074A, 0x074D..=0x074F],
        ARABIC_SUPPLEMENT = 14 => [0x0750..=0x077F],
        THAANA = 15 => [0x0780..=0x07B1],
        NKO = 16 => [0x07C0..=0x07FA],
        SAMARITAN = 17 => [0x0800..=0x082D, 0x0830..=0x083E],
        DEVANAGARI = 18 => [0x0900..=0x097F],
        BENGALI = 19 => [0x0980..=0x09FF],
        GURMUKHI = 20 => [0x0A00..=0x0A7F],
        GUJARATI = 21 => [0x0A80..=0x0AFF],
        ORIYA = 22 => [0x0B00..=0x0B7F],
        TAMIL = 23 => [0x0B80..=0x0BFF],
        TELUGU = 24 => [0x0C00..=0x0C7F],
        KANNADA = 25 => [0x0C80..=0x0CFF],
        MALAYALAM = 26 => [0x0D00..=0x0D7F],
        SINHALA = 27 => [0x0D80..=0x0DFF],
        THAI = 28 => [0x0E01..=0x0E3A, 0x0E3F..=0x0E5B],
        LAO = 29 => [0x0E80..=0x0EFF],
        TIBETAN = 30 => [0x0F00..=0x0FFF],
    }
}

impl LowerCodeCharts {
    /// Latin scripts, safe unless reconfigured.
    pub const DEFAULT: LowerCodeCharts = LowerCodeCharts(
        Self::BASIC_LATIN.0
            | Self::C1_CONTROLS_AND_LATIN1_SUPPLEMENT.0
            | Self::LATIN_EXTENDED_A.0
            | Self::LATIN_EXTENDED_B.0
            | Self::SPACING_MODIFIER_LETTERS.0,
    );
}

define_charts! {
    /// U+1000 to U+1EFF.
    LowerMidCodeCharts {
        MYANMAR = 0 => [0x1000..=0x109F],
        GEORGIAN = 1 => [0x10A0..=0x10C5, 0x10D0..=0x10FC],
        HANGUL_JAMO = 2 => [0x1100..=0x11FF],
        ETHIOPIC = 3 => [0x1200..=0x137C],
        ETHIOPIC_SUPPLEMENT = 4 => [0x1380..=0x1399],
        CHEROKEE = 5 => [0x13A0..=0x13F4],
        UNIFIED_CANADIAN_ABORIGINAL_SYLLABICS = 6 => [0x1400..=0x167F],
        OGHAM = 7 => [0x1680..=0x169C],
        RUNIC = 8 => [0x16A0..=0x16F0],
        TAGALOG = 9 => [0x1700..=0x170C, 0x170E..=0x1714],
        HANUNOO = 10 => [0x1720..=0x1736],
        BUHID = 11 => [0x1740..=0x1753],
        TAGBANWA = 12 => [0x1760..=0x176C, 0x176E..=0x1770, 0x1772..=0x1773],
        KHMER = 13 => [0x1780..=0x17DD, 0x17E0..=0x17E9, 0x17F0..=0x17F9],
        MONGOLIAN = 14 => [0x1800..=0x180E, 0x1810..=0x1819, 0x1820..=0x1877, 0x1880..=0x18AA],
        UNIFIED_CANADIAN_ABORIGINAL_SYLLABICS_EXTENDED = 15 => [0x18B0..=0x18F5],
        LIMBU = 16 => [0x1900..=0x191C, 0x1920..=0x192B, 0x1930..=0x193B, 0x1940..=0x1940, 0x1944..=0x194F],
        TAI_LE = 17 => [0x1950..=0x196D, 0x1970..=0x1974],
        NEW_TAI_LUE = 18 => [0x1980..=0x19AB, 0x19B0..=0x19C9, 0x19D0..=0x19DA, 0x19DE..=0x19DF],
        KHMER_SYMBOLS = 19 => [0x19E0..=0x19FF],
        BUGINESE = 20 => [0x1A00..=0x1A1B, 0x1A1E..=0x1A1F],
        TAI_THAM = 21 => [0x1A20..=0x1A5E, 0x1A60..=0x1A7C, 0x1A7F..=0x1A89, 0x1A90..=0x1A99, 0x1AA0..=0x1AAD],
        BALINESE = 22 => [0x1B00..=0x1B4B, 0x1B50..=0x1B7C],
        SUNDANESE = 23 => [0x1B80..=0x1BAA, 0x1BAE..=0x1BB9],
        LEPCHA = 24 => [0x1C00..=0x1C37, 0x1C3B..=0x1C49, 0x1C4D..=0x1C4F],
        OL_CHIKI = 25 => [0x1C50..=0x1C7F],
        VEDIC_EXTENSIONS = 26 => [0x1CD0..=0x1CF2],
        PHONETIC_EXTENSIONS = 27 => [0x1D00..=0x1D7F],
        PHONETIC_EXTENSIONS_SUPPLEMENT = 28 => [0x1D80..=0x1DBF],
        COMBINING_DIACRITICAL_MARKS_SUPPLEMENT = 29 => [0x1DC0..=0x1DE6, 0x1DFD..=0x1DFF],
        LATIN_EXTENDED_ADDITIONAL = 30 => [0x1E00..=0x1EFF],
    }
}

define_charts! {
    /// U+1F00 to U+2DDF.
    MidCodeCharts {
        GREEK_EXTENDED = 0 => [0x1F00..=0x1F15, 0x1F18..=0x1F1D, 0x1F20..=0x1F45, 0x1F48..=0x1F4D, 0x1F50..=0x1F57, 0x1F59..=0x1F59, 0x1F5B..=0x1F5B, 0x1F5D..=0x1F5D, 0x1F5F..=0x1F7D, 0x1F80..=0x1FB4, 0x1FB6..=0x1FC4, 0x1FC6..=0x1FD3, 0x1FD6..=0x1FDB, 0x1FDD..=0x1FEF, 0x1FF2..=0x1FF4, 0x1FF6..=0x1FFE],
        GENERAL_PUNCTUATION = 1 => [0x2010..=0x2027, 0x2030..=0x205E],
        SUPERSCRIPTS_AND_SUBSCRIPTS = 2 => [0x2070..=0x2071, 0x2074..=0x208E, 0x2090..=0x2094],
        CURRENCY_SYMBOLS = 3 => [0x20A0..=0x20B8],
        COMBINING_DIACRITICAL_MARKS_FOR_SYMBOLS = 4 => [0x20D0..=0x20F0],
        LETTERLIKE_SYMBOLS = 5 => [0x2100..=0x214F],
        NUMBER_FORMS = 6 => [0x2150..=0x2189],
        ARROWS = 7 => [0x2190..=0x21FF],
        MATHEMATICAL_OPERATORS = 8 => [0x2200..=0x22FF],
        MISCELLANEOUS_TECHNICAL = 9 => [0x2300..=0x23E8],
        CONTROL_PICTURES = 10 => [0x2400..=0x2426],
        OPTICAL_CHARACTER_RECOGNITION = 11 => [0x2440..=0x244A],
        ENCLOSED_ALPHANUMERICS = 12 => [0x2460..=0x24FF],
        BOX_DRAWING = 13 => [0x2500..=0x257F],
        BLOCK_ELEMENTS = 14 => [0x2580..=0x259F],
        GEOMETRIC_SHAPES = 15 => [0x25A0..=0x25FF],
        MISCELLANEOUS_SYMBOLS = 16 => [0x2600..=0x26CD, 0x26CF..=0x26E1, 0x26E3..=0x26E3, 0x26E8..=0x26FF],
        DINGBATS = 17 => [0x2701..=0x2704, 0x2706..=0x2709, 0x270C..=0x2727, 0x2729..=0x274B, 0x274D..=0x274D, 0x274F..=0x2752, 0x2756..=0x275E, 0x2761..=0x2794, 0x2798..=0x27AF, 0x27B1..=0x27BE],
        MISCELLANEOUS_MATHEMATICAL_SYMBOLS_A = 18 => [0x27C0..=0x27CA, 0x27CC..=0x27CC, 0x27D0..=0x27EF],
        SUPPLEMENTAL_ARROWS_A = 19 => [0x27F0..=0x27FF],
        BRAILLE_PATTERNS = 20 => [0x2800..=0x28FF],
        SUPPLEMENTAL_ARROWS_B = 21 => [0x2900..=0x297F],
        MISCELLANEOUS_MATHEMATICAL_SYMBOLS_B = 22 => [0x2980..=0x29FF],
        SUPPLEMENTAL_MATHEMATICAL_OPERATORS = 23 => [0x2A00..=0x2AFF],
        MISCELLANEOUS_SYMBOLS_AND_ARROWS = 24 => [0x2B00..=0x2B4C, 0x2B50..=0x2B59],
        GLAGOLITIC = 25 => [0x2C00..=0x2C2E, 0x2C30..=0x2C5E],
        LATIN_EXTENDED_C = 26 => [0x2C60..=0x2C7F],
        COPTIC = 27 => [0x2C80..=0x2CF1, 0x2CF9..=0x2CFF],
        GEORGIAN_SUPPLEMENT = 28 => [0x2D00..=0x2D25],
        TIFINAGH = 29 => [0x2D30..=0x2D65, 0x2D6F..=0x2D6F],
        ETHIOPIC_EXTENDED = 30 => [0x2D80..=0x2D96, 0x2DA0..=0x2DDE],
    }
}

define_charts! {
    /// U+2DE0 to U+A8DF.
    UpperMidCodeCharts {
        CYRILLIC_EXTENDED_A = 0 => [0x2DE0..=0x2DFF],
        SUPPLEMENTAL_PUNCTUATION = 1 => [0x2E00..=0x2E31],
        CJK_RADICALS_SUPPLEMENT = 2 => [0x2E80..=0x2E99, 0x2E9B..=0x2EF3],
        KANGXI_RADICALS = 3 => [0x2F00..=0x2FD5],
        IDEOGRAPHIC_DESCRIPTION_CHARACTERS = 4 => [0x2FF0..=0x2FFB],
        CJK_SYMBOLS_AND_PUNCTUATION = 5 => [0x3000..=0x303F],
        HIRAGANA = 6 => [0x3041..=0x3096, 0x3099..=0x309F],
        KATAKANA = 7 => [0x30A0..=0x30FF],
        BOPOMOFO = 8 => [0x3105..=0x312D],
        HANGUL_COMPATIBILITY_JAMO = 9 => [0x3131..=0x318E],
        KANBUN = 10 => [0x3190..=0x319F],
        BOPOMOFO_EXTENDED = 11 => [0x31A0..=0x31B7],
        CJK_STROKES = 12 => [0x31C0..=0x31E3],
        KATAKANA_PHONETIC_EXTENSIONS = 13 => [0x31F0..=0x31FF],
        ENCLOSED_CJK_LETTERS_AND_MONTHS = 14 => [0x3200..=0x321E, 0x3220..=0x32FE],
        CJK_COMPATIBILITY = 15 => [0x3300..=0x33FF],
        CJK_UNIFIED_IDEOGRAPHS_EXTENSION_A = 16 => [0x3400..=0x4DB5],
        YIJING_HEXAGRAM_SYMBOLS = 17 => [0x4DC0..=0x4DFF],
        CJK_UNIFIED_IDEOGRAPHS = 18 => [0x4E00..=0x9FCB],
        YI_SYLLABLES = 19 => [0xA000..=0xA48C],
        YI_RADICALS = 20 => [0xA490..=0xA4C6],
        LISU = 21 => [0xA4D0..=0xA4FF],
        VAI = 22 => [0xA500..=0xA62B],
        CYRILLIC_EXTENDED_B = 23 => [0xA640..=0xA65F, 0xA662..=0xA673, 0xA67C..=0xA697],
        BAMUM = 24 => [0xA6A0..=0xA6F7],
        MODIFIER_TONE_LETTERS = 25 => [0xA700..=0xA71F],
        LATIN_EXTENDED_D = 26 => [0xA720..=0xA78C, 0xA7FB..=0xA7FF],
        SYLOTI_NAGRI = 27 => [0xA800..=0xA82B],
        COMMON_INDIC_NUMBER_FORMS = 28 => [0xA830..=0xA839],
        PHAGS_PA = 29 => [0xA840..=0xA877],
        SAURASHTRA = 30 => [0xA880..=0xA8C4, 0xA8CE..=0xA8D9],
    }
}

define_charts! {
    /// U+A8E0 to U+FFFF.
    UpperCodeCharts {
        DEVANAGARI_EXTENDED = 0 => [0xA8E0..=0xA8FB],
        KAYAH_LI = 1 => [0xA900..=0xA92F],
        REJANG = 2 => [0xA930..=0xA953, 0xA95F..=0xA95F],
        HANGUL_JAMO_EXTENDED_A = 3 => [0xA960..=0xA97C],
        JAVANESE = 4 => [0xA980..=0xA9CD, 0xA9CF..=0xA9D9, 0xA9DE..=0xA9DF],
        CHAM = 5 => [0xAA00..=0xAA36, 0xAA40..=0xAA4D, 0xAA50..=0xAA59, 0xAA5C..=0xAA5F],
        MYANMAR_EXTENDED_A = 6 => [0xAA60..=0xAA7B],
        TAI_VIET = 7 => [0xAA80..=0xAAC2, 0xAADB..=0xAADF],
        MEETEI_MAYEK = 8 => [0xABC0..=0xABED, 0xABF0..=0xABF9],
        HANGUL_SYLLABLES = 9 => [0xAC00..=0xD7A3],
        HANGUL_JAMO_EXTENDED_B = 10 => [0xD7B0..=0xD7C6, 0xD7CB..=0xD7FB],
        CJK_COMPATIBILITY_IDEOGRAPHS = 11 => [0xF900..=0xFA2D, 0xFA30..=0xFA6D, 0xFA70..=0xFAD9],
        ALPHABETIC_PRESENTATION_FORMS = 12 => [0xFB00..=0xFB06, 0xFB13..=0xFB17, 0xFB1D..=0xFB36, 0xFB38..=0xFB3C, 0xFB3E..=0xFB3E, 0xFB40..=0xFB41, 0xFB43..=0xFB44, 0xFB46..=0xFB4F],
        ARABIC_PRESENTATION_FORMS_A = 13 => [0xFB50..=0xFBB1, 0xFBD3..=0xFD3F, 0xFD50..=0xFD8F, 0xFD92..=0xFDC7, 0xFDF0..=0xFDFD],
        VARIATION_SELECTORS = 14 => [0xFE00..=0xFE0F],
        VERTICAL_FORMS = 15 => [0xFE10..=0xFE19],
        COMBINING_HALF_MARKS = 16 => [0xFE20..=0xFE26],
        CJK_COMPATIBILITY_FORMS = 17 => [0xFE30..=0xFE4F],
        SMALL_FORM_VARIANTS = 18 => [0xFE50..=0xFE52, 0xFE54..=0xFE66, 0xFE68..=0xFE6B],
        ARABIC_PRESENTATION_FORMS_B = 19 => [0xFE70..=0xFE74, 0xFE76..=0xFEFC],
        HALF_WIDTH_AND_FULL_WIDTH_FORMS = 20 => [0xFF01..=0xFFBE, 0xFFC2..=0xFFC7, 0xFFCA..=0xFFCF, 0xFFD2..=0xFFD7, 0xFFDA..=0xFFDC, 0xFFE0..=0xFFE6, 0xFFE8..=0xFFEE],
        SPECIALS = 21 => [0xFFFC..=0xFFFD],
    }
}

/// One bitmask per chart group; the unit `mark_as_safe` installs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodeCharts {
    pub lower: LowerCodeCharts,
    pub lower_mid: LowerMidCodeCharts,
    pub mid: MidCodeCharts,
    pub upper_mid: UpperMidCodeCharts,
    pub upper: UpperCodeCharts,
}

impl Default for CodeCharts {
    fn default() -> Self {
        Self {
            lower: LowerCodeCharts::DEFAULT,
            lower_mid: LowerMidCodeCharts::NONE,
            mid: MidCodeCharts::NONE,
            upper_mid: UpperMidCodeCharts::NONE,
            upper: UpperCodeCharts::NONE,
        }
    }
}

impl CodeCharts {
    pub const ALL: CodeCharts = CodeCharts {
        lower: LowerCodeCharts::ALL,
        lower_mid: LowerMidCodeCharts::ALL,
        mid: MidCodeCharts::ALL,
        upper_mid: UpperMidCodeCharts::ALL,
        upper: UpperCodeCharts::ALL,
    };

    /// Every code point range marked safe across the five groups.
    pub fn ranges(&self) -> impl Iterator<Item = RangeInclusive<u32>> + '_ {
        self.lower
            .ranges()
            .chain(self.lower_mid.ranges())
            .chain(self.mid.ranges())
            .chain(self.upper_mid.ranges())
            .chain(self.upper.ranges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let charts = LowerCodeCharts::CYRILLIC | LowerCodeCharts::HEBREW;
        assert!(charts.contains(LowerCodeCharts::CYRILLIC));
        assert!(!charts.contains(LowerCodeCharts::ARABIC));
        assert_eq!(LowerCodeCharts::from_bits_truncate(u32::MAX), LowerCodeCharts::ALL);
        assert!(UpperCodeCharts::from_bits_truncate(1 << 31).is_empty());
    }

    #[test]
    fn ranges_follow_bits() {
        let ranges: Vec<_> = LowerCodeCharts::CYRILLIC.ranges().collect();
        assert_eq!(ranges, vec![0x0400..=0x04FF]);
        assert_eq!(LowerCodeCharts::NONE.ranges().count(), 0);
    }

    #[test]
    fn ranges_stay_in_the_basic_plane_and_skip_surrogates() {
        for range in CodeCharts::ALL.ranges() {
            assert!(range.start() <= range.end());
            assert!(*range.end() <= 0xFFFF);
            assert!(*range.end() < 0xD800 || *range.start() > 0xDFFF);
        }
    }
}
