#![no_main]

use css::{CssMode, CssParser, CssParserConfig, FunctionPolicy};
use html::{ScanBuffer, ScanResult};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let mode = if selector & 1 == 0 {
        CssMode::StyleTag
    } else {
        CssMode::Declarations
    };
    let Ok(mut parser) = CssParser::new(CssParserConfig::default(), mode, FunctionPolicy::default()) else {
        return;
    };
    let mut buffer = ScanBuffer::new(64);
    let mut rest = text;
    loop {
        match parser.next_token(&mut buffer) {
            Ok(ScanResult::Token) => {
                let token = parser.token_mut();
                let selectors = token.selectors().len();
                for index in 0..selectors {
                    token.delete_selector(index);
                }
            }
            Ok(ScanResult::NeedMoreInput) if rest.is_empty() => buffer.set_end_of_stream(),
            Ok(ScanResult::NeedMoreInput) => {
                let taken = buffer.fill(rest);
                assert!(taken > 0, "no room in the window");
                rest = &rest[taken..];
            }
            Ok(ScanResult::Finished) | Err(_) => break,
        }
    }
});
