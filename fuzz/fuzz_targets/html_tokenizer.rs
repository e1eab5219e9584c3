#![no_main]

use html::{HtmlTokenizer, ScanBuffer, ScanResult, TokenizerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut tokenizer) = HtmlTokenizer::new(TokenizerConfig::default()) else {
        return;
    };
    // Small window so pieces split often.
    let mut buffer = ScanBuffer::new(64);
    let mut rest = text;
    loop {
        match tokenizer.next_token(&mut buffer) {
            Ok(ScanResult::Token) => {}
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
