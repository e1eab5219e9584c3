#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let out = sanitizer::sanitize(text);
    let lower = out.to_ascii_lowercase();
    assert!(!lower.contains("<script"), "script survived: {out}");
    assert!(!lower.contains("<!--"), "comment survived: {out}");
    let again = sanitizer::sanitize_fragment(text);
    assert!(!again.to_ascii_lowercase().contains("<script"));
});
