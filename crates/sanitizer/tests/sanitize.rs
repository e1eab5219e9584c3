use quickcheck_macros::quickcheck;
use sanitizer::{Mode, Policy, Sanitizer, SanitizerConfig, sanitize, sanitize_chunks, sanitize_fragment};

const WELL_FORMED: &[&str] = &[
    "<div onclick=\"evil()\">ok</div>",
    "<p style=\"color:red; behavior:url(evil.htc)\">x</p>",
    "<table border=1><tr><td>a &amp; b</td></tr></table>",
    "<ul><li><a href=\"http://x.com/a?b=c&amp;d=e\" title='t'>link</a></li></ul>",
    "<style>p.note, h1 > em { color: rgb(1, 2, 3); margin: 0 auto !important }</style><p class=note>x</p>",
    "<img src=\"/a.png\" alt=\"caf\u{e9}\"><br><hr>",
    "<blockquote cite=\"https://x.com\">\u{65e5}\u{672c}\u{8a9e}</blockquote>",
    "<p style=\"font-family: 'Open Sans', serif; background: url('/bg.png')\">y</p>",
];

#[test]
fn drops_disallowed_attributes() {
    assert_eq!(sanitize("<div onclick=\"evil()\">ok</div>"), "<div>ok</div>");
}

#[test]
fn drops_function_bearing_declarations() {
    let out = sanitize("<p style=\"color:red; behavior:url(evil.htc)\">x</p>");
    assert_eq!(out, "<p style=\"color:red;\">x</p>");
}

#[test]
fn sanitizing_twice_changes_nothing() {
    for input in WELL_FORMED {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "input: {input}");
        let once = sanitize_fragment(input);
        assert_eq!(sanitize_fragment(&once), once, "fragment input: {input}");
    }
}

#[test]
fn nothing_executable_survives() {
    let attacks = [
        "<script>alert(1)</script>",
        "<img src=x onerror=alert(1)>",
        "<a href=\"jav&#x09;ascript:alert(1)\">x</a>",
        "<a href=\" javascript:alert(1)\">x</a>",
        "<div style=\"width: expression(alert(1))\">x</div>",
        "<div style=\"background:url(javascript:alert(1))\">x</div>",
        "<style>@import 'evil.css'; p { -moz-binding: url(x.xml#y) }</style>",
        "<svg><script>alert(1)</script></svg>",
        "<iframe srcdoc=\"<script>alert(1)</script>\"></iframe>",
        "<math><mtext><script>alert(1)</script></mtext></math>",
        "<<script>script>alert(1)<</script>/script>",
        "<!--<script>alert(1)</script>-->",
        "<object data=\"x.swf\"><param name=a value=b></object>",
    ];
    for attack in attacks {
        let out = sanitize(attack).to_ascii_lowercase();
        for needle in ["<script", "javascript", "onerror", "expression", "binding", "<iframe", "<object", "@import"] {
            assert!(!out.contains(needle), "{attack} -> {out}");
        }
    }
}

#[test]
fn fragments_lose_the_document_shell() {
    assert_eq!(
        sanitize_fragment("<html><head><title>t</title></head><body><b>x</b></body></html>"),
        "<b>x</b>"
    );
}

#[test]
fn empty_input() {
    assert_eq!(sanitize(""), "");
    assert_eq!(sanitize_fragment(""), "");
    let mut out = String::new();
    sanitize_chunks(std::iter::empty(), &mut out, Mode::Document).unwrap();
    assert_eq!(out, "");
}

#[test]
fn a_sanitizer_handles_many_documents() {
    let mut sanitizer = Sanitizer::new(Policy::default(), SanitizerConfig::default()).unwrap();
    assert_eq!(sanitizer.sanitize_str("<b>x").unwrap(), "<b>x</b>");
    assert_eq!(sanitizer.sanitize_str("<i>y</i>").unwrap(), "<i>y</i>");
}

#[test]
fn invalid_configuration_is_refused() {
    let config = SanitizerConfig {
        window_size: 8,
        ..SanitizerConfig::default()
    };
    let err = Sanitizer::new(Policy::default(), config).err().unwrap();
    assert!(err.to_string().contains("invalid configuration"), "{err}");
}

#[quickcheck]
fn arbitrary_input_never_yields_raw_markup(input: String) -> bool {
    let out = sanitize(&input);
    let lower = out.to_ascii_lowercase();
    !lower.contains("<script") && !lower.contains("<!--") && !lower.contains("<iframe")
}

#[quickcheck]
fn chunked_input_matches_whole_input(input: String, cut: usize) -> bool {
    let cut = if input.is_empty() { 0 } else { cut % input.len() };
    if !input.is_char_boundary(cut) {
        return true;
    }
    let mut out = String::new();
    sanitize_chunks([&input[..cut], &input[cut..]], &mut out, Mode::Fragment).is_ok()
        && out == sanitize_fragment(&input)
}
