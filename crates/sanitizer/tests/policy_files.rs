use std::fs;
use std::path::PathBuf;

use html::TagId;
use sanitizer::{Policy, PolicyError, Sanitizer, SanitizerConfig, TagAction};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("read {}: {err}", path.display()))
}

fn strict() -> Sanitizer {
    let policy = Policy::from_toml_str(&fixture("strict_policy.toml")).unwrap();
    Sanitizer::new(policy, SanitizerConfig::default()).unwrap()
}

#[test]
fn strict_policy_loads() {
    let sanitizer = strict();
    let policy = sanitizer.policy();
    assert_eq!(policy.schemes(), ["https".to_string()]);
    assert_eq!(policy.tag(TagId::A), TagAction::Drop);
    assert_eq!(policy.tag(TagId::Img), TagAction::DropWithContent);
    assert_eq!(policy.tag(TagId::B), TagAction::Keep);
}

#[test]
fn strict_policy_keeps_formatting_only() {
    let mut sanitizer = strict();
    let out = sanitizer
        .sanitize_str("<p class=x id=y style=\"color:red\"><a href=\"https://x.com\">l</a> <b>b</b><img src=i.png></p>")
        .unwrap();
    assert_eq!(out, "<p>l <b>b</b></p>");
    let out = sanitizer
        .sanitize_str("<table><tr><td>c</td></tr></table><style>p{color:red}</style>")
        .unwrap();
    assert_eq!(out, "c");
    let out = sanitizer
        .sanitize_str("<blockquote cite=\"http://x.com\">q</blockquote><q cite=\"https://x.com\">r</q>")
        .unwrap();
    assert_eq!(out, "<blockquote>q</blockquote><q cite=\"https://x.com\">r</q>");
}

#[test]
fn unknown_names_are_rejected() {
    match Policy::from_toml_str(&fixture("bad_policy.toml")) {
        Err(PolicyError::UnknownName { table, name }) => {
            assert_eq!(table, "tags");
            assert_eq!(name, "marquee2");
        }
        other => panic!("expected an unknown name, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn failed_overlay_leaves_the_policy_alone() {
    let mut policy = Policy::from_toml_str(&fixture("strict_policy.toml")).unwrap();
    assert!(policy.overlay_toml(&fixture("bad_policy.toml")).is_err());
    assert_eq!(policy.tag(TagId::Div), TagAction::Keep);
    assert_eq!(policy.tag(TagId::A), TagAction::Drop);
}
