//! Tests for parsing method definitions into the six-slot signature model.

use defcheck::parse_definition;
use pretty_assertions::assert_eq;

fn names(slot: &[String]) -> Vec<&str> {
    slot.iter().map(String::as_str).collect()
}

// === Positional slots ===

#[test]
fn required_positionals() {
    let def = parse_definition("def f(a, b)").unwrap();
    assert_eq!(def.name(), "f");
    assert_eq!(names(def.signature().requireds()), ["a", "b"]);
    assert!(def.signature().optionals().is_empty());
    assert_eq!(def.signature().rest(), None);
}

#[test]
fn parenless_definition() {
    let def = parse_definition("def f a, b").unwrap();
    assert_eq!(names(def.signature().requireds()), ["a", "b"]);
}

#[test]
fn no_parameters_at_all() {
    let def = parse_definition("def f").unwrap();
    assert!(def.signature().requireds().is_empty());
    assert!(!def.signature().has_keywords());
}

#[test]
fn optional_positionals_keep_default_text() {
    let def = parse_definition("def f(m = 1, n = [2, 3])").unwrap();
    let optionals = def.signature().optionals();
    assert_eq!(optionals.len(), 2);
    assert_eq!(optionals[0].name(), "m");
    assert_eq!(optionals[0].default(), "1");
    assert_eq!(optionals[1].name(), "n");
    assert_eq!(optionals[1].default(), "[2, 3]");
}

#[test]
fn splat_and_post_splat() {
    let def = parse_definition("def f(a, *rest, y, z)").unwrap();
    assert_eq!(names(def.signature().requireds()), ["a"]);
    assert_eq!(def.signature().rest(), Some("rest"));
    assert_eq!(names(def.signature().posts()), ["y", "z"]);
}

#[test]
fn anonymous_splat_records_presence() {
    let def = parse_definition("def f(a, *)").unwrap();
    assert_eq!(def.signature().rest(), Some("*"));
}

// === Keyword slots ===

#[test]
fn required_and_optional_keywords() {
    let def = parse_definition("def f(k:, o: 1)").unwrap();
    let keywords = def.signature().keywords();
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0].label(), "k");
    assert!(keywords[0].is_required());
    assert_eq!(keywords[1].label(), "o");
    assert_eq!(keywords[1].default(), Some("1"));
    assert!(def.signature().has_required_keywords());
}

#[test]
fn keyword_splat() {
    let def = parse_definition("def f(**kw)").unwrap();
    assert_eq!(def.signature().keyword_rest(), Some("kw"));
    assert!(def.signature().has_keywords());
    assert!(!def.signature().has_required_keywords());
}

#[test]
fn no_keywords_marker_declares_nothing() {
    let def = parse_definition("def f(a, **nil)").unwrap();
    assert_eq!(def.signature().keyword_rest(), None);
    assert!(!def.signature().has_keywords());
}

#[test]
fn forwarding_marks_rest_and_keyword_rest() {
    let def = parse_definition("def f(...)").unwrap();
    assert_eq!(def.signature().rest(), Some("..."));
    assert_eq!(def.signature().keyword_rest(), Some("..."));
}

// === Full shape ===

#[test]
fn every_slot_at_once() {
    let def = parse_definition("def f(a, b, m = 1, *rest, z, k: 1, **kwrest, &blk)").unwrap();
    let sig = def.signature();
    assert_eq!(names(sig.requireds()), ["a", "b"]);
    assert_eq!(sig.optionals().len(), 1);
    assert_eq!(sig.rest(), Some("rest"));
    assert_eq!(names(sig.posts()), ["z"]);
    assert_eq!(sig.keywords().len(), 1);
    assert_eq!(sig.keyword_rest(), Some("kwrest"));
    // &blk never affects binding and has no slot
    assert_eq!(def.to_string(), "def f(a, b, m = 1, *rest, z, k: 1, **kwrest)");
}

// === Rejected shapes ===

#[test]
fn non_definition_statement_is_invalid() {
    let err = parse_definition("x = 1").unwrap_err();
    assert!(err.detail().contains("not a method definition"), "{err}");
    assert!(err.source().contains("x = 1"));
}

#[test]
fn broken_syntax_is_invalid() {
    assert!(parse_definition("def f(((").is_err());
    assert!(parse_definition("").is_err());
}
