use super::*;
use crate::dom::{MemoryDocument, NodeId};
use pretty_assertions::assert_eq;

fn fixture() -> (MemoryDocument, Vec<NodeId>) {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let nav = doc.element(body, "nav", &[("id", "top"), ("class", "menu main")]);
    let first = doc.element(nav, "a", &[("href", "/docs?page=2"), ("class", "item")]);
    doc.append_text(nav, " | ");
    let second = doc.element(nav, "a", &[("href", "/faq"), ("class", "item active")]);
    let list = doc.element(body, "ul", &[("lang", "en-US")]);
    let li1 = doc.element(list, "li", &[]);
    let li2 = doc.element(list, "li", &[]);
    let li3 = doc.element(list, "li", &[("data-x", "say \"hi\"")]);
    (doc, vec![nav, first, second, list, li1, li2, li3])
}

fn select(doc: &MemoryDocument, selector: &str) -> Vec<NodeId> {
    doc.query_selector_all(doc.root(), selector).unwrap()
}

#[test]
fn test_simple_selectors() {
    let (doc, n) = fixture();

    assert_eq!(select(&doc, "#top"), vec![n[0]]);
    assert_eq!(select(&doc, "a"), vec![n[1], n[2]]);
    assert_eq!(select(&doc, "A.item"), vec![n[1], n[2]]);
    assert_eq!(select(&doc, ".active.item"), vec![n[2]]);
    assert_eq!(select(&doc, "*").len(), 10);
    assert_eq!(select(&doc, "nav, ul"), vec![n[0], n[3]]);
}

#[test]
fn test_attribute_matchers() {
    let (doc, n) = fixture();

    assert_eq!(select(&doc, "[href]"), vec![n[1], n[2]]);
    assert_eq!(select(&doc, r#"[href="/faq"]"#), vec![n[2]]);
    assert_eq!(select(&doc, r#"[href^="/docs"]"#), vec![n[1]]);
    assert_eq!(select(&doc, r#"[href$='=2']"#), vec![n[1]]);
    assert_eq!(select(&doc, r#"[href*="oc"]"#), vec![n[1]]);
    assert_eq!(select(&doc, "[class~=active]"), vec![n[2]]);
    assert_eq!(select(&doc, r#"[lang|="en"]"#), vec![n[3]]);
    assert_eq!(select(&doc, r#"[data-x="say \"hi\""]"#), vec![n[6]]);
    // Empty values never match the substring operators
    assert!(select(&doc, r#"[href^=""]"#).is_empty());
}

#[test]
fn test_combinators() {
    let (doc, n) = fixture();

    assert_eq!(select(&doc, "body a"), vec![n[1], n[2]]);
    assert_eq!(select(&doc, "nav > a.active"), vec![n[2]]);
    assert_eq!(select(&doc, "body > a"), Vec::<NodeId>::new());
    assert_eq!(select(&doc, "li + li"), vec![n[5], n[6]]);
    assert_eq!(select(&doc, "nav ~ ul"), vec![n[3]]);
    // Text between siblings is skipped by `+`
    assert_eq!(select(&doc, "a+a"), vec![n[2]]);
}

#[test]
fn test_structural_pseudo_classes() {
    let (doc, n) = fixture();

    assert_eq!(select(&doc, "li:first-child"), vec![n[4]]);
    assert_eq!(select(&doc, "li:last-child"), vec![n[6]]);
    assert_eq!(select(&doc, "li:nth-of-type(2)"), vec![n[5]]);
    assert_eq!(select(&doc, "li:nth-child(odd)"), vec![n[4], n[6]]);
    assert_eq!(select(&doc, "li:nth-child(2n)"), vec![n[5]]);
    assert_eq!(select(&doc, "li:nth-child(-n+2)"), vec![n[4], n[5]]);
    assert_eq!(select(&doc, "a:first-of-type"), vec![n[1]]);
    assert_eq!(select(&doc, "a:last-of-type"), vec![n[2]]);
}

#[test]
fn test_scope_queries() {
    let (doc, n) = fixture();

    let children = doc.query_selector_all(n[0], ":scope > .item").unwrap();
    assert_eq!(children, vec![n[1], n[2]]);

    // The scope itself is never part of the result
    let none = doc.query_selector_all(n[0], ":scope").unwrap();
    assert!(none.is_empty());

    // With the document as scope, `:scope` is the root element
    let html = doc.query_selector_all(doc.root(), ":scope").unwrap();
    assert_eq!(html, vec![doc.html()]);
    let body = doc.query_selector_all(doc.root(), ":scope > body").unwrap();
    assert_eq!(body, vec![doc.body_node()]);
}

#[test]
fn test_single_node_matching() {
    let (doc, n) = fixture();
    let list = SelectorList::parse(":scope > a.active, li:last-child").unwrap();

    assert_eq!(list.source(), ":scope > a.active, li:last-child");
    assert!(list.matches(&doc, n[0], n[2]));
    assert!(!list.matches(&doc, n[3], n[2]));
    assert!(list.matches(&doc, doc.root(), n[6]));
    assert!(!list.matches(&doc, doc.root(), n[0]));
}

#[test]
fn test_selectors_accepted_by_browsers() {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let link = doc.element(body, "a", &[("class", "nav"), ("href", "/Docs")]);
    let hidden = doc.element(body, "a", &[("class", "nav hidden")]);
    let empty = doc.element(body, "p", &[]);
    let input = doc.element(body, "input", &[("type", "checkbox"), ("checked", "")]);
    let off = doc.element(body, "button", &[("disabled", "")]);

    assert_eq!(select(&doc, "a:not(.hidden)"), vec![link]);
    assert_eq!(select(&doc, r#"a[href="/docs" i]"#), vec![link]);
    assert_eq!(select(&doc, ":is(a)"), vec![link, hidden]);
    assert_eq!(select(&doc, "a:where(.nav):not([href])"), vec![hidden]);
    assert_eq!(select(&doc, "p:empty"), vec![empty]);
    assert_eq!(select(&doc, ":root"), vec![doc.html()]);
    assert_eq!(select(&doc, "a:link"), vec![link]);
    assert_eq!(select(&doc, ":checked"), vec![input]);
    assert_eq!(select(&doc, ":disabled"), vec![off]);
    assert_eq!(select(&doc, "input:enabled"), vec![input]);
    // User-action states parse but never match a captured page
    assert!(select(&doc, "a:hover, a:focus-visible").is_empty());
}

#[test]
fn test_escaped_identifiers() {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let digits = doc.element(body, "div", &[("id", "123")]);
    let odd = doc.element(body, "div", &[("class", "a.b:c")]);
    let unicode = doc.element(body, "div", &[("id", "héllo wörld")]);

    let selector = format!("#{}", css_escape("123"));
    assert_eq!(selector, "#\\31 23");
    assert_eq!(select(&doc, &selector), vec![digits]);

    let selector = format!(".{}", css_escape("a.b:c"));
    assert_eq!(selector, ".a\\.b\\:c");
    assert_eq!(select(&doc, &selector), vec![odd]);

    let selector = format!("#{}", css_escape("héllo wörld"));
    assert_eq!(select(&doc, &selector), vec![unicode]);
}

#[test]
fn test_css_escape_rules() {
    assert_eq!(css_escape("plain-name_1"), "plain-name_1");
    assert_eq!(css_escape("-"), "\\-");
    assert_eq!(css_escape("-1x"), "-\\31 x");
    assert_eq!(css_escape("a\u{1}b"), "a\\1 b");
    assert_eq!(css_escape("a\0"), "a\u{FFFD}");
    assert_eq!(css_escape("a b"), "a\\ b");
    assert_eq!(css_escape("ünï"), "ünï");
}

#[test]
fn test_invalid_selectors() {
    assert!(matches!(SelectorList::parse("  "), Err(SelectorError::Empty)));

    let err = SelectorList::parse("div >").unwrap_err();
    assert!(matches!(err, SelectorError::Invalid { line: 0, .. }));
    assert!(err.to_string().starts_with("invalid selector \"div >\""));

    for selector in ["#123", "a:bogus", "li:nth-of-type(x)", "a,,b", "a::before", "{}"] {
        assert!(
            SelectorList::parse(selector).is_err(),
            "{:?} should be rejected",
            selector
        );
    }

    let mut doc = MemoryDocument::default();
    doc.element(doc.body_node(), "a", &[]);
    assert!(doc.query_selector_all(doc.root(), "a:bogus").is_err());
}
