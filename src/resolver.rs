//! Selector synthesis for picked elements
//!
//! [`resolve_selector`] describes one element relative to its parent, falling
//! back from id to classes to a tag-specific attribute and finally to the tag
//! name plus `:nth-of-type`. [`resolve_path`] repeats that for every ancestor
//! and [`fold_candidates`] turns the path into nested descendant selectors.

use tracing::debug;
use url::Url;

use crate::dom::{Document, css_escape};

/// Attribute values longer than this are cut before matching with `^=`
pub const MAX_ATTRIBUTE_LENGTH: usize = 256;

/// One level of an element's ancestor chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment<N> {
    pub element: N,
    pub selector: String,
}

/// A nested selector and the ancestor level it was built up to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<N> {
    pub element: N,
    pub selector: String,
}

/// Derive a selector for `node` that is unique among its parent's children
///
/// Returns an empty string for non-element nodes, or for root-level elements
/// that carry no id, class or usable attribute.
pub fn resolve_selector<D: Document + ?Sized>(doc: &D, node: D::Node) -> String {
    let Some(local_name) = doc.local_name(node) else {
        return String::new();
    };
    let tag = css_escape(local_name);

    let mut selector = match doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        Some(id) => format!("#{}", css_escape(id)),
        None => doc
            .class_list(node)
            .iter()
            .rev()
            .map(|class| format!(".{}", css_escape(class)))
            .collect(),
    };

    if selector.is_empty()
        && let Some((name, value)) = attribute_hint(doc, node, local_name)
        && let Some(fragment) = attribute_fragment(doc, node, name, &value)
    {
        selector = fragment;
    }

    let Some(parent) = doc.parent(node) else {
        return selector;
    };

    if selector.is_empty() || count_children(doc, parent, &selector) > 1 {
        selector = format!("{}{}", tag, selector);
    }

    if count_children(doc, parent, &selector) > 1 {
        let mut index = 1;
        let mut current = doc.previous_sibling(node);
        while let Some(sibling) = current {
            if doc.local_name(sibling) == Some(local_name) {
                index += 1;
            }
            current = doc.previous_sibling(sibling);
        }
        selector.push_str(&format!(":nth-of-type({})", index));
    }

    selector
}

/// Selectors for `node` and each ancestor below `stop`, nearest first
///
/// `stop` defaults to the document body. Levels that produce no selector are
/// skipped. When the outermost selector still matches several elements under
/// the body, a final `body` segment anchors the chain.
pub fn resolve_path<D: Document + ?Sized>(
    doc: &D,
    node: D::Node,
    stop: Option<D::Node>,
) -> Vec<PathSegment<D::Node>> {
    let stop = stop.or_else(|| doc.body());
    let mut path = Vec::new();
    let mut current = node;

    loop {
        if Some(current) == stop {
            break;
        }
        let selector = resolve_selector(doc, current);
        if !selector.is_empty() {
            path.push(PathSegment {
                element: current,
                selector,
            });
        }
        match doc.parent(current) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    if let (Some(outermost), Some(body)) = (path.last(), doc.body()) {
        // Drops what is assumed to be a two-character tag prefix
        let stripped: String = outermost.selector.chars().skip(2).collect();
        if count_matches(doc, body, &stripped) > 1 {
            path.push(PathSegment {
                element: body,
                selector: "body".to_string(),
            });
        }
    }

    path
}

/// Fold a nearest-first path into nested candidates, most specific first
///
/// Candidate `k` is the selector of path level `k` followed by candidate
/// `k - 1`, so each entry extends the previous one by one ancestor.
pub fn fold_candidates<N: Copy>(path: &[PathSegment<N>]) -> Vec<Candidate<N>> {
    let mut candidates: Vec<Candidate<N>> = Vec::with_capacity(path.len());
    for segment in path {
        let selector = match candidates.last() {
            Some(previous) => format!("{} {}", segment.selector, previous.selector),
            None => segment.selector.clone(),
        };
        candidates.push(Candidate {
            element: segment.element,
            selector,
        });
    }
    candidates
}

/// Tag-specific attribute worth matching on, with its normalized value
fn attribute_hint<D: Document + ?Sized>(
    doc: &D,
    node: D::Node,
    local_name: &str,
) -> Option<(&'static str, String)> {
    match local_name {
        "a" => {
            let href = doc.attribute(node, "href")?.trim();
            let href = href.split_once('?').map_or(href, |(head, _)| head);
            (!href.is_empty()).then(|| ("href", href.to_string()))
        }
        "img" | "iframe" => {
            let src = doc.attribute(node, "src").map(str::trim).unwrap_or("");
            if !src.is_empty() {
                let value: String = normalize_src(src)
                    .chars()
                    .take(MAX_ATTRIBUTE_LENGTH)
                    .collect();
                return Some(("src", value));
            }
            doc.attribute(node, "alt")
                .filter(|alt| !alt.is_empty())
                .map(|alt| ("alt", alt.to_string()))
        }
        _ => None,
    }
}

/// Drop `data:` payloads and `blob:` paths
fn normalize_src(src: &str) -> String {
    if src.starts_with("data:") {
        if let Some(pos) = src.find(',') {
            return src[..=pos].to_string();
        }
        return src.to_string();
    }

    if let Some(inner) = src.strip_prefix("blob:") {
        return match Url::parse(inner) {
            Ok(mut url) => {
                url.set_path("");
                format!("blob:{}", url)
            }
            Err(e) => {
                debug!("Keeping unparsable blob URL {:?}: {}", src, e);
                src.to_string()
            }
        };
    }

    src.to_string()
}

/// `[name="value"]`, `[name^="value"]` or `[name*="value"]` against the live attribute
fn attribute_fragment<D: Document + ?Sized>(
    doc: &D,
    node: D::Node,
    name: &str,
    value: &str,
) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let actual = doc.attribute(node, name)?;
    let quoted = escape_quotes(value);

    let op = if actual == value {
        "="
    } else if actual.starts_with(value) {
        "^="
    } else {
        "*="
    };
    Some(format!("[{}{}\"{}\"]", name, op, quoted))
}

/// Backslash every `"` that is not already escaped
fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous = None;
    for c in value.chars() {
        if c == '"' && previous != Some('\\') {
            out.push('\\');
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

fn count_children<D: Document + ?Sized>(doc: &D, parent: D::Node, selector: &str) -> usize {
    count_matches(doc, parent, &format!(":scope > {}", selector))
}

/// Number of matches under `scope`; query failures count as none
fn count_matches<D: Document + ?Sized>(doc: &D, scope: D::Node, selector: &str) -> usize {
    match doc.query_selector_all(scope, selector) {
        Ok(matches) => matches.len(),
        Err(e) => {
            debug!("Selector query failed, treating as no match: {}", e);
            0
        }
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod resolver_test;
