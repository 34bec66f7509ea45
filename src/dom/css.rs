//! Selector parsing and matching for [`MemoryDocument`]
//!
//! Parsing and matching are done by the `selectors` crate. This module
//! supplies the glue: a [`selectors::Element`] view of arena nodes, the
//! string types `selectors` is generic over, and the handful of
//! non-structural pseudo-classes a captured page can answer.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use cssparser::{
    CowRcStr, ParseError, Parser as CssParser, ParserInput, SourceLocation, ToCss,
    serialize_identifier, serialize_string,
};
use precomputed_hash::PrecomputedHash;
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::matching::{
    ElementSelectorFlags, IgnoreNthChildForInvalidation, MatchingContext, MatchingMode,
    NeedsSelectorFlags, QuirksMode, matches_selector,
};
use selectors::parser::{ParseRelative, SelectorParseErrorKind};
use selectors::{NthIndexCache, OpaqueElement};
use thiserror::Error;

use super::Document;
use super::memory::{MemoryDocument, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid selector {selector:?} at {line}:{column}: {reason}")]
    Invalid {
        selector: String,
        line: u32,
        column: u32,
        reason: String,
    },
}

impl SelectorError {
    fn invalid(selector: &str, err: ParseError<'_, SelectorParseErrorKind<'_>>) -> Self {
        SelectorError::Invalid {
            selector: selector.to_string(),
            line: err.location.line,
            column: err.location.column,
            reason: format!("{:?}", err.kind),
        }
    }
}

type Result<T> = std::result::Result<T, SelectorError>;

/// A parsed, comma-separated selector list
pub struct SelectorList {
    source: String,
    parsed: selectors::parser::SelectorList<PageSelectors>,
}

impl fmt::Debug for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SelectorList").field(&self.source).finish()
    }
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        if selector.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut input = ParserInput::new(selector);
        let mut parser = CssParser::new(&mut input);
        let parsed = selectors::parser::SelectorList::parse(
            &PageSelectorParser,
            &mut parser,
            ParseRelative::No,
        )
        .map_err(|err| SelectorError::invalid(selector, err))?;

        Ok(Self {
            source: selector.to_string(),
            parsed,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches any selector in the list, relative to `scope`
    pub fn matches(&self, doc: &MemoryDocument, scope: NodeId, node: NodeId) -> bool {
        if !doc.is_element(node) {
            return false;
        }
        let mut nth_index_cache = NthIndexCache::default();
        let mut context = scoped_context(doc, scope, &mut nth_index_cache);
        self.matches_in(&MemoryElement::new(doc, node), &mut context)
    }

    fn matches_in(
        &self,
        element: &MemoryElement<'_>,
        context: &mut MatchingContext<'_, PageSelectors>,
    ) -> bool {
        self.parsed
            .0
            .iter()
            .any(|selector| matches_selector(selector, 0, None, element, context))
    }
}

/// Element descendants of `scope` matching `selector`, in tree order
pub fn select_all(doc: &MemoryDocument, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
    let list = SelectorList::parse(selector)?;
    let mut nth_index_cache = NthIndexCache::default();
    let mut context = scoped_context(doc, scope, &mut nth_index_cache);

    let mut matched = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(scope).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if doc.is_element(node) && list.matches_in(&MemoryElement::new(doc, node), &mut context) {
            matched.push(node);
        }
        stack.extend(doc.children(node).into_iter().rev());
    }

    Ok(matched)
}

/// `:scope` is the scope element, or the root element for a document scope
fn scoped_context<'a>(
    doc: &MemoryDocument,
    scope: NodeId,
    nth_index_cache: &'a mut NthIndexCache,
) -> MatchingContext<'a, PageSelectors> {
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        nth_index_cache,
        QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        IgnoreNthChildForInvalidation::No,
    );
    if doc.is_element(scope) {
        context.scope_element = Some(doc.opaque(scope));
    }
    context
}

/// Serialize `value` as a CSS identifier, as CSSOM `CSS.escape()` does
pub fn css_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    // Writing into a String cannot fail
    let _ = serialize_identifier(value, &mut out);
    out
}

/// Element view of one arena node
#[derive(Clone, Copy)]
pub struct MemoryElement<'a> {
    doc: &'a MemoryDocument,
    node: NodeId,
}

impl fmt::Debug for MemoryElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryElement")
            .field("node", &self.node)
            .field("tag", &self.doc.local_name(self.node))
            .finish()
    }
}

impl<'a> MemoryElement<'a> {
    pub fn new(doc: &'a MemoryDocument, node: NodeId) -> Self {
        Self { doc, node }
    }

    fn with(&self, node: NodeId) -> Self {
        Self::new(self.doc, node)
    }

    fn element(&self, node: Option<NodeId>) -> Option<Self> {
        node.filter(|&n| self.doc.is_element(n)).map(|n| self.with(n))
    }

    fn is(&self, tag: &str) -> bool {
        self.doc
            .local_name(self.node)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.doc.attribute(self.node, name).is_some()
    }

    fn is_form_control(&self) -> bool {
        ["button", "input", "select", "textarea", "option", "optgroup", "fieldset"]
            .iter()
            .any(|tag| self.is(tag))
    }
}

impl selectors::Element for MemoryElement<'_> {
    type Impl = PageSelectors;

    fn opaque(&self) -> OpaqueElement {
        self.doc.opaque(self.node)
    }

    fn parent_element(&self) -> Option<Self> {
        self.element(self.doc.parent(self.node))
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let mut current = self.doc.previous_sibling(self.node);
        while let Some(sibling) = current {
            if self.doc.is_element(sibling) {
                return Some(self.with(sibling));
            }
            current = self.doc.previous_sibling(sibling);
        }
        None
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.doc.parent(self.node)?;
        let next = self
            .doc
            .children(parent)
            .into_iter()
            .skip_while(|&child| child != self.node)
            .skip(1)
            .find(|&child| self.doc.is_element(child));
        next.map(|n| self.with(n))
    }

    fn first_element_child(&self) -> Option<Self> {
        let first = self
            .doc
            .children(self.node)
            .into_iter()
            .find(|&child| self.doc.is_element(child));
        first.map(|n| self.with(n))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        true
    }

    fn has_local_name(&self, local_name: &str) -> bool {
        self.is(local_name)
    }

    fn has_namespace(&self, _ns: &CssIdent) -> bool {
        true
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (
            self.doc.local_name(self.node),
            other.doc.local_name(other.node),
        ) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssIdent>,
        local_name: &CssIdent,
        operation: &AttrSelectorOperation<&AttrValue>,
    ) -> bool {
        // Attributes live in the null namespace only
        if let NamespaceConstraint::Specific(url) = ns
            && !url.0.is_empty()
        {
            return false;
        }
        self.doc
            .attribute(self.node, &local_name.0)
            .is_some_and(|value| operation.eval_str(value))
    }

    fn match_non_ts_pseudo_class(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<'_, PageSelectors>,
    ) -> bool {
        match pc {
            PseudoClass::Link | PseudoClass::AnyLink => selectors::Element::is_link(self),
            PseudoClass::Checked => {
                ((self.is("input") || self.is("option")) && self.has_attribute("checked"))
                    || (self.is("option") && self.has_attribute("selected"))
            }
            PseudoClass::Disabled => self.is_form_control() && self.has_attribute("disabled"),
            PseudoClass::Enabled => self.is_form_control() && !self.has_attribute("disabled"),
            PseudoClass::Visited
            | PseudoClass::Hover
            | PseudoClass::Active
            | PseudoClass::Focus
            | PseudoClass::FocusWithin
            | PseudoClass::FocusVisible => false,
        }
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<'_, PageSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        (self.is("a") || self.is("area") || self.is("link")) && self.has_attribute("href")
    }

    fn is_html_slot_element(&self) -> bool {
        self.is("slot")
    }

    fn has_id(&self, id: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.doc
            .attribute(self.node, "id")
            .is_some_and(|value| same_ident(value, &id.0, case_sensitivity))
    }

    fn has_class(&self, name: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.doc.attribute(self.node, "class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| same_ident(class, &name.0, case_sensitivity))
        })
    }

    fn imported_part(&self, _name: &CssIdent) -> Option<CssIdent> {
        None
    }

    fn is_part(&self, _name: &CssIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.doc.children(self.node).into_iter().all(|child| {
            !self.doc.is_element(child) && self.doc.text(child).is_none_or(str::is_empty)
        })
    }

    fn is_root(&self) -> bool {
        self.doc
            .parent(self.node)
            .is_some_and(|parent| !self.doc.is_element(parent))
    }
}

fn same_ident(a: &str, b: &str, case_sensitivity: CaseSensitivity) -> bool {
    match case_sensitivity {
        CaseSensitivity::CaseSensitive => a == b,
        CaseSensitivity::AsciiCaseInsensitive => a.eq_ignore_ascii_case(b),
    }
}

/// Identifiers, local names and namespace parts of a parsed selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CssIdent(pub String);

impl From<&str> for CssIdent {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for CssIdent {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssIdent {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_identifier(&self.0, dest)
    }
}

impl PrecomputedHash for CssIdent {
    fn precomputed_hash(&self) -> u32 {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish() as u32
    }
}

/// Attribute selector values, compared as plain strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrValue(pub String);

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for AttrValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for AttrValue {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_string(&self.0, dest)
    }
}

#[derive(Debug, Clone)]
pub struct PageSelectors;

impl selectors::SelectorImpl for PageSelectors {
    type ExtraMatchingData<'a> = ();
    type AttrValue = AttrValue;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespacePrefix = CssIdent;
    type NamespaceUrl = CssIdent;
    type BorrowedNamespaceUrl = CssIdent;
    type BorrowedLocalName = str;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

struct PageSelectorParser;

impl<'i> selectors::parser::Parser<'i> for PageSelectorParser {
    type Impl = PageSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }

    fn parse_non_ts_pseudo_class(
        &self,
        location: SourceLocation,
        name: CowRcStr<'i>,
    ) -> std::result::Result<PseudoClass, ParseError<'i, SelectorParseErrorKind<'i>>> {
        match PseudoClass::from_name(&name) {
            Some(pseudo) => Ok(pseudo),
            None => Err(location
                .new_custom_error(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(name))),
        }
    }
}

/// Pseudo-classes that depend on element state rather than tree position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Link,
    AnyLink,
    Visited,
    Hover,
    Active,
    Focus,
    FocusWithin,
    FocusVisible,
    Checked,
    Disabled,
    Enabled,
}

impl PseudoClass {
    const ALL: [(&'static str, PseudoClass); 11] = [
        ("link", PseudoClass::Link),
        ("any-link", PseudoClass::AnyLink),
        ("visited", PseudoClass::Visited),
        ("hover", PseudoClass::Hover),
        ("active", PseudoClass::Active),
        ("focus", PseudoClass::Focus),
        ("focus-within", PseudoClass::FocusWithin),
        ("focus-visible", PseudoClass::FocusVisible),
        ("checked", PseudoClass::Checked),
        ("disabled", PseudoClass::Disabled),
        ("enabled", PseudoClass::Enabled),
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, pseudo)| pseudo)
    }

    fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|&&(_, pseudo)| pseudo == self)
            .map_or("", |&(name, _)| name)
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        dest.write_char(':')?;
        dest.write_str(self.name())
    }
}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = PageSelectors;

    fn is_active_or_hover(&self) -> bool {
        matches!(self, PseudoClass::Active | PseudoClass::Hover)
    }

    fn is_user_action_state(&self) -> bool {
        matches!(
            self,
            PseudoClass::Active
                | PseudoClass::Hover
                | PseudoClass::Focus
                | PseudoClass::FocusWithin
                | PseudoClass::FocusVisible
        )
    }
}

/// No pseudo-elements are supported; they never match page nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoElement {}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = PageSelectors;
}

#[cfg(test)]
#[path = "css_test.rs"]
mod css_test;
