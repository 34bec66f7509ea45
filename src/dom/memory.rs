//! Arena-backed document used for snapshots, the CLI and tests

use std::collections::{BTreeMap, HashMap};

use selectors::OpaqueElement;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::css::{self, SelectorError};
use super::events::ListenerRegistry;
use super::{Document, DocumentMut};
use crate::types::{Point, Rect, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document {
        scroll: Point,
        frame_owner: Option<NodeId>,
    },
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, Default)]
struct ElementData {
    local_name: String,
    attrs: Vec<(String, String)>,
    inline_style: Vec<(String, String)>,
    computed: HashMap<String, String>,
    /// Border box relative to the owning document's origin
    layout: Option<Rect>,
    content_document: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// In-memory document tree with author-supplied layout
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    root: NodeId,
    html: NodeId,
    body: NodeId,
    viewport: Viewport,
    listeners: ListenerRegistry,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl MemoryDocument {
    /// Create a document holding `<html><head></head><body></body></html>`
    pub fn new(viewport: Viewport) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            html: NodeId(0),
            body: NodeId(0),
            viewport,
            listeners: ListenerRegistry::new(),
        };
        let (root, html, body) = doc.create_document(None);
        doc.root = root;
        doc.html = html;
        doc.body = body;
        doc.set_scroll(root, viewport.scroll_x, viewport.scroll_y);
        doc
    }

    /// Build a document from a captured page snapshot
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut doc = Self::new(snapshot.viewport);
        let body = doc.body;
        doc.apply_snapshot(body, &snapshot.body);
        debug!("Loaded snapshot with {} nodes", doc.nodes.len());
        doc
    }

    fn create_document(&mut self, frame_owner: Option<NodeId>) -> (NodeId, NodeId, NodeId) {
        let root = self.push_node(NodeKind::Document {
            scroll: Point::default(),
            frame_owner,
        });
        let html = self.create_element("html");
        let head = self.create_element("head");
        let body = self.create_element("body");
        self.append_child(root, html);
        self.append_child(html, head);
        self.append_child(html, body);
        (root, html, body)
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Identity of `id` during selector matching, stable while the document is borrowed
    pub(super) fn opaque(&self, id: NodeId) -> OpaqueElement {
        match self.node(id) {
            Some(node) => OpaqueElement::new(node),
            None => OpaqueElement::new(self),
        }
    }

    fn element_data(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_data_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn body_node(&self) -> NodeId {
        self.body
    }

    /// Create an element with attributes and append it to `parent`
    pub fn element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attribute(node, name, value);
        }
        self.append_child(parent, node);
        node
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.push_node(NodeKind::Text(text.to_string()));
        self.append_child(parent, node);
        node
    }

    /// Set the border box of `node` relative to its document origin
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        if let Some(data) = self.element_data_mut(node) {
            data.layout = Some(rect);
        }
    }

    pub fn set_computed_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(data) = self.element_data_mut(node) {
            data.computed.insert(property.to_string(), value.to_string());
        }
    }

    /// Give an iframe element its own content document; returns that document's body
    pub fn attach_frame(&mut self, iframe: NodeId) -> NodeId {
        if let Some(existing) = self
            .element_data(iframe)
            .and_then(|data| data.content_document)
        {
            if let Some(body) = self.document_body(existing) {
                return body;
            }
        }
        let (root, _, body) = self.create_document(Some(iframe));
        if let Some(data) = self.element_data_mut(iframe) {
            data.content_document = Some(root);
        }
        body
    }

    pub fn content_document(&self, iframe: NodeId) -> Option<NodeId> {
        self.element_data(iframe)?.content_document
    }

    /// Scroll offset of a document node (top-level or frame)
    pub fn set_scroll(&mut self, document: NodeId, x: f64, y: f64) {
        if let Some(node) = self.nodes.get_mut(document.0)
            && let NodeKind::Document { scroll, .. } = &mut node.kind
        {
            *scroll = Point { x, y };
        }
        if document == self.root {
            self.viewport.scroll_x = x;
            self.viewport.scroll_y = y;
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Concatenated text of `node` and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.text(current) {
                out.push_str(text);
            }
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }

    fn document_body(&self, document: NodeId) -> Option<NodeId> {
        let html = self
            .children(document)
            .into_iter()
            .find(|&n| self.local_name(n) == Some("html"))?;
        self.children(html)
            .into_iter()
            .find(|&n| self.local_name(n) == Some("body"))
    }

    /// Top of the tree `node` belongs to, if that is a document node
    fn owning_document(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        match self.node(current)?.kind {
            NodeKind::Document { .. } => Some(current),
            _ => None,
        }
    }

    fn document_scroll(&self, document: NodeId) -> Point {
        match self.node(document).map(|n| &n.kind) {
            Some(NodeKind::Document { scroll, .. }) => *scroll,
            _ => Point::default(),
        }
    }

    fn apply_snapshot(&mut self, element: NodeId, snapshot: &ElementSnapshot) {
        for (name, value) in &snapshot.attrs {
            self.set_attribute(element, name, value);
        }
        for (property, value) in &snapshot.style {
            self.set_computed_style(element, property, value);
        }
        if let Some(rect) = snapshot.rect {
            self.set_layout(element, rect);
        }

        for child in &snapshot.children {
            match child {
                NodeSnapshot::Text(text) => {
                    self.append_text(element, text);
                }
                NodeSnapshot::Element(child) => {
                    let node = self.create_element(&child.tag);
                    self.append_child(element, node);
                    self.apply_snapshot(node, child);
                }
            }
        }

        if let Some(frame) = &snapshot.frame {
            let body = self.attach_frame(element);
            self.apply_snapshot(body, &frame.body);
            if let Some(document) = self.content_document(element) {
                self.set_scroll(document, frame.scroll_x, frame.scroll_y);
            }
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn document_element(&self) -> Option<NodeId> {
        Some(self.html)
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.node(self.node(node)?.parent?)?;
        let index = parent.children.iter().position(|&c| c == node)?;
        index.checked_sub(1).map(|i| parent.children[i])
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.element_data(node).is_some()
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.element_data(node).map(|data| data.local_name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element_data(node)?
            .attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn query_selector_all(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, SelectorError> {
        css::select_all(self, scope, selector)
    }

    fn bounding_client_rect(&self, node: NodeId) -> Rect {
        let Some(layout) = self.element_data(node).and_then(|data| data.layout) else {
            return Rect::default();
        };
        match self.owning_document(node) {
            Some(document) => {
                let scroll = self.document_scroll(document);
                layout.translate(-scroll.x, -scroll.y)
            }
            None => Rect::default(),
        }
    }

    fn computed_style(&self, node: NodeId, property: &str) -> Option<String> {
        let data = self.element_data(node)?;
        data.inline_style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.clone())
            .or_else(|| data.computed.get(property).cloned())
    }

    fn owner_frame(&self, node: NodeId) -> Option<NodeId> {
        let document = self.owning_document(node)?;
        match self.node(document)?.kind {
            NodeKind::Document { frame_owner, .. } => frame_owner,
            _ => None,
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl DocumentMut for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(ElementData {
            local_name: tag.to_string(),
            ..ElementData::default()
        }))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return;
        }
        if self.contains(child, parent) {
            debug!("Refusing to append {:?} inside its own subtree", child);
            return;
        }
        self.remove_node(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn remove_node(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.nodes[node.0].parent = None;
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(data) = self.element_data_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        match data.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attrs.push((name, value.to_string())),
        }
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(data) = self.element_data_mut(node) else {
            return;
        };
        match data.inline_style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data
                .inline_style
                .push((property.to_string(), value.to_string())),
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element_data(node)?
            .inline_style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let children = self.children(node);
        for child in children {
            self.remove_node(child);
        }
        if !text.is_empty() {
            self.append_text(node, text);
        }
    }

    fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }
}

/// Serialized page capture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub viewport: Viewport,
    /// Contents of `<body>`; its own `tag` is ignored
    pub body: ElementSnapshot,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementSnapshot {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Border box relative to the owning document's origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    /// Computed style declarations, e.g. `"margin-top": "8px"`
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Box<FrameSnapshot>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSnapshot {
    Text(String),
    Element(ElementSnapshot),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    pub body: ElementSnapshot,
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;
