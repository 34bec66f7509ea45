//! Document abstraction shared by the resolver, overlay, picker and presenter
//!
//! Components never own nodes. They borrow a [`Document`] for the duration of
//! one call and re-query it on the next, since the page may have changed in
//! between.

use std::fmt;
use std::hash::Hash;

use crate::types::{Rect, Viewport};

pub mod css;
pub mod events;
pub mod memory;

pub use css::{SelectorError, css_escape};
pub use events::{
    EventKind, EventOutcome, KeyEvent, ListenerRegistry, Phase, PointerEvent, PointerKind,
    Subscription,
};
pub use memory::{MemoryDocument, NodeId, Snapshot};

/// Read access to a live document tree
pub trait Document {
    /// Opaque handle to a node
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// The document node itself (parent of `<html>`)
    fn root(&self) -> Self::Node;

    fn document_element(&self) -> Option<Self::Node>;

    fn body(&self) -> Option<Self::Node>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Previous sibling of any node type, text included
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn is_element(&self, node: Self::Node) -> bool;

    /// Local tag name, `None` for non-element nodes
    fn local_name(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Class tokens in DOM order without duplicates
    fn class_list(&self, node: Self::Node) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        if let Some(raw) = self.attribute(node, "class") {
            for token in raw.split_ascii_whitespace() {
                if !classes.iter().any(|c| c == token) {
                    classes.push(token.to_string());
                }
            }
        }
        classes
    }

    /// Element descendants of `scope` matching `selector`, in document order
    fn query_selector_all(
        &self,
        scope: Self::Node,
        selector: &str,
    ) -> Result<Vec<Self::Node>, SelectorError>;

    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>, SelectorError> {
        Ok(self
            .query_selector_all(self.root(), selector)?
            .into_iter()
            .next())
    }

    /// Border box relative to the viewport of the node's own (sub-)document
    fn bounding_client_rect(&self, node: Self::Node) -> Rect;

    fn computed_style(&self, node: Self::Node, property: &str) -> Option<String>;

    /// The iframe element whose content document holds `node`
    fn owner_frame(&self, node: Self::Node) -> Option<Self::Node>;

    fn viewport(&self) -> Viewport;

    /// Whether `node` sits inside the tree rooted at [`Document::root`]
    fn is_connected(&self, node: Self::Node) -> bool {
        let root = self.root();
        let mut current = Some(node);
        while let Some(n) = current {
            if n == root {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Write access used to mount overlay visuals and UI panels
pub trait DocumentMut: Document {
    fn create_element(&mut self, tag: &str) -> Self::Node;

    /// Append `child` to `parent`, detaching it from any previous parent
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    /// Detach `node` from its parent. No-op when already detached.
    fn remove_node(&mut self, node: Self::Node);

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn set_style(&mut self, node: Self::Node, property: &str, value: &str);

    fn style(&self, node: Self::Node, property: &str) -> Option<&str>;

    fn set_text(&mut self, node: Self::Node, text: &str);

    fn listeners(&self) -> &ListenerRegistry;
}
