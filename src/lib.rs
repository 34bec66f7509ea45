//! # webpresenter
#![allow(clippy::uninlined_format_args)]
//!
//! Pick elements on a web page, derive stable CSS selectors for them, and
//! replay them as a slideshow that spotlights one element at a time.
//!
//! The page-side components (selector resolver, box-model overlay, element
//! picker, presentation engine) are written against the [`dom::Document`]
//! traits. [`dom::MemoryDocument`] implements them over JSON page snapshots,
//! which is what the CLI works on.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Stable selector for the second match of "li"
//! webpresenter resolve page.json "li" --index 1
//!
//! # Pick an element, choose the broader candidate and store it as a slide
//! webpresenter pick page.json "#menu li" --choose 1 --name "Menu" --commit
//!
//! # Inspect the spotlight for slide 0
//! webpresenter present page.json --step 0
//!
//! # Manage stored slides
//! webpresenter slides list
//! webpresenter slides add "#intro" "Introduction" --shortcut i
//! webpresenter slides clear
//!
//! # Background service owning the store
//! webpresenter daemon run
//! webpresenter send '{"type": "CLEAR_SLIDES", "payload": {}}'
//! ```
//!
//! ## Library Usage
//!
//! ```
//! use webpresenter::dom::MemoryDocument;
//! use webpresenter::resolver::{fold_candidates, resolve_path};
//!
//! let mut doc = MemoryDocument::default();
//! let body = doc.body_node();
//! let list = doc.element(body, "ul", &[("id", "menu")]);
//! doc.element(list, "li", &[]);
//! let item = doc.element(list, "li", &[]);
//!
//! let candidates = fold_candidates(&resolve_path(&doc, item, None));
//! assert_eq!(candidates[0].selector, "li:nth-of-type(2)");
//! assert_eq!(candidates[1].selector, "#menu li:nth-of-type(2)");
//! ```

/// Document traits, the in-memory document and its selector engine
pub mod dom;

/// Geometry and slide types
pub mod types;

/// Element to CSS selector resolution
pub mod resolver;

/// Frame-aware box geometry
pub mod geometry;

/// Box-model highlight and tooltip
pub mod overlay;

/// Interactive element picker
pub mod picker;

/// Spotlight slideshow
pub mod presenter;

/// Cross-view message protocol
pub mod messaging;

/// Slide persistence
pub mod store;

/// Page-side message and event routing
pub mod host;

/// Background service over a local socket
pub mod daemon;

/// Exit-code carrying errors for the binary
pub mod errors;

pub use dom::{Document, DocumentMut, MemoryDocument, NodeId, Snapshot};
pub use host::ContentHost;
pub use messaging::{Ack, Request};
pub use picker::{PickerSession, PickerState, SlideDraft, TransitionError};
pub use presenter::Presenter;
pub use store::{JsonFileStore, MemoryStore, SlideStore};
pub use types::{OutputFormat, Rect, Slide};
