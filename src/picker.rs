//! Interactive element picking
//!
//! A [`PickerSession`] is created per activation. While inspecting it follows
//! the pointer with the overlay; a click resolves the clicked element into
//! nested candidate selectors which can then be previewed one by one and
//! committed as a slide. All listeners are held as [`Subscription`] guards, so
//! stopping the session detaches them in the same call.

use thiserror::Error;
use tracing::{debug, info};

use crate::dom::{
    DocumentMut, EventKind, EventOutcome, Phase, PointerEvent, PointerKind, Subscription,
};
use crate::overlay::Overlay;
use crate::resolver::{fold_candidates, resolve_path};
use crate::types::Slide;

const LISTENER_OWNER: &str = "picker";

/// Rejected picker transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("picker session has already ended")]
    Stopped,
    #[error("no element has been picked yet")]
    NoCandidates,
    #[error("candidate {index} is out of range ({len} available)")]
    CandidateOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerState {
    /// Session ended; no listeners or visuals remain
    Idle,
    /// Following the pointer, waiting for a click
    Inspecting,
    /// An element was clicked; `chosen` indexes `candidates`
    Previewing {
        candidates: Vec<String>,
        chosen: usize,
    },
}

/// Panel buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    Pick,
    Create,
    Quit,
}

/// Selector and name handed over on commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDraft {
    pub selector: String,
    pub display_name: String,
}

impl SlideDraft {
    pub fn into_slide(self) -> Slide {
        Slide::new(self.selector, self.display_name)
    }
}

/// Floating control panel with the specificity slider and buttons
#[derive(Debug)]
struct PickerPanel<N> {
    root: N,
    range: N,
    name_input: N,
    pick_button: N,
    create_button: N,
    quit_button: N,
}

impl<N: Copy + Eq> PickerPanel<N> {
    fn create<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D) -> Self {
        let root = doc.create_element("div");
        for (property, value) in [
            ("position", "fixed"),
            ("width", "300px"),
            ("height", "160px"),
            ("top", "20px"),
            ("right", "20px"),
            ("background", "white"),
            ("z-index", "200000"),
        ] {
            doc.set_style(root, property, value);
        }

        let range = doc.create_element("input");
        doc.set_attribute(range, "type", "range");
        doc.set_attribute(range, "min", "0");
        doc.set_attribute(range, "max", "30");
        doc.set_attribute(range, "value", "0");

        let name_input = doc.create_element("input");
        let name_row = doc.create_element("div");
        doc.append_child(name_row, name_input);

        let buttons = doc.create_element("div");
        let button = |doc: &mut D, label: &str| {
            let node = doc.create_element("button");
            doc.set_text(node, label);
            doc.append_child(buttons, node);
            node
        };
        let pick_button = button(doc, "Pick");
        let create_button = button(doc, "Create");
        let quit_button = button(doc, "Quit");

        doc.append_child(root, range);
        doc.append_child(root, name_row);
        doc.append_child(root, buttons);
        if let Some(body) = doc.body() {
            doc.append_child(body, root);
        }

        Self {
            root,
            range,
            name_input,
            pick_button,
            create_button,
            quit_button,
        }
    }

    fn action<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &D, target: N) -> Option<PanelAction> {
        [
            (self.pick_button, PanelAction::Pick),
            (self.create_button, PanelAction::Create),
            (self.quit_button, PanelAction::Quit),
        ]
        .into_iter()
        .find(|&(button, _)| doc.contains(button, target))
        .map(|(_, action)| action)
    }
}

/// One activation of the element picker
#[derive(Debug)]
pub struct PickerSession<N> {
    state: PickerState,
    overlay: Option<Overlay<N>>,
    panel: Option<PickerPanel<N>>,
    subscriptions: Vec<Subscription>,
    display_name: String,
}

impl<N: Copy + Eq> PickerSession<N> {
    /// Show the panel and start capturing clicks and hovers
    pub fn start<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D) -> Self {
        let panel = PickerPanel::create(doc);
        let listeners = doc.listeners();
        let subscriptions = vec![
            listeners.subscribe(EventKind::Click, Phase::Capture, LISTENER_OWNER),
            listeners.subscribe(EventKind::MouseOver, Phase::Capture, LISTENER_OWNER),
            listeners.subscribe(EventKind::Input, Phase::Bubble, LISTENER_OWNER),
        ];
        info!("Element picker started");

        Self {
            state: PickerState::Inspecting,
            overlay: Some(Overlay::new(doc)),
            panel: Some(panel),
            subscriptions,
            display_name: String::new(),
        }
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PickerState::Idle
    }

    pub fn is_inspecting(&self) -> bool {
        self.state == PickerState::Inspecting
    }

    /// Ranked candidates, most specific first; empty until something is clicked
    pub fn candidates(&self) -> &[String] {
        match &self.state {
            PickerState::Previewing { candidates, .. } => candidates,
            _ => &[],
        }
    }

    pub fn chosen(&self) -> Option<usize> {
        match &self.state {
            PickerState::Previewing { chosen, .. } => Some(*chosen),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Root node of the control panel while the session is active
    pub fn panel_root(&self) -> Option<N> {
        self.panel.as_ref().map(|panel| panel.root)
    }

    pub fn range_input(&self) -> Option<N> {
        self.panel.as_ref().map(|panel| panel.range)
    }

    /// Which panel button, if any, `target` belongs to
    pub fn panel_action<D: DocumentMut<Node = N> + ?Sized>(
        &self,
        doc: &D,
        target: N,
    ) -> Option<PanelAction> {
        self.panel.as_ref()?.action(doc, target)
    }

    fn in_panel<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &D, target: N) -> bool {
        self.panel
            .as_ref()
            .is_some_and(|panel| doc.contains(panel.root, target))
    }

    /// Capture-phase pointer handler
    pub fn handle_pointer<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
        event: PointerEvent<N>,
    ) -> EventOutcome {
        if self.subscriptions.is_empty() || self.in_panel(&*doc, event.target) {
            return EventOutcome::ignored();
        }

        match event.kind {
            PointerKind::Move => {
                if self.is_inspecting()
                    && let Some(overlay) = self.overlay.as_mut()
                {
                    overlay.inspect(doc, &[event.target], None);
                }
                EventOutcome::consumed()
            }
            PointerKind::Click => {
                if !self.is_inspecting() {
                    return EventOutcome::ignored();
                }
                self.capture(doc, event.target);
                EventOutcome::consumed()
            }
        }
    }

    fn capture<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D, target: N) {
        let path = resolve_path(&*doc, target, None);
        let candidates: Vec<String> = fold_candidates(&path)
            .into_iter()
            .map(|candidate| candidate.selector)
            .collect();

        if candidates.is_empty() {
            debug!("Clicked node produced no selector, still inspecting");
            return;
        }
        info!("Picked element with {} candidate(s)", candidates.len());

        if let Some(panel) = &self.panel {
            doc.set_attribute(panel.range, "max", &(candidates.len() - 1).to_string());
            doc.set_attribute(panel.range, "value", "0");
        }
        self.state = PickerState::Previewing {
            candidates,
            chosen: 0,
        };
        self.preview(doc);
    }

    /// Highlight whatever the chosen candidate currently matches
    fn preview<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) {
        let PickerState::Previewing { candidates, chosen } = &self.state else {
            return;
        };
        let selector = &candidates[*chosen];
        match doc.query_selector(selector) {
            Ok(Some(element)) => {
                if let Some(overlay) = self.overlay.as_mut() {
                    overlay.inspect(doc, &[element], None);
                }
            }
            Ok(None) => debug!("Candidate {:?} matches nothing", selector),
            Err(e) => debug!("Candidate {:?} failed to query: {}", selector, e),
        }
    }

    /// Move the specificity slider to `index` and preview that candidate
    pub fn select_candidate<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
        index: usize,
    ) -> Result<&str, TransitionError> {
        match &mut self.state {
            PickerState::Idle => return Err(TransitionError::Stopped),
            PickerState::Inspecting => return Err(TransitionError::NoCandidates),
            PickerState::Previewing { candidates, chosen } => {
                if index >= candidates.len() {
                    return Err(TransitionError::CandidateOutOfRange {
                        index,
                        len: candidates.len(),
                    });
                }
                *chosen = index;
            }
        }

        if let Some(panel) = &self.panel {
            doc.set_attribute(panel.range, "value", &index.to_string());
        }
        self.preview(doc);

        match &self.state {
            PickerState::Previewing { candidates, .. } => Ok(&candidates[index]),
            _ => Err(TransitionError::NoCandidates),
        }
    }

    pub fn set_display_name<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D, name: &str) {
        self.display_name = name.to_string();
        if let Some(panel) = &self.panel {
            doc.set_attribute(panel.name_input, "value", name);
        }
    }

    /// Go back to following the pointer
    pub fn pick_again(&mut self) -> Result<(), TransitionError> {
        if self.state == PickerState::Idle {
            return Err(TransitionError::Stopped);
        }
        self.state = PickerState::Inspecting;
        Ok(())
    }

    /// Hand over the chosen candidate and end the session
    pub fn commit<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
    ) -> Result<SlideDraft, TransitionError> {
        let draft = match &self.state {
            PickerState::Idle => return Err(TransitionError::Stopped),
            PickerState::Inspecting => return Err(TransitionError::NoCandidates),
            PickerState::Previewing { candidates, chosen } => SlideDraft {
                selector: candidates[*chosen].clone(),
                display_name: self.display_name.clone(),
            },
        };
        info!("Committing slide {:?}", draft.selector);
        self.stop(doc);
        Ok(draft)
    }

    /// Detach listeners and remove every visual; safe to repeat
    pub fn stop<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) {
        let was_active = self.is_active();
        self.subscriptions.clear();
        if let Some(mut overlay) = self.overlay.take() {
            overlay.remove(doc);
        }
        if let Some(panel) = self.panel.take() {
            doc.remove_node(panel.root);
        }
        self.state = PickerState::Idle;
        if was_active {
            info!("Element picker stopped");
        }
    }
}

#[cfg(test)]
#[path = "picker_test.rs"]
mod picker_test;
