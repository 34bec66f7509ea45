//! Slide playback with a full-page spotlight mask
//!
//! The presenter keeps the ordered slides and the current step. Each step
//! looks the slide's selector up again and cuts a hole into a dimmed,
//! full-viewport frame over the element it finds.

use tracing::{debug, info};

use crate::dom::{DocumentMut, EventKind, EventOutcome, KeyEvent, Phase, Subscription};
use crate::overlay::px;
use crate::types::{Rect, Slide};

/// Gap between the target's border box and the edge of the hole
pub const SPOTLIGHT_OFFSET: f64 = 2.0;

const LISTENER_OWNER: &str = "presenter";

pub const TOGGLE_KEY: &str = "p";
pub const NEXT_KEY: &str = ".";
pub const PREVIOUS_KEY: &str = ",";

/// Clip path covering the viewport except for a hole around `target`
pub fn clip_path(target: Rect) -> String {
    let hole = target.outset(SPOTLIGHT_OFFSET);
    let left = px(hole.left);
    let top = px(hole.top);
    let right = px(hole.right());
    let bottom = px(hole.bottom());

    let points = [
        "0% 0%".to_string(),
        "0% 100%".to_string(),
        format!("{} 100%", left),
        format!("{} {}", left, top),
        format!("{} {}", right, top),
        format!("{} {}", right, bottom),
        format!("{} {}", left, bottom),
        format!("{} 100%", left),
        "100% 100%".to_string(),
        "100% 0%".to_string(),
    ];
    format!("polygon({})", points.join(","))
}

#[derive(Debug)]
pub struct Presenter<N> {
    step: usize,
    slides: Vec<Slide>,
    frame: N,
    subscriptions: Vec<Subscription>,
}

impl<N: Copy + Eq> Presenter<N> {
    /// Mount the (hidden) frame and listen for shortcuts and frame clicks
    pub fn new<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D, slides: Vec<Slide>) -> Self {
        let frame = doc.create_element("div");
        for (property, value) in [
            ("display", "none"),
            ("z-index", "1024"),
            ("inset", "0px"),
            ("position", "fixed"),
            ("background", "rgba(0, 0, 0, 0.6)"),
            ("transition", "clip-path 0.5s"),
        ] {
            doc.set_style(frame, property, value);
        }
        if let Some(body) = doc.body() {
            doc.append_child(body, frame);
        }

        let listeners = doc.listeners();
        let subscriptions = vec![
            listeners.subscribe(EventKind::KeyDown, Phase::Bubble, LISTENER_OWNER),
            listeners.subscribe(EventKind::Click, Phase::Bubble, LISTENER_OWNER),
        ];
        info!("Presenter ready with {} slide(s)", slides.len());

        Self {
            step: 0,
            slides,
            frame,
            subscriptions,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn current(&self) -> Option<&Slide> {
        self.slides.get(self.step)
    }

    pub fn frame(&self) -> N {
        self.frame
    }

    pub fn is_visible<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &D) -> bool {
        doc.is_connected(self.frame) && doc.style(self.frame, "display") != Some("none")
    }

    /// Clip path currently applied to the frame
    pub fn mask<'a, D: DocumentMut<Node = N> + ?Sized>(&self, doc: &'a D) -> Option<&'a str> {
        doc.style(self.frame, "clip-path")
    }

    pub fn show<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) {
        if doc.style(self.frame, "display") == Some("none") {
            doc.set_style(self.frame, "display", "");
        }
    }

    pub fn hide<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) {
        if doc.style(self.frame, "display") != Some("none") {
            doc.set_style(self.frame, "display", "none");
        }
    }

    pub fn toggle<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) {
        if doc.style(self.frame, "display") == Some("none") {
            self.show(doc);
        } else {
            self.hide(doc);
        }
    }

    /// Replace every slide and rewind to the first one
    pub fn replace_all<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D, slides: Vec<Slide>) {
        self.step = 0;
        self.slides = slides;
        if self.slides.is_empty() {
            self.hide(doc);
        }
    }

    pub fn append(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Remove the slide at `index`; out-of-range indices are ignored
    pub fn remove_at<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
        index: usize,
    ) -> Option<Slide> {
        if index >= self.slides.len() {
            return None;
        }
        let removed = self.slides.remove(index);
        if self.slides.is_empty() {
            self.step = 0;
            self.hide(doc);
        } else if self.step >= self.slides.len() {
            self.step = self.slides.len() - 1;
        }
        Some(removed)
    }

    pub fn clear<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) {
        self.step = 0;
        self.slides.clear();
        self.hide(doc);
    }

    /// Advance one slide, saturating at the last one
    pub fn next<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) -> usize {
        if self.step + 1 < self.slides.len() {
            self.step += 1;
        }
        self.show(doc);
        self.navigate(doc);
        self.step
    }

    /// Go back one slide, saturating at the first one
    pub fn previous<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) -> usize {
        self.step = self.step.saturating_sub(1);
        self.show(doc);
        self.navigate(doc);
        self.step
    }

    /// Jump to `step`; out-of-range values keep the current step
    pub fn go_to<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D, step: i64) -> usize {
        match usize::try_from(step) {
            Ok(step) if step < self.slides.len() => self.step = step,
            _ => debug!("Ignoring out-of-range step {}", step),
        }
        self.show(doc);
        self.navigate(doc);
        self.step
    }

    /// Re-resolve the current slide and move the spotlight onto it
    ///
    /// Returns whether the mask was updated. With no slides there is nothing
    /// to show, so the frame is hidden instead.
    pub fn navigate<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) -> bool {
        let Some(slide) = self.current() else {
            self.hide(doc);
            return false;
        };

        let target = match doc.query_selector(&slide.selector) {
            Ok(Some(target)) => target,
            Ok(None) => {
                debug!("Slide {} target {:?} not found", self.step, slide.selector);
                return false;
            }
            Err(e) => {
                debug!("Slide {} selector {:?} is invalid: {}", self.step, slide.selector, e);
                return false;
            }
        };

        let mask = clip_path(doc.bounding_client_rect(target));
        doc.set_style(self.frame, "clip-path", &mask);
        true
    }

    /// Ctrl shortcuts: toggle, next, previous, or jump by slide shortcut
    pub fn handle_key<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
        event: &KeyEvent,
    ) -> EventOutcome {
        if !event.ctrl || self.subscriptions.is_empty() {
            return EventOutcome::ignored();
        }

        let key = event.key.to_lowercase();
        match key.as_str() {
            TOGGLE_KEY => self.toggle(doc),
            NEXT_KEY => {
                self.next(doc);
            }
            PREVIOUS_KEY => {
                self.previous(doc);
            }
            _ => {
                let index = self.slides.iter().position(|slide| {
                    slide.shortcut.is_some_and(|c| c.to_string() == key)
                });
                if let Some(index) = index {
                    self.show(doc);
                    self.step = index;
                    self.navigate(doc);
                }
            }
        }

        EventOutcome::prevent_default()
    }

    /// Clicking the dimmed frame dismisses it
    pub fn handle_frame_click<D: DocumentMut<Node = N> + ?Sized>(
        &self,
        doc: &mut D,
        target: N,
    ) -> EventOutcome {
        if !self.subscriptions.is_empty() && doc.contains(self.frame, target) {
            self.hide(doc);
        }
        EventOutcome::ignored()
    }

    /// Detach listeners and remove the frame; safe to repeat
    pub fn dispose<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) {
        self.subscriptions.clear();
        doc.remove_node(self.frame);
    }
}

#[cfg(test)]
#[path = "presenter_test.rs"]
mod presenter_test;
