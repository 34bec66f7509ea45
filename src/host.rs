//! Page-side owner of the presenter and the active picker session

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::dom::{DocumentMut, EventOutcome, KeyEvent, PointerEvent, PointerKind};
use crate::messaging::{Ack, Request};
use crate::picker::{PanelAction, PickerSession, TransitionError};
use crate::presenter::Presenter;
use crate::types::Slide;

pub struct ContentHost<D: DocumentMut> {
    doc: D,
    presenter: Presenter<D::Node>,
    picker: Option<PickerSession<D::Node>>,
    outbox: UnboundedSender<Request>,
}

impl<D: DocumentMut> ContentHost<D> {
    /// Take over `doc`, mounting the presenter with the stored `slides`
    ///
    /// Committed slides are announced as `CREATE_SLIDE` on `outbox`.
    pub fn new(mut doc: D, slides: Vec<Slide>, outbox: UnboundedSender<Request>) -> Self {
        let presenter = Presenter::new(&mut doc, slides);
        Self {
            doc,
            presenter,
            picker: None,
            outbox,
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn presenter(&self) -> &Presenter<D::Node> {
        &self.presenter
    }

    pub fn picker(&self) -> Option<&PickerSession<D::Node>> {
        self.picker.as_ref()
    }

    pub fn is_presenting(&self) -> bool {
        self.presenter.is_visible(&self.doc)
    }

    /// Apply one request; every request is acknowledged
    pub fn handle_message(&mut self, request: Request) -> Ack {
        debug!("Handling {}", request.kind());
        match request {
            Request::StartElementPicker => self.start_picker(),
            Request::StopElementPicker => self.quit_picker(),
            Request::GoSlide { step } => {
                self.presenter.go_to(&mut self.doc, step);
            }
            Request::UpdateSlide { slides } => self.presenter.replace_all(&mut self.doc, slides),
            Request::ClearSlides => self.presenter.clear(&mut self.doc),
            Request::CreateSlide(slide) => self.presenter.append(slide),
        }
        Ack::default()
    }

    /// Start a fresh picker session, ending any running one
    pub fn start_picker(&mut self) {
        self.quit_picker();
        self.picker = Some(PickerSession::start(&mut self.doc));
    }

    pub fn quit_picker(&mut self) {
        if let Some(mut picker) = self.picker.take() {
            picker.stop(&mut self.doc);
        }
    }

    /// Dispatch a pointer event: picker first, then the presentation frame
    pub fn handle_pointer(&mut self, event: PointerEvent<D::Node>) -> EventOutcome {
        if let Some(picker) = self.picker.as_mut() {
            if event.kind == PointerKind::Click
                && let Some(action) = picker.panel_action(&self.doc, event.target)
            {
                self.panel_action(action);
                return EventOutcome::ignored();
            }

            let outcome = picker.handle_pointer(&mut self.doc, event);
            if outcome.propagation_stopped {
                return outcome;
            }
        }

        if event.kind == PointerKind::Click {
            return self.presenter.handle_frame_click(&mut self.doc, event.target);
        }
        EventOutcome::ignored()
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> EventOutcome {
        self.presenter.handle_key(&mut self.doc, event)
    }

    fn panel_action(&mut self, action: PanelAction) {
        let result = match action {
            PanelAction::Pick => self.pick_again(),
            PanelAction::Create => self.commit().map(|_| ()),
            PanelAction::Quit => {
                self.quit_picker();
                Ok(())
            }
        };
        if let Err(e) = result {
            debug!("Panel action {:?} rejected: {}", action, e);
        }
    }

    pub fn pick_again(&mut self) -> Result<(), TransitionError> {
        self.picker
            .as_mut()
            .ok_or(TransitionError::Stopped)?
            .pick_again()
    }

    /// Preview candidate `index`, as moving the specificity slider does
    pub fn select_candidate(&mut self, index: usize) -> Result<String, TransitionError> {
        let picker = self.picker.as_mut().ok_or(TransitionError::Stopped)?;
        picker
            .select_candidate(&mut self.doc, index)
            .map(str::to_string)
    }

    pub fn set_display_name(&mut self, name: &str) -> Result<(), TransitionError> {
        let picker = self.picker.as_mut().ok_or(TransitionError::Stopped)?;
        picker.set_display_name(&mut self.doc, name);
        Ok(())
    }

    /// Commit the chosen candidate as a new slide and announce it
    pub fn commit(&mut self) -> Result<Slide, TransitionError> {
        let picker = self.picker.as_mut().ok_or(TransitionError::Stopped)?;
        let slide = picker.commit(&mut self.doc)?.into_slide();
        self.picker = None;

        self.presenter.append(slide.clone());
        if self.outbox.send(Request::CreateSlide(slide.clone())).is_err() {
            warn!("Slide {:?} created but nobody is listening", slide.selector);
        }
        info!("Created slide {:?}", slide.selector);
        Ok(slide)
    }
}

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;
