// Picker to store to presentation, through the public library API
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::mpsc;

use webpresenter::daemon::{Daemon, DaemonRequest, DaemonResponse};
use webpresenter::dom::{KeyEvent, MemoryDocument, PointerEvent, Snapshot};
use webpresenter::{Ack, ContentHost, DocumentMut, JsonFileStore, Request, Slide, SlideStore};

mod common;

fn page() -> MemoryDocument {
    let snapshot: Snapshot = serde_json::from_value(common::page_snapshot()).unwrap();
    MemoryDocument::from_snapshot(&snapshot)
}

fn locate(doc: &MemoryDocument, selector: &str, index: usize) -> webpresenter::NodeId {
    use webpresenter::Document;
    doc.query_selector_all(doc.root(), selector).unwrap()[index]
}

#[tokio::test]
async fn test_picked_slides_are_stored_and_presented() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("slides.json"));
    store.initialize().unwrap();

    // Page side: pick the intro section and the "About" link
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let doc = page();
    let intro = locate(&doc, "section", 0);
    let link = locate(&doc, "a", 0);
    let mut host = ContentHost::new(doc, store.get().unwrap(), outbox);

    assert_eq!(host.handle_message(Request::StartElementPicker), Ack::default());
    host.handle_pointer(PointerEvent::hover(intro));
    host.handle_pointer(PointerEvent::click(intro));
    host.set_display_name("Welcome").unwrap();
    host.commit().unwrap();

    host.start_picker();
    host.handle_pointer(PointerEvent::click(link));
    assert_eq!(
        host.select_candidate(2).unwrap(),
        "#menu li:nth-of-type(2) [href^=\"/about\"]"
    );
    host.set_display_name("About").unwrap();
    host.commit().unwrap();

    // Background side: apply what the page announced
    while let Some(request) = inbox.recv().await {
        let response = Daemon::handle_request(&store, DaemonRequest::Message(request));
        assert_eq!(response, DaemonResponse::Ack(Ack::default()));
        if store.get().unwrap().len() == 2 {
            break;
        }
    }

    let stored = store.get().unwrap();
    assert_eq!(
        stored,
        vec![
            Slide::new("#intro", "Welcome"),
            Slide::new("#menu li:nth-of-type(2) [href^=\"/about\"]", "About"),
        ]
    );

    // A fresh page presents the stored slides
    let (outbox, _inbox) = mpsc::unbounded_channel();
    let mut viewer = ContentHost::new(page(), stored, outbox);
    viewer.handle_message(Request::GoSlide { step: 0 });
    assert!(viewer.is_presenting());

    viewer.handle_key(&KeyEvent::ctrl("."));
    assert_eq!(viewer.presenter().step(), 1);
    assert_eq!(
        viewer.presenter().current().map(|s| s.display_name.as_str()),
        Some("About")
    );

    viewer.handle_message(Request::ClearSlides);
    assert!(!viewer.is_presenting());
}

#[test]
fn test_stop_message_tears_down_picker() {
    let (outbox, _inbox) = mpsc::unbounded_channel();
    let mut host = ContentHost::new(page(), vec![], outbox);

    host.handle_message(Request::StartElementPicker);
    assert!(host.picker().is_some());
    assert_eq!(host.handle_message(Request::StopElementPicker), Ack::default());
    assert!(host.picker().is_none());
    assert_eq!(host.document().listeners().count_for("picker"), 0);
}
