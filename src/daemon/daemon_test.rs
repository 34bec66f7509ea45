use super::*;
use crate::store::{JsonFileStore, MemoryStore};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ack() -> DaemonResponse {
    DaemonResponse::Ack(Ack::default())
}

#[test]
fn test_request_wire_format() {
    let request = DaemonRequest::Message(Request::GoSlide { step: 1 });
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({ "Message": { "type": "GO_SLIDE", "payload": { "step": 1 } } })
    );

    assert_eq!(serde_json::to_string(&DaemonRequest::Ping).unwrap(), "\"Ping\"");
    assert_eq!(
        serde_json::to_value(ack()).unwrap(),
        json!({ "Ack": {} })
    );
}

#[test]
fn test_store_messages_mutate_slides() {
    let store = MemoryStore::default();

    let response = Daemon::handle_request(
        &store,
        DaemonRequest::Message(Request::CreateSlide(Slide::new("#a", "A"))),
    );
    assert_eq!(response, ack());
    Daemon::handle_request(
        &store,
        DaemonRequest::Message(Request::CreateSlide(Slide::new("#b", "B"))),
    );
    assert_eq!(
        Daemon::handle_request(&store, DaemonRequest::GetSlides),
        DaemonResponse::Slides(vec![Slide::new("#a", "A"), Slide::new("#b", "B")])
    );

    Daemon::handle_request(
        &store,
        DaemonRequest::Message(Request::UpdateSlide {
            slides: vec![Slide::new("#b", "B").with_shortcut('b')],
        }),
    );
    assert_eq!(
        store.get().unwrap(),
        vec![Slide::new("#b", "B").with_shortcut('b')]
    );

    Daemon::handle_request(&store, DaemonRequest::Message(Request::ClearSlides));
    assert!(store.get().unwrap().is_empty());
}

#[test]
fn test_page_messages_are_acknowledged_only() {
    let store = MemoryStore::new(vec![Slide::new("#a", "A")]);

    for message in [
        Request::StartElementPicker,
        Request::StopElementPicker,
        Request::GoSlide { step: 4 },
    ] {
        assert_eq!(
            Daemon::handle_request(&store, DaemonRequest::Message(message)),
            ack()
        );
    }
    assert_eq!(store.get().unwrap().len(), 1);
    assert_eq!(
        Daemon::handle_request(&store, DaemonRequest::Ping),
        DaemonResponse::Pong
    );
}

struct BrokenStore;

impl SlideStore for BrokenStore {
    fn get(&self) -> Result<Vec<Slide>> {
        anyhow::bail!("disk unavailable")
    }

    fn set(&self, _slides: &[Slide]) -> Result<()> {
        anyhow::bail!("disk unavailable")
    }
}

#[test]
fn test_store_failures_become_error_responses() {
    let response = Daemon::handle_request(&BrokenStore, DaemonRequest::GetSlides);
    assert_eq!(response, DaemonResponse::Error("disk unavailable".to_string()));

    let response =
        Daemon::handle_request(&BrokenStore, DaemonRequest::Message(Request::ClearSlides));
    assert!(matches!(response, DaemonResponse::Error(_)));
}

#[test]
fn test_socket_path_is_named_after_the_crate() {
    let path = Daemon::get_socket_path().unwrap();
    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("webpresenter-daemon.sock")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_keep_every_slide() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("slides.json");
    let daemon = Daemon::new(JsonFileStore::new(&path));

    let mut tasks = Vec::new();
    for client in 0..8 {
        let store = daemon.store();
        tasks.push(tokio::spawn(async move {
            for i in 0..20 {
                let slide = Slide::new(format!("#c{}-{}", client, i), "S");
                let response =
                    Daemon::dispatch(&store, DaemonRequest::Message(Request::CreateSlide(slide)))
                        .await;
                assert_eq!(response, ack());
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let response = Daemon::dispatch(&daemon.store(), DaemonRequest::GetSlides).await;
    let slides = match response {
        DaemonResponse::Slides(slides) => slides,
        other => panic!("expected slides, got {:?}", other),
    };
    assert_eq!(slides.len(), 160);
    assert_eq!(JsonFileStore::new(&path).get().unwrap(), slides);
}
