use super::*;
use crate::dom::{Document, MemoryDocument};
use pretty_assertions::assert_eq;

fn page() -> MemoryDocument {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let a = doc.element(body, "div", &[("id", "a")]);
    doc.set_layout(a, Rect::new(100.0, 20.0, 200.0, 50.0));
    let b = doc.element(body, "div", &[("id", "b")]);
    doc.set_layout(b, Rect::new(300.0, 40.0, 100.0, 30.0));
    doc
}

fn slides() -> Vec<Slide> {
    vec![Slide::new("#a", "A").with_shortcut('x'), Slide::new("#b", "B")]
}

const MASK_B: &str = "polygon(0% 0%,0% 100%,38px 100%,38px 298px,142px 298px,\
                      142px 332px,38px 332px,38px 100%,100% 100%,100% 0%)";

#[test]
fn test_clip_path_traces_hole() {
    assert_eq!(clip_path(Rect::new(300.0, 40.0, 100.0, 30.0)), MASK_B);
    assert_eq!(
        clip_path(Rect::new(10.5, 0.0, 1.0, 1.0)),
        "polygon(0% 0%,0% 100%,-2px 100%,-2px 8.5px,3px 8.5px,3px 13.5px,\
         -2px 13.5px,-2px 100%,100% 100%,100% 0%)"
    );
}

#[test]
fn test_new_mounts_hidden_frame() {
    let mut doc = page();
    let presenter = Presenter::new(&mut doc, slides());

    assert_eq!(presenter.step(), 0);
    assert!(!presenter.is_visible(&doc));
    assert_eq!(doc.parent(presenter.frame()), doc.body());
    assert_eq!(doc.style(presenter.frame(), "z-index"), Some("1024"));
    assert_eq!(doc.listeners().count_for("presenter"), 2);
}

#[test]
fn test_next_saturates_at_last_slide() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());

    assert_eq!(presenter.next(&mut doc), 1);
    assert!(presenter.is_visible(&doc));
    assert_eq!(presenter.mask(&doc), Some(MASK_B));

    assert_eq!(presenter.next(&mut doc), 1);
    assert_eq!(presenter.current().map(|s| s.display_name.as_str()), Some("B"));
}

#[test]
fn test_previous_saturates_at_first_slide() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());

    assert_eq!(presenter.previous(&mut doc), 0);
    assert!(presenter.is_visible(&doc));
    assert!(presenter.mask(&doc).unwrap().contains("18px 98px"));
}

#[test]
fn test_clear_hides_and_rewinds() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.next(&mut doc);

    presenter.clear(&mut doc);
    assert!(presenter.slides().is_empty());
    assert_eq!(presenter.step(), 0);
    assert!(!presenter.is_visible(&doc));

    // Navigating with nothing to show keeps the frame hidden
    assert_eq!(presenter.next(&mut doc), 0);
    assert!(!presenter.is_visible(&doc));
}

#[test]
fn test_go_to_out_of_range_keeps_step() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.go_to(&mut doc, 1);

    assert_eq!(presenter.go_to(&mut doc, 2), 1);
    assert_eq!(presenter.go_to(&mut doc, -1), 1);
    assert!(presenter.is_visible(&doc));
    assert_eq!(presenter.mask(&doc), Some(MASK_B));

    assert_eq!(presenter.go_to(&mut doc, 0), 0);
}

#[test]
fn test_missing_target_keeps_previous_mask() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.go_to(&mut doc, 1);

    presenter.append(Slide::new("#gone", "Gone"));
    presenter.append(Slide::new("div[[", "Broken"));
    assert_eq!(presenter.next(&mut doc), 2);
    assert_eq!(presenter.mask(&doc), Some(MASK_B));
    assert_eq!(presenter.next(&mut doc), 3);
    assert_eq!(presenter.mask(&doc), Some(MASK_B));
}

#[test]
fn test_hand_written_selectors_get_a_spotlight() {
    let mut doc = page();
    let body = doc.body_node();
    let hidden = doc.element(body, "a", &[("class", "nav hidden"), ("href", "/faq")]);
    doc.set_layout(hidden, Rect::new(10.0, 10.0, 60.0, 20.0));
    let link = doc.element(body, "a", &[("class", "nav"), ("href", "/Docs")]);
    let rect = Rect::new(500.0, 60.0, 80.0, 24.0);
    doc.set_layout(link, rect);

    let slides = vec![
        Slide::new("a:not(.hidden)", "Negation"),
        Slide::new(r#"a[href="/docs" i]"#, "Case-insensitive"),
        Slide::new("body > :is(a, button):where(.nav):last-of-type", "Forgiving"),
    ];
    let mut presenter = Presenter::new(&mut doc, slides);

    for step in 0..3 {
        presenter.go_to(&mut doc, step);
        assert!(presenter.is_visible(&doc));
        assert_eq!(
            presenter.mask(&doc).map(str::to_string),
            Some(clip_path(rect)),
            "step {}",
            step
        );
    }
}

#[test]
fn test_mask_follows_live_layout() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.go_to(&mut doc, 1);

    doc.set_scroll(doc.root(), 0.0, 100.0);
    assert!(presenter.navigate(&mut doc));
    assert!(presenter.mask(&doc).unwrap().contains("38px 198px"));
}

#[test]
fn test_ctrl_shortcuts() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());

    let plain = presenter.handle_key(&mut doc, &KeyEvent::new("p", false));
    assert_eq!(plain, EventOutcome::ignored());
    assert!(!presenter.is_visible(&doc));

    let outcome = presenter.handle_key(&mut doc, &KeyEvent::ctrl("P"));
    assert_eq!(outcome, EventOutcome::prevent_default());
    assert!(presenter.is_visible(&doc));
    presenter.handle_key(&mut doc, &KeyEvent::ctrl("p"));
    assert!(!presenter.is_visible(&doc));

    presenter.handle_key(&mut doc, &KeyEvent::ctrl("."));
    assert_eq!(presenter.step(), 1);
    assert!(presenter.is_visible(&doc));
    presenter.handle_key(&mut doc, &KeyEvent::ctrl(","));
    assert_eq!(presenter.step(), 0);

    presenter.handle_key(&mut doc, &KeyEvent::ctrl("."));
    presenter.handle_key(&mut doc, &KeyEvent::ctrl("X"));
    assert_eq!(presenter.step(), 0);

    // Unbound keys are swallowed but change nothing
    presenter.handle_key(&mut doc, &KeyEvent::ctrl("z"));
    assert_eq!(presenter.step(), 0);
}

#[test]
fn test_first_matching_shortcut_wins() {
    let mut doc = page();
    let slides = vec![
        Slide::new("#a", "A"),
        Slide::new("#b", "B").with_shortcut('k'),
        Slide::new("#a", "A again").with_shortcut('k'),
    ];
    let mut presenter = Presenter::new(&mut doc, slides);

    presenter.handle_key(&mut doc, &KeyEvent::ctrl("k"));
    assert_eq!(presenter.step(), 1);
    assert_eq!(presenter.mask(&doc), Some(MASK_B));
}

#[test]
fn test_slide_list_mutations() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.append(Slide::new("#a", "C"));
    presenter.go_to(&mut doc, 2);

    assert_eq!(presenter.remove_at(&mut doc, 5), None);
    assert_eq!(presenter.slides().len(), 3);

    let removed = presenter.remove_at(&mut doc, 2).unwrap();
    assert_eq!(removed.display_name, "C");
    assert_eq!(presenter.step(), 1);

    presenter.replace_all(&mut doc, vec![Slide::new("#b", "Only")]);
    assert_eq!(presenter.step(), 0);
    assert_eq!(presenter.slides().len(), 1);
    assert!(presenter.is_visible(&doc));

    presenter.remove_at(&mut doc, 0);
    assert!(presenter.slides().is_empty());
    assert!(!presenter.is_visible(&doc));
}

#[test]
fn test_frame_click_hides() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());
    presenter.next(&mut doc);

    let a = doc.query_selector("#a").unwrap().unwrap();
    presenter.handle_frame_click(&mut doc, a);
    assert!(presenter.is_visible(&doc));

    let frame = presenter.frame();
    presenter.handle_frame_click(&mut doc, frame);
    assert!(!presenter.is_visible(&doc));
}

#[test]
fn test_dispose_detaches_everything() {
    let mut doc = page();
    let mut presenter = Presenter::new(&mut doc, slides());

    presenter.dispose(&mut doc);
    presenter.dispose(&mut doc);

    assert!(doc.listeners().is_empty());
    assert!(!doc.is_connected(presenter.frame()));
    assert_eq!(
        presenter.handle_key(&mut doc, &KeyEvent::ctrl("p")),
        EventOutcome::ignored()
    );
}
