use super::*;
use crate::dom::MemoryDocument;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_pixels() {
    assert_eq!(parse_pixels("12px"), 12.0);
    assert_eq!(parse_pixels(" -4.5px "), -4.5);
    assert_eq!(parse_pixels("0"), 0.0);
    assert_eq!(parse_pixels("auto"), 0.0);
    assert_eq!(parse_pixels(""), 0.0);
    assert_eq!(parse_pixels("1.2.3px"), 0.0);
}

#[test]
fn test_dimensions_reads_each_side() {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let node = doc.element(body, "div", &[]);
    doc.set_computed_style(node, "margin-top", "8px");
    doc.set_computed_style(node, "margin-left", "auto");
    doc.set_computed_style(node, "border-bottom-width", "2px");
    doc.set_computed_style(node, "padding-right", "4.5px");

    let dims = dimensions(&doc, node);
    assert_eq!(dims.margin, BoxSides { top: 8.0, ..BoxSides::default() });
    assert_eq!(dims.border.bottom, 2.0);
    assert_eq!(dims.padding.right, 4.5);
    assert_eq!(dims.padding.left, 0.0);
}

#[test]
fn test_top_level_rect_is_client_rect() {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    let node = doc.element(body, "div", &[]);
    doc.set_layout(node, Rect::new(120.0, 10.0, 50.0, 40.0));
    doc.set_scroll(doc.root(), 0.0, 100.0);

    assert_eq!(bounding_rect(&doc, node, None), Rect::new(20.0, 10.0, 50.0, 40.0));
}

#[test]
fn test_nested_frames_accumulate_offsets() {
    let mut doc = MemoryDocument::default();
    let body = doc.body_node();
    doc.set_scroll(doc.root(), 0.0, 100.0);

    let outer = doc.element(body, "iframe", &[]);
    doc.set_layout(outer, Rect::new(300.0, 50.0, 600.0, 400.0));
    doc.set_computed_style(outer, "border-top-width", "3px");
    doc.set_computed_style(outer, "border-left-width", "3px");
    let outer_body = doc.attach_frame(outer);

    let inner = doc.element(outer_body, "iframe", &[]);
    doc.set_layout(inner, Rect::new(10.0, 20.0, 200.0, 100.0));
    let inner_body = doc.attach_frame(inner);
    if let Some(document) = doc.content_document(inner) {
        doc.set_scroll(document, 0.0, 20.0);
    }

    let target = doc.element(inner_body, "p", &[]);
    doc.set_layout(target, Rect::new(40.0, 10.0, 100.0, 30.0));

    // Client rect inside the innermost document
    assert_eq!(
        bounding_rect(&doc, target, Some(inner)),
        Rect::new(20.0, 10.0, 100.0, 30.0)
    );
    // Relative to the outer frame's viewport
    assert_eq!(
        bounding_rect(&doc, target, Some(outer)),
        Rect::new(30.0, 30.0, 100.0, 30.0)
    );
    // Relative to the top window: 20 + 10 + (200 + 3), 10 + 20 + (50 + 3)
    assert_eq!(
        bounding_rect(&doc, target, None),
        Rect::new(233.0, 83.0, 100.0, 30.0)
    );
}
