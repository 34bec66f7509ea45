//! Box geometry across nested frames

use crate::dom::Document;
use crate::types::{BoxModel, BoxSides, Rect};

/// Border box of `node` relative to the viewport of `boundary`
///
/// `boundary` is the iframe whose content viewport the result is expressed
/// in; `None` means the top-level window. Every frame crossed on the way up
/// contributes its own client rect plus its top/left border width, and each
/// frame's client rect already reflects its document's scroll offset.
pub fn bounding_rect<D: Document + ?Sized>(doc: &D, node: D::Node, boundary: Option<D::Node>) -> Rect {
    let mut rect = doc.bounding_client_rect(node);
    let mut current = node;

    while let Some(frame) = doc.owner_frame(current) {
        if Some(frame) == boundary {
            break;
        }
        let frame_rect = doc.bounding_client_rect(frame);
        let border = sides(doc, frame, "border", "-width");
        rect = rect.translate(frame_rect.left + border.left, frame_rect.top + border.top);
        current = frame;
    }

    rect
}

/// Margin, border and padding widths from the resolved style
pub fn dimensions<D: Document + ?Sized>(doc: &D, node: D::Node) -> BoxModel {
    BoxModel {
        margin: sides(doc, node, "margin", ""),
        border: sides(doc, node, "border", "-width"),
        padding: sides(doc, node, "padding", ""),
    }
}

fn sides<D: Document + ?Sized>(doc: &D, node: D::Node, prefix: &str, suffix: &str) -> BoxSides {
    let read = |side: &str| {
        doc.computed_style(node, &format!("{}-{}{}", prefix, side, suffix))
            .map_or(0.0, |value| parse_pixels(&value))
    };
    BoxSides {
        top: read("top"),
        right: read("right"),
        bottom: read("bottom"),
        left: read("left"),
    }
}

/// Leading number of a CSS length such as `"12.5px"`; anything else is 0
pub fn parse_pixels(value: &str) -> f64 {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(value.len(), |(i, _)| i);
    value[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;
