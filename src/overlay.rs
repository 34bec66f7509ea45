//! Highlight rectangles and the name/size tooltip drawn over inspected elements

use tracing::debug;

use crate::dom::DocumentMut;
use crate::geometry::{bounding_rect, dimensions};
use crate::types::{BoxModel, BoxSides, Point, Rect, Size};

pub const CONTENT_COLOR: &str = "rgba(120, 170, 210, 0.7)";
pub const PADDING_COLOR: &str = "rgba(77, 200, 0, 0.3)";
pub const MARGIN_COLOR: &str = "rgba(255, 155, 0, 0.3)";
pub const BORDER_COLOR: &str = "rgba(255, 200, 50, 0.3)";

const Z_INDEX: &str = "10000000";

/// Gap kept between the tooltip, its target and the bounds edges
pub const TIP_MARGIN: f64 = 5.0;

/// Smallest tooltip size assumed when placing it
pub const MIN_TIP_SIZE: Size = Size {
    width: 60.0,
    height: 20.0,
};

/// Result of one [`Overlay::inspect`] call
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub label: String,
    /// Union of the inspected margin boxes
    pub outer: Rect,
    pub tip: Point,
}

/// Four nested boxes: margin, border, padding and content
#[derive(Debug)]
struct OverlayRect<N> {
    node: N,
    border: N,
    padding: N,
    content: N,
}

impl<N: Copy> OverlayRect<N> {
    fn create<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D, container: N) -> Self {
        let node = doc.create_element("div");
        let border = doc.create_element("div");
        let padding = doc.create_element("div");
        let content = doc.create_element("div");

        doc.set_style(border, "border-color", BORDER_COLOR);
        doc.set_style(padding, "border-color", PADDING_COLOR);
        doc.set_style(content, "background-color", CONTENT_COLOR);
        doc.set_style(node, "border-color", MARGIN_COLOR);
        doc.set_style(node, "pointer-events", "none");
        doc.set_style(node, "position", "fixed");
        doc.set_style(node, "z-index", Z_INDEX);

        doc.append_child(node, border);
        doc.append_child(border, padding);
        doc.append_child(padding, content);
        doc.append_child(container, node);

        Self {
            node,
            border,
            padding,
            content,
        }
    }

    fn update<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D, rect: Rect, dims: &BoxModel) {
        box_wrap(doc, self.node, &dims.margin);
        box_wrap(doc, self.border, &dims.border);
        box_wrap(doc, self.padding, &dims.padding);

        let height = rect.height - dims.border.vertical() - dims.padding.vertical();
        let width = rect.width - dims.border.horizontal() - dims.padding.horizontal();
        doc.set_style(self.content, "height", &px(height));
        doc.set_style(self.content, "width", &px(width));

        doc.set_style(self.node, "top", &px(rect.top - dims.margin.top));
        doc.set_style(self.node, "left", &px(rect.left - dims.margin.left));
    }

    fn remove<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) {
        doc.remove_node(self.node);
    }
}

#[derive(Debug)]
struct OverlayTip<N> {
    tip: N,
    name_span: N,
    dim_span: N,
}

impl<N: Copy> OverlayTip<N> {
    fn create<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D, container: N) -> Self {
        let tip = doc.create_element("div");
        for (property, value) in [
            ("display", "flex"),
            ("flex-flow", "row nowrap"),
            ("background-color", "#333740"),
            ("border-radius", "2px"),
            ("font-weight", "bold"),
            ("padding", "3px 5px"),
            ("pointer-events", "none"),
            ("position", "fixed"),
            ("font-size", "12px"),
            ("white-space", "nowrap"),
            ("z-index", Z_INDEX),
        ] {
            doc.set_style(tip, property, value);
        }

        let name_span = doc.create_element("span");
        doc.set_style(name_span, "color", "#ee78e6");
        doc.set_style(name_span, "border-right", "1px solid #aaaaaa");
        doc.set_style(name_span, "padding-right", "0.5rem");
        doc.set_style(name_span, "margin-right", "0.5rem");
        doc.append_child(tip, name_span);

        let dim_span = doc.create_element("span");
        doc.set_style(dim_span, "color", "#d7d7d7");
        doc.append_child(tip, dim_span);

        doc.append_child(container, tip);
        Self {
            tip,
            name_span,
            dim_span,
        }
    }

    fn update_text<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D, name: &str, size: Size) {
        doc.set_text(self.name_span, name);
        doc.set_text(
            self.dim_span,
            &format!("{}px × {}px", size.width.round(), size.height.round()),
        );
    }

    fn update_position<D: DocumentMut<Node = N> + ?Sized>(
        &self,
        doc: &mut D,
        target: Rect,
        bounds: Rect,
    ) -> Point {
        let measured = doc.bounding_client_rect(self.tip);
        let position = place_tip(
            target,
            bounds,
            Size {
                width: measured.width,
                height: measured.height,
            },
        );
        doc.set_style(self.tip, "top", &px(position.y));
        doc.set_style(self.tip, "left", &px(position.x));
        position
    }
}

/// Highlighter owning one rectangle per inspected element plus a tooltip
#[derive(Debug)]
pub struct Overlay<N> {
    container: N,
    tip: OverlayTip<N>,
    rects: Vec<OverlayRect<N>>,
}

impl<N: Copy + Eq> Overlay<N> {
    /// Build the overlay visuals and mount them in the document body
    pub fn new<D: DocumentMut<Node = N> + ?Sized>(doc: &mut D) -> Self {
        let container = doc.create_element("div");
        doc.set_style(container, "z-index", Z_INDEX);
        let tip = OverlayTip::create(doc, container);
        let overlay = Self {
            container,
            tip,
            rects: Vec::new(),
        };
        overlay.mount(doc);
        overlay
    }

    fn mount<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &mut D) {
        if doc.parent(self.container).is_none()
            && let Some(body) = doc.body()
        {
            doc.append_child(body, self.container);
        }
    }

    /// Number of highlight rectangles currently in the pool
    pub fn rect_count(&self) -> usize {
        self.rects.len()
    }

    pub fn container(&self) -> N {
        self.container
    }

    pub fn is_mounted<D: DocumentMut<Node = N> + ?Sized>(&self, doc: &D) -> bool {
        doc.is_connected(self.container)
    }

    /// Highlight `nodes` and label the tooltip with `name` or the first tag name
    ///
    /// Non-element nodes are skipped. Returns `None` when nothing is left to
    /// highlight, in which case every rectangle has been released.
    pub fn inspect<D: DocumentMut<Node = N> + ?Sized>(
        &mut self,
        doc: &mut D,
        nodes: &[N],
        name: Option<&str>,
    ) -> Option<Inspection> {
        let elements: Vec<N> = nodes
            .iter()
            .copied()
            .filter(|&node| doc.is_element(node))
            .collect();

        while self.rects.len() > elements.len() {
            if let Some(rect) = self.rects.pop() {
                rect.remove(doc);
            }
        }
        let first = *elements.first()?;

        self.mount(doc);
        while self.rects.len() < elements.len() {
            let rect = OverlayRect::create(doc, self.container);
            self.rects.push(rect);
        }

        let mut top = f64::INFINITY;
        let mut right = f64::NEG_INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        let mut left = f64::INFINITY;

        for (element, rect) in elements.iter().zip(&self.rects) {
            let bounds = bounding_rect(&*doc, *element, None);
            let dims = dimensions(&*doc, *element);

            top = top.min(bounds.top - dims.margin.top);
            right = right.max(bounds.right() + dims.margin.right);
            bottom = bottom.max(bounds.bottom() + dims.margin.bottom);
            left = left.min(bounds.left - dims.margin.left);

            rect.update(doc, bounds, &dims);
        }

        let label = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => doc
                .local_name(first)
                .map(str::to_lowercase)
                .unwrap_or_default(),
        };
        let outer = Rect::new(top, left, right - left, bottom - top);
        self.tip.update_text(
            doc,
            &label,
            Size {
                width: outer.width,
                height: outer.height,
            },
        );

        let viewport = doc.viewport();
        let page = doc
            .document_element()
            .map(|html| bounding_rect(&*doc, html, None))
            .unwrap_or_default();
        let bounds = Rect::new(
            page.top + viewport.scroll_y,
            page.left + viewport.scroll_x,
            viewport.width,
            viewport.height,
        );
        let tip = self.tip.update_position(doc, outer, bounds);

        debug!("Inspecting {} element(s) as {:?}", elements.len(), label);
        Some(Inspection { label, outer, tip })
    }

    /// Detach every visual from the document; safe to repeat
    pub fn remove<D: DocumentMut<Node = N> + ?Sized>(&mut self, doc: &mut D) {
        for rect in self.rects.drain(..) {
            rect.remove(doc);
        }
        doc.remove_node(self.container);
    }
}

/// Tooltip position for a `tip`-sized box next to `target` inside `bounds`
///
/// Prefers below the target, then above, then the bottom of the bounds, and
/// keeps the tooltip from running past the right or left edge.
pub fn place_tip(target: Rect, bounds: Rect, tip: Size) -> Point {
    let tip_height = tip.height.max(MIN_TIP_SIZE.height);
    let tip_width = tip.width.max(MIN_TIP_SIZE.width);

    let top = if target.bottom() + tip_height <= bounds.bottom() {
        if target.bottom() < bounds.top {
            bounds.top + TIP_MARGIN
        } else {
            target.bottom() + TIP_MARGIN
        }
    } else if target.top - tip_height <= bounds.bottom() {
        if target.top - tip_height - TIP_MARGIN < bounds.top + TIP_MARGIN {
            bounds.top + TIP_MARGIN
        } else {
            target.top - tip_height - TIP_MARGIN
        }
    } else {
        bounds.bottom() - tip_height - TIP_MARGIN
    };

    let mut left = target.left + TIP_MARGIN;
    if target.left < bounds.left {
        left = bounds.left + TIP_MARGIN;
    }
    if target.left + tip_width > bounds.right() {
        left = bounds.right() - tip_width - TIP_MARGIN;
    }

    Point { x: left, y: top }
}

fn box_wrap<D: DocumentMut + ?Sized>(doc: &mut D, node: D::Node, sides: &BoxSides) {
    doc.set_style(node, "border-top-width", &px(sides.top));
    doc.set_style(node, "border-left-width", &px(sides.left));
    doc.set_style(node, "border-right-width", &px(sides.right));
    doc.set_style(node, "border-bottom-width", &px(sides.bottom));
    doc.set_style(node, "border-style", "solid");
}

pub(crate) fn px(value: f64) -> String {
    format!("{}px", value)
}

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;
