//! Container placement and the legacy fixed-position shim.

use veil_core::geometry::px;
use veil_core::position;
use veil_dom::Dom;

use crate::dialog::{DialogState, set_extent};

/// Page height, whichever of scroll and offset height is larger.
const EXPR_PAGE_HEIGHT: &str = "expression((document.body.scrollHeight > document.body.offsetHeight ? document.body.scrollHeight : document.body.offsetHeight) + 'px')";
/// Client width in either box model.
const EXPR_CLIENT_WIDTH: &str =
    "expression((document.documentElement.clientWidth || document.body.clientWidth) + 'px')";
/// Vertical scroll offset in either box model.
const SCROLL_TOP: &str = "(document.documentElement.scrollTop || document.body.scrollTop)";

/// Center the container (or pin it) within the current viewport.
///
/// When the runtime emulates fixed positioning the vertical offset is
/// owned by a scroll-tracking expression and only `left` is written.
pub(crate) fn place_container<D: Dom + ?Sized>(dom: &mut D, dialog: &DialogState) {
    let container = dialog.container();
    let viewport = dom.viewport();
    let size = dom.measure(container);
    let point = position::resolve(viewport, size, dialog.config().position);

    dom.set_style(container, "left", &px(point.left));
    if !dialog.caps().needs_fixed_emulation() {
        dom.set_style(container, "top", &px(point.top));
    }
}

/// Switch every fragment to absolute positioning driven by expressions the
/// runtime re-evaluates on scroll and layout, so they stay in view as if
/// fixed.
pub(crate) fn emulate_fixed<D: Dom + ?Sized>(dom: &mut D, dialog: &DialogState) {
    for layer in dialog.blocking_frame().into_iter().chain([dialog.overlay()]) {
        dom.set_style(layer, "position", "absolute");
        dom.set_style(layer, "height", EXPR_PAGE_HEIGHT);
        dom.set_style(layer, "width", EXPR_CLIENT_WIDTH);
    }

    let container = dialog.container();
    dom.set_style(container, "position", "absolute");
    let pinned_top = dialog
        .config()
        .position
        .and_then(|pinned| pinned.y)
        .filter(|y| *y != 0.0);
    let top = match pinned_top {
        Some(y) => format!("expression({y} + {SCROLL_TOP} + 'px')"),
        None => format!(
            "expression((document.documentElement.clientHeight || document.body.clientHeight) / 2 - this.offsetHeight / 2 + {SCROLL_TOP} + 'px')"
        ),
    };
    dom.set_style(container, "top", &top);
}

/// Follow a window resize: recenter, then stretch the full-viewport layers
/// when the runtime allows resizing them in place.
pub(crate) fn follow_resize<D: Dom + ?Sized>(dom: &mut D, dialog: &DialogState) {
    place_container(dom, dialog);

    let caps = dialog.caps();
    if !caps.resizes_live() || caps.needs_fixed_emulation() {
        return;
    }
    let viewport = dom.viewport();
    for layer in dialog.blocking_frame().into_iter().chain([dialog.overlay()]) {
        set_extent(dom, layer, viewport);
    }
}
