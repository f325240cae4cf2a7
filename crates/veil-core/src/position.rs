//! Container positioning.
//!
//! The container is centered in the viewport unless the caller pins one or
//! both axes with a [`PositionOverride`].
//!
//! # Invariants
//!
//! - Without an override, `top == (H - h) / 2` and `left == (W - w) / 2`.
//! - Each axis of an override is resolved independently.
//! - An override coordinate of exactly `0` is treated as absent and falls
//!   back to the centered value for that axis. Pin an element to the edge
//!   with a style rule instead.
//!
//! Results are not clamped: a container larger than the viewport gets a
//! negative offset, matching what the browser would render.

use crate::geometry::{Point, Size};

/// Caller-pinned container coordinates, `[x, y]` in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(Option<f64>, Option<f64>)", into = "(Option<f64>, Option<f64>)")
)]
pub struct PositionOverride {
    /// Left offset; `None` centers horizontally.
    pub x: Option<f64>,
    /// Top offset; `None` centers vertically.
    pub y: Option<f64>,
}

impl PositionOverride {
    /// Pin both axes.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Pin only the left offset.
    #[must_use]
    pub const fn left(x: f64) -> Self {
        Self { x: Some(x), y: None }
    }

    /// Pin only the top offset.
    #[must_use]
    pub const fn top(y: f64) -> Self {
        Self { x: None, y: Some(y) }
    }
}

impl From<(Option<f64>, Option<f64>)> for PositionOverride {
    fn from((x, y): (Option<f64>, Option<f64>)) -> Self {
        Self { x, y }
    }
}

impl From<PositionOverride> for (Option<f64>, Option<f64>) {
    fn from(value: PositionOverride) -> Self {
        (value.x, value.y)
    }
}

/// Offset that centers a box of `size` within `viewport`.
#[must_use]
pub fn centered(viewport: Size, size: Size) -> Point {
    Point::new(
        viewport.width / 2.0 - size.width / 2.0,
        viewport.height / 2.0 - size.height / 2.0,
    )
}

/// Resolve the container offset for the given viewport, container size and
/// optional override.
#[must_use]
pub fn resolve(viewport: Size, size: Size, position: Option<PositionOverride>) -> Point {
    let center = centered(viewport, size);
    match position {
        Some(pinned) => Point::new(axis(pinned.x, center.left), axis(pinned.y, center.top)),
        None => center,
    }
}

fn axis(pinned: Option<f64>, center: f64) -> f64 {
    match pinned {
        Some(value) if value != 0.0 => value,
        _ => center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centers_without_override() {
        let point = resolve(Size::new(1024.0, 768.0), Size::new(400.0, 200.0), None);
        assert_eq!(point, Point::new(312.0, 284.0));
    }

    #[test]
    fn override_pins_both_axes() {
        let point = resolve(
            Size::new(1024.0, 768.0),
            Size::new(400.0, 200.0),
            Some(PositionOverride::new(15.0, 40.0)),
        );
        assert_eq!(point, Point::new(15.0, 40.0));
    }

    #[test]
    fn partial_override_centers_missing_axis() {
        let viewport = Size::new(800.0, 600.0);
        let size = Size::new(200.0, 100.0);

        let left_only = resolve(viewport, size, Some(PositionOverride::left(10.0)));
        assert_eq!(left_only, Point::new(10.0, 250.0));

        let top_only = resolve(viewport, size, Some(PositionOverride::top(10.0)));
        assert_eq!(top_only, Point::new(300.0, 10.0));
    }

    #[test]
    fn zero_override_falls_back_to_center() {
        let point = resolve(
            Size::new(800.0, 600.0),
            Size::new(200.0, 100.0),
            Some(PositionOverride::new(0.0, 0.0)),
        );
        assert_eq!(point, Point::new(300.0, 250.0));
    }

    #[test]
    fn oversized_container_gets_negative_offset() {
        let point = resolve(Size::new(300.0, 200.0), Size::new(500.0, 400.0), None);
        assert_eq!(point, Point::new(-100.0, -100.0));
    }

    proptest! {
        #[test]
        fn centered_matches_half_difference(
            vw in 0u32..4096,
            vh in 0u32..4096,
            w in 0u32..4096,
            h in 0u32..4096,
        ) {
            let point = resolve(
                Size::new(f64::from(vw), f64::from(vh)),
                Size::new(f64::from(w), f64::from(h)),
                None,
            );
            prop_assert_eq!(point.left, (f64::from(vw) - f64::from(w)) / 2.0);
            prop_assert_eq!(point.top, (f64::from(vh) - f64::from(h)) / 2.0);
        }

        #[test]
        fn nonzero_override_is_exact(x in 1i32..5000, y in 1i32..5000) {
            let point = resolve(
                Size::new(1280.0, 720.0),
                Size::new(300.0, 150.0),
                Some(PositionOverride::new(f64::from(x), f64::from(y))),
            );
            prop_assert_eq!(point, Point::new(f64::from(x), f64::from(y)));
        }
    }
}
