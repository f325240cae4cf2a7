//! Viewport and box geometry in CSS pixels.

/// Width and height of a viewport or rendered element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Zero-sized box.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Top-left offset of a positioned element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub left: f64,
    pub top: f64,
}

impl Point {
    #[must_use]
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Format a pixel length for a CSS property value.
///
/// Whole numbers are written without a fractional part (`"120px"`).
#[must_use]
pub fn px(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}px", value as i64)
    } else {
        format!("{value}px")
    }
}

/// Parse a CSS pixel length (`"120px"`, `"120"`, `"12.5px"`).
///
/// Returns `None` for other units or malformed values.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_formats_whole_numbers_without_fraction() {
        assert_eq!(px(120.0), "120px");
        assert_eq!(px(-4.0), "-4px");
        assert_eq!(px(12.5), "12.5px");
    }

    #[test]
    fn parse_px_accepts_bare_and_suffixed() {
        assert_eq!(parse_px("120px"), Some(120.0));
        assert_eq!(parse_px(" 42 "), Some(42.0));
        assert_eq!(parse_px("12.5px"), Some(12.5));
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px("auto"), None);
    }
}
