#![forbid(unsafe_code)]

//! Core types for the veil modal overlay.
//!
//! This crate has no DOM dependency. It provides:
//! - [`Size`] and [`Point`] for viewport and box geometry
//! - [`ModalConfig`] with built-in defaults and [`ConfigOverrides`] merging
//! - [`RuntimeCaps`] for detecting hosts that need legacy layout shims
//! - [`position`] arithmetic for centering the dialog container

pub mod caps;
pub mod config;
pub mod error;
pub mod geometry;
pub mod position;
pub mod style;

pub use caps::{RuntimeCaps, RuntimeSignals};
pub use config::{ConfigOverrides, ModalConfig};
pub use error::ConfigError;
pub use geometry::{Point, Size};
pub use position::PositionOverride;
pub use style::StyleRules;
