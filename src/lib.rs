//! Render a layered app icon procedurally and apply it to the pixel sizes and
//! locations each platform's packaging expects.

pub mod apply;
pub mod canvas;
pub mod contents_json;
pub mod error;
pub mod glyph;
pub mod render;
pub mod style;
pub mod targets;
