//! Image rendering for visual codes

pub mod svg_renderer;

pub use svg_renderer::{SvgImageRenderer, SvgRendererConfig};
