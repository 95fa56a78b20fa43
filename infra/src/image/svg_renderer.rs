//! SVG captcha renderer
//!
//! Draws each glyph with its own rotation, colour and baseline jitter over a
//! handful of random noise lines.

use rand::Rng;
use std::fmt::Write;

use dragon_core::services::{ImageRenderer, RenderedImage};

pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Canvas and noise settings
#[derive(Debug, Clone)]
pub struct SvgRendererConfig {
    pub width: u32,
    pub height: u32,
    pub noise_lines: u32,
    /// Maximum glyph rotation either way, in degrees
    pub max_rotation: i32,
    pub font_size: u32,
}

impl Default for SvgRendererConfig {
    fn default() -> Self {
        Self {
            width: 120,
            height: 40,
            noise_lines: 5,
            max_rotation: 25,
            font_size: 26,
        }
    }
}

/// Renders code text as an SVG document
#[derive(Debug, Clone, Default)]
pub struct SvgImageRenderer {
    config: SvgRendererConfig,
}

impl SvgImageRenderer {
    /// Create a renderer; a zero width or height is raised to one pixel
    pub fn new(mut config: SvgRendererConfig) -> Self {
        config.width = config.width.max(1);
        config.height = config.height.max(1);
        Self { config }
    }

    fn render_svg(&self, text: &str) -> Result<String, std::fmt::Error> {
        let SvgRendererConfig {
            width,
            height,
            noise_lines,
            max_rotation,
            font_size,
        } = self.config;
        let mut rng = rand::thread_rng();
        let mut svg = String::new();

        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width,
            h = height
        )?;
        write!(svg, r##"<rect width="100%" height="100%" fill="#f4f4f4"/>"##)?;

        for _ in 0..noise_lines {
            write!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
                rng.gen_range(0..width),
                rng.gen_range(0..height),
                rng.gen_range(0..width),
                rng.gen_range(0..height),
                random_colour(&mut rng),
            )?;
        }

        let glyphs = text.chars().count().max(1) as u32;
        let step = width / (glyphs + 1);
        let baseline = height * 3 / 4;
        for (i, glyph) in text.chars().enumerate() {
            let x = step * (i as u32 + 1);
            let y = baseline as i32 + rng.gen_range(-3..=3);
            let rotation = if max_rotation > 0 {
                rng.gen_range(-max_rotation..=max_rotation)
            } else {
                0
            };
            write!(
                svg,
                r#"<text x="{x}" y="{y}" font-family="monospace" font-size="{size}" font-weight="bold" fill="{fill}" text-anchor="middle" transform="rotate({rotation} {x} {y})">{glyph}</text>"#,
                x = x,
                y = y,
                size = font_size,
                fill = random_colour(&mut rng),
                rotation = rotation,
                glyph = escape_xml(glyph),
            )?;
        }

        svg.push_str("</svg>");
        Ok(svg)
    }
}

fn random_colour(rng: &mut impl Rng) -> String {
    format!(
        "rgb({},{},{})",
        rng.gen_range(20..160),
        rng.gen_range(20..160),
        rng.gen_range(20..160)
    )
}

fn escape_xml(c: char) -> String {
    match c {
        '<' => "&lt;".to_string(),
        '>' => "&gt;".to_string(),
        '&' => "&amp;".to_string(),
        '"' => "&quot;".to_string(),
        '\'' => "&apos;".to_string(),
        other => other.to_string(),
    }
}

impl ImageRenderer for SvgImageRenderer {
    fn render(&self, text: &str) -> Result<RenderedImage, String> {
        if text.is_empty() {
            return Err("Nothing to render".to_string());
        }
        let svg = self.render_svg(text).map_err(|e| e.to_string())?;
        Ok(RenderedImage::new(SVG_CONTENT_TYPE, svg.into_bytes()))
    }
}
