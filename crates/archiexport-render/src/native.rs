//! Native Rust view renderer
//!
//! Lays a view out as SVG ([`crate::svg`]) and rasterizes it with resvg,
//! without the modeling application being installed.
//!
//! # Feature Flag
//!
//! This module requires the `native` feature:
//! ```toml
//! archiexport-render = { version = "0.1", features = ["native"] }
//! ```

use std::sync::Arc;

use archiexport_model::{Model, View};

use crate::renderer::{RenderError, RenderOptions, RenderResult, ViewRenderer};
use crate::svg::render_view_svg;
use crate::types::OutputFormat;

/// Native Rust view renderer
///
/// # Example
///
/// ```ignore
/// use archiexport_render::{NativeRenderer, ViewRenderer, OutputFormat, RenderOptions};
///
/// let renderer = NativeRenderer::new();
/// let png = renderer.render(&model, view, OutputFormat::Png, &RenderOptions::default())?;
/// ```
pub struct NativeRenderer {
    /// Font database shared with every usvg parse
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Default for NativeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRenderer {
    /// Create a new native renderer with system fonts loaded
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();

        if fontdb.is_empty() {
            log::warn!("No system fonts found, labels will not be drawn in PNG output");
        }

        Self {
            fontdb: Arc::new(fontdb),
        }
    }

    /// Convert SVG string to PNG bytes using resvg
    fn svg_to_png(&self, svg: &str, options: &RenderOptions) -> RenderResult<Vec<u8>> {
        let tree = {
            let mut opts = usvg::Options::default();
            opts.fontdb = Arc::clone(&self.fontdb);
            usvg::Tree::from_str(svg, &opts)
                .map_err(|e| RenderError::RenderFailed(format!("SVG parsing failed: {}", e)))?
        };

        let size = tree.size();
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;

        let mut pixmap = tiny_skia::Pixmap::new(width.max(1), height.max(1)).ok_or_else(|| {
            RenderError::RenderFailed(format!("Failed to create pixmap ({}x{})", width, height))
        })?;

        if let Some(color) = parse_color(&options.background) {
            pixmap.fill(color);
        }

        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| RenderError::RenderFailed(format!("PNG encoding failed: {}", e)))
    }
}

impl ViewRenderer for NativeRenderer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn render(
        &self,
        _model: &Model,
        view: &View,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>> {
        if !self.supports_format(format) {
            return Err(RenderError::UnsupportedFormat(format));
        }
        if options.scale <= 0.0 || !options.scale.is_finite() {
            return Err(RenderError::InvalidView(format!(
                "scale must be positive, got {}",
                options.scale
            )));
        }

        let svg = render_view_svg(view, options);
        match format {
            OutputFormat::Svg => Ok(svg.into_bytes()),
            OutputFormat::Png => self.svg_to_png(&svg, options),
        }
    }
}

/// Parse a CSS color string to tiny_skia::Color
fn parse_color(color: &str) -> Option<tiny_skia::Color> {
    let color = color.trim().to_lowercase();

    match color.as_str() {
        "white" => return Some(tiny_skia::Color::WHITE),
        "black" => return Some(tiny_skia::Color::BLACK),
        "transparent" => return Some(tiny_skia::Color::TRANSPARENT),
        _ => {}
    }

    let hex = color.strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            // #RGB -> #RRGGBB
            let r = channel(&hex[0..1].repeat(2))?;
            let g = channel(&hex[1..2].repeat(2))?;
            let b = channel(&hex[2..3].repeat(2))?;
            Some(tiny_skia::Color::from_rgba8(r, g, b, 255))
        }
        6 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            Some(tiny_skia::Color::from_rgba8(r, g, b, 255))
        }
        8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = channel(&hex[6..8])?;
            Some(tiny_skia::Color::from_rgba8(r, g, b, a))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archiexport_model::{Bounds, ViewKind, ViewNode};

    fn sample() -> (Model, View) {
        let model = Model::parse(
            br#"<archimate:model xmlns:archimate="http://www.archimatetool.com/archimate" name="M"/>"#,
            "m.archimate",
        )
        .unwrap();
        let view = View {
            id: "v1".to_string(),
            name: "Context".to_string(),
            kind: ViewKind::ArchimateDiagram,
            nodes: vec![ViewNode {
                id: "n1".to_string(),
                element_ref: None,
                label: "Customer".to_string(),
                element_type: "BusinessActor".to_string(),
                bounds: Bounds::new(10.0, 10.0, 120.0, 55.0),
                children: Vec::new(),
            }],
            connections: Vec::new(),
        };
        (model, view)
    }

    #[test]
    fn test_native_renderer_name() {
        let renderer = NativeRenderer::new();
        assert_eq!(renderer.name(), "native");
        assert!(renderer.is_available());
    }

    #[test]
    fn test_native_renderer_supports_formats() {
        let renderer = NativeRenderer::new();
        assert!(renderer.supports_format(OutputFormat::Png));
        assert!(renderer.supports_format(OutputFormat::Svg));
    }

    #[test]
    fn test_render_view_to_svg() {
        let (model, view) = sample();
        let renderer = NativeRenderer::new();

        let svg = renderer
            .render(&model, &view, OutputFormat::Svg, &RenderOptions::default())
            .unwrap();
        let svg_str = String::from_utf8_lossy(&svg);
        assert!(svg_str.contains("<svg"));
        assert!(svg_str.contains("</svg>"));
    }

    #[test]
    fn test_render_view_to_png() {
        let (model, view) = sample();
        let renderer = NativeRenderer::new();

        let png = renderer
            .render(&model, &view, OutputFormat::Png, &RenderOptions::default())
            .unwrap();
        assert!(png.len() > 8);
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_render_rejects_bad_scale() {
        let (model, view) = sample();
        let renderer = NativeRenderer::new();

        let result = renderer.render(
            &model,
            &view,
            OutputFormat::Png,
            &RenderOptions::default().with_scale(0.0),
        );
        assert!(matches!(result, Err(RenderError::InvalidView(_))));
    }

    #[test]
    fn test_parse_color() {
        assert!(parse_color("white").is_some());
        assert!(parse_color("#fff").is_some());
        assert!(parse_color("#ffffff").is_some());
        assert!(parse_color("#ffffff80").is_some());
        assert!(parse_color("#ggg").is_none());
        assert!(parse_color("invalid").is_none());
    }

    #[test]
    fn test_parse_color_rejects_non_ascii() {
        assert!(parse_color("#éa").is_none());
        assert!(parse_color("#ffé").is_none());
        assert!(parse_color("#ÿÿÿÿ").is_none());
    }
}
