//! View layout to SVG
//!
//! Diagram objects are drawn at their model coordinates, scaled and shifted
//! so the top-left object sits just below the title band. Connections are
//! drawn first so boxes cover their ends.

use archiexport_model::{Bounds, Layer, View, ViewNode};

use crate::renderer::RenderOptions;

/// Height reserved under the padding for the title band
const TITLE_BAND: f32 = 40.0;
/// Extra canvas height below the diagram
const FOOTER_SPACE: f32 = 10.0;
/// Y position of the title separator line
const SEPARATOR_Y: f32 = 36.0;
/// Arrowhead length and half-width
const ARROW_LENGTH: f32 = 10.0;
const ARROW_HALF_WIDTH: f32 = 5.0;
/// Maximum label lines inside a box
const MAX_LABEL_LINES: usize = 4;
/// Approximate label glyph width in pixels
const GLYPH_WIDTH: f32 = 7.0;

const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";
const TEXT_COLOR: &str = "#1a1a1a";
const LINE_COLOR: &str = "#555555";
const SEPARATOR_COLOR: &str = "#cccccc";

/// Fill and stroke colors for a layer
pub fn layer_colors(layer: Layer) -> (&'static str, &'static str) {
    match layer {
        Layer::Business => ("#FFFFC0", "#8B8B00"),
        Layer::Application => ("#C0E0FF", "#00008B"),
        Layer::Technology => ("#C0FFC0", "#006400"),
        Layer::Motivation => ("#FFD700", "#8B6914"),
        Layer::Strategy => ("#F4A460", "#8B4513"),
        Layer::Implementation => ("#FFB6C1", "#8B0000"),
        Layer::Other => ("#F0F0F0", "#555555"),
    }
}

/// Fill and stroke for a diagram object
///
/// Groupings and junctions are drawn in their own neutral colors rather
/// than the generic ones of [`Layer::Other`].
pub fn node_colors(element_type: &str) -> (&'static str, &'static str) {
    match element_type.rsplit(':').next().unwrap_or(element_type) {
        "Grouping" => ("#F5F5F5", "#999999"),
        "Junction" => ("#FFFFFF", "#333333"),
        other => layer_colors(Layer::of(other)),
    }
}

/// Canvas geometry for one view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    /// Model-space origin (top-left of the bounding box)
    origin_x: f32,
    origin_y: f32,
    scale: f32,
    padding: f32,
}

impl Canvas {
    /// Compute the canvas for a view
    pub fn for_view(view: &View, options: &RenderOptions) -> Self {
        let nodes = view.walk_nodes();
        let (min_x, min_y, max_x, max_y) = if nodes.is_empty() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            nodes.iter().fold(
                (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
                |(x0, y0, x1, y1), n| {
                    (
                        x0.min(n.bounds.x),
                        y0.min(n.bounds.y),
                        x1.max(n.bounds.right()),
                        y1.max(n.bounds.bottom()),
                    )
                },
            )
        };

        let scale = options.scale;
        let padding = options.padding as f32;
        let content_w = ((max_x - min_x) * scale).floor() + padding * 2.0;
        let content_h = ((max_y - min_y) * scale).floor() + padding * 2.0 + TITLE_BAND + FOOTER_SPACE;

        Self {
            width: (content_w as u32).max(options.min_width),
            height: (content_h as u32).max(options.min_height),
            origin_x: min_x,
            origin_y: min_y,
            scale,
            padding,
        }
    }

    /// Map a model-space rectangle to canvas pixels
    pub fn place(&self, bounds: &Bounds) -> Bounds {
        Bounds::new(
            ((bounds.x - self.origin_x) * self.scale).floor() + self.padding,
            ((bounds.y - self.origin_y) * self.scale).floor() + self.padding + TITLE_BAND,
            (bounds.width * self.scale).floor(),
            (bounds.height * self.scale).floor(),
        )
    }
}

/// Render a view to an SVG document
pub fn render_view_svg(view: &View, options: &RenderOptions) -> String {
    let canvas = Canvas::for_view(view, options);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        canvas.width,
        canvas.height,
        escape_xml(&options.background)
    ));
    svg.push('\n');

    render_title(&mut svg, view, &canvas, options);

    svg.push_str("<g class=\"connections\">\n");
    for conn in &view.connections {
        let (Some(source), Some(target)) = (view.find_node(&conn.source), view.find_node(&conn.target))
        else {
            log::debug!(
                "Skipping connection '{}' in view '{}': endpoint not on view",
                conn.id,
                view.name
            );
            continue;
        };
        render_connection(&mut svg, &canvas.place(&source.bounds), &canvas.place(&target.bounds));
    }
    svg.push_str("</g>\n");

    svg.push_str("<g class=\"nodes\">\n");
    for node in view.walk_nodes() {
        render_node(&mut svg, node, &canvas, options);
    }
    svg.push_str("</g>\n");

    svg.push_str("</svg>\n");
    svg
}

fn render_title(svg: &mut String, view: &View, canvas: &Canvas, options: &RenderOptions) {
    let padding = options.padding;
    svg.push_str(&format!(
        r#"<text x="{x}" y="{y}" font-family="{font}" font-size="{size}" font-weight="bold" fill="{color}">{title}</text>"#,
        x = padding,
        y = 10 + options.title_font_size,
        font = FONT_FAMILY,
        size = options.title_font_size,
        color = TEXT_COLOR,
        title = escape_xml(&view.name)
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{color}" stroke-width="1"/>"#,
        x1 = padding,
        x2 = canvas.width.saturating_sub(padding),
        y = SEPARATOR_Y,
        color = SEPARATOR_COLOR
    ));
    svg.push('\n');
}

fn render_connection(svg: &mut String, source: &Bounds, target: &Bounds) {
    let (sx, sy) = source.center();
    let (tx, ty) = target.center();

    svg.push_str(&format!(
        r#"<line x1="{sx}" y1="{sy}" x2="{tx}" y2="{ty}" stroke="{LINE_COLOR}" stroke-width="2"/>"#
    ));
    svg.push('\n');

    let (dx, dy) = (tx - sx, ty - sy);
    let length = (dx * dx + dy * dy).sqrt().max(1.0);
    let (ux, uy) = (dx / length, dy / length);
    let (ax, ay) = (tx - ARROW_LENGTH * ux, ty - ARROW_LENGTH * uy);
    let (px, py) = (-uy * ARROW_HALF_WIDTH, ux * ARROW_HALF_WIDTH);

    svg.push_str(&format!(
        r#"<polygon points="{tx},{ty} {},{} {},{}" fill="{LINE_COLOR}"/>"#,
        ax + px,
        ay + py,
        ax - px,
        ay - py
    ));
    svg.push('\n');
}

fn render_node(svg: &mut String, node: &ViewNode, canvas: &Canvas, options: &RenderOptions) {
    let rect = canvas.place(&node.bounds);
    let (fill, stroke) = node_colors(&node.element_type);

    svg.push_str(&format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{fill}" stroke="{stroke}" stroke-width="2"/>"#,
        rect.x, rect.y, rect.width, rect.height
    ));
    svg.push('\n');

    let max_chars = ((rect.width / GLYPH_WIDTH) as usize).max(8);
    let lines = wrap_text(node.display_label(), max_chars);
    if lines.is_empty() {
        return;
    }

    let line_height = (options.font_size + 3) as f32;
    let total_height = lines.len() as f32 * line_height;
    let center_x = rect.x + rect.width / 2.0;
    let mut baseline = rect.y + ((rect.height - total_height) / 2.0).floor() + options.font_size as f32;

    for line in lines {
        svg.push_str(&format!(
            r#"<text x="{center_x}" y="{baseline}" font-family="{FONT_FAMILY}" font-size="{}" text-anchor="middle" fill="{TEXT_COLOR}">{}</text>"#,
            options.font_size,
            escape_xml(&line)
        ));
        svg.push('\n');
        baseline += line_height;
    }
}

/// Greedy word wrap, at most four lines
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let line_len = line.chars().count();
        if line_len + word.chars().count() + 1 <= max_chars {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        } else {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line.push_str(word);
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.truncate(MAX_LABEL_LINES);
    lines
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
