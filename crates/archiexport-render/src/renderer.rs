//! View renderer trait and error types
//!
//! This module defines the core abstraction for view renderers,
//! enabling a pluggable, fallback-based export architecture.

use std::fs;
use std::path::Path;

use archiexport_model::{Model, View};

use crate::types::OutputFormat;

/// Errors that can occur during view rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The format name is not recognized
    #[error("Unknown output format: {0}")]
    UnknownFormat(String),

    /// The output format is not supported by this renderer
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(OutputFormat),

    /// The renderer is not available (e.g., host command not installed)
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),

    /// The view cannot be rendered
    #[error("Invalid view: {0}")]
    InvalidView(String),

    /// Rendering failed during execution
    #[error("Rendering failed: {0}")]
    RenderFailed(String),

    /// The host command exited unsuccessfully
    #[error("Command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for renderer operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Options for view rendering
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Scale factor applied to model coordinates
    pub scale: f32,
    /// Margin around the diagram in pixels
    pub padding: u32,
    /// Minimum canvas width in pixels
    pub min_width: u32,
    /// Minimum canvas height in pixels
    pub min_height: u32,
    /// Background color (CSS color string, e.g., "white", "#ffffff")
    pub background: String,
    /// Label font size in pixels
    pub font_size: u32,
    /// Title font size in pixels
    pub title_font_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.5,
            padding: 40,
            min_width: 1200,
            min_height: 800,
            background: "#ffffff".to_string(),
            font_size: 12,
            title_font_size: 18,
        }
    }
}

impl RenderOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scale factor
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set padding
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Set minimum canvas size
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    /// Set background color
    pub fn with_background(mut self, bg: impl Into<String>) -> Self {
        self.background = bg.into();
        self
    }
}

/// Trait for view renderers
///
/// Implementors turn one view of a loaded model into image bytes.
/// The engine orchestrates multiple renderers with fallback logic.
pub trait ViewRenderer: Send + Sync {
    /// Human-readable name of this renderer
    fn name(&self) -> &'static str;

    /// Check if this renderer supports the given output format
    fn supports_format(&self, format: OutputFormat) -> bool {
        matches!(format, OutputFormat::Png | OutputFormat::Svg)
    }

    /// Check if the renderer is currently available
    ///
    /// The native renderer always is; the command renderer needs its
    /// program to be installed.
    fn is_available(&self) -> bool {
        true
    }

    /// Render a view to the specified format
    fn render(
        &self,
        model: &Model,
        view: &View,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>>;

    /// Render a view and write it to `path`
    fn render_to_file(
        &self,
        model: &Model,
        view: &View,
        path: &Path,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<()> {
        let data = self.render(model, view, format, options)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Rendered view with metadata
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// The rendered image bytes
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// Id of the rendered view
    pub view_id: String,
    /// SHA-256 fingerprint of the view content (for drift detection)
    pub source_hash: String,
    /// Name of the renderer that produced this output
    pub renderer: String,
}

impl RenderedView {
    /// Get the file extension for this view
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Check if the data appears to be a valid PNG
    pub fn is_valid_png(&self) -> bool {
        self.data.len() >= 8 && &self.data[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    /// Check if the data appears to be valid SVG
    pub fn is_valid_svg(&self) -> bool {
        if let Ok(s) = std::str::from_utf8(&self.data) {
            s.contains("<svg")
        } else {
            false
        }
    }
}
