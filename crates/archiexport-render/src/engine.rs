//! View export engine with fallback chain
//!
//! This module provides the main entry point for view export,
//! orchestrating multiple renderers with priority-based fallback.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ExportEngine                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Priority Order:                                            │
//! │  1. CommandRenderer - host application, when configured     │
//! │  2. NativeRenderer  - offline SVG/PNG, always available     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use archiexport_model::{Model, View};
use sha2::{Digest, Sha256};

use crate::command::{CommandRenderer, CommandTemplate};
use crate::renderer::{RenderError, RenderOptions, RenderResult, RenderedView, ViewRenderer};
use crate::types::OutputFormat;

/// View export engine with fallback chain
///
/// Requests go to the first renderer that supports the format and is
/// available; if it fails, the next one is tried.
pub struct ExportEngine {
    /// Registered renderers in priority order
    renderers: Vec<Box<dyn ViewRenderer>>,
}

impl Default for ExportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportEngine {
    /// Create a new engine with the default renderers
    ///
    /// With the `native` feature this is the native renderer; without it
    /// the engine starts empty and needs a command renderer.
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut renderers: Vec<Box<dyn ViewRenderer>> = Vec::new();

        #[cfg(feature = "native")]
        {
            renderers.push(Box::new(crate::native::NativeRenderer::new()));
            log::debug!("Registered native renderer");
        }

        Self { renderers }
    }

    /// Create an engine that prefers the host command and falls back to native
    pub fn with_command(template: CommandTemplate) -> Self {
        let mut engine = Self::new();
        engine.insert_renderer(0, Box::new(CommandRenderer::new(template)));
        engine
    }

    /// Create an engine with no renderers (for testing)
    pub fn empty() -> Self {
        Self {
            renderers: Vec::new(),
        }
    }

    /// Add a renderer at the lowest priority
    pub fn add_renderer(&mut self, renderer: Box<dyn ViewRenderer>) {
        log::debug!("Added renderer: {}", renderer.name());
        self.renderers.push(renderer);
    }

    /// Insert a renderer at a specific priority position
    ///
    /// Lower indices = higher priority.
    pub fn insert_renderer(&mut self, index: usize, renderer: Box<dyn ViewRenderer>) {
        log::debug!("Inserted renderer at position {}: {}", index, renderer.name());
        self.renderers.insert(index.min(self.renderers.len()), renderer);
    }

    /// Get the names of all registered renderers
    pub fn renderer_names(&self) -> Vec<&'static str> {
        self.renderers.iter().map(|r| r.name()).collect()
    }

    /// Renderers that can currently handle `format`, in priority order
    fn candidates<'a>(
        &'a self,
        format: OutputFormat,
    ) -> impl Iterator<Item = &'a dyn ViewRenderer> + 'a {
        self.renderers
            .iter()
            .map(|r| -> &'a dyn ViewRenderer { r.as_ref() })
            .filter(move |r| r.supports_format(format))
            .filter(|r| {
                let available = r.is_available();
                if !available {
                    log::debug!("Renderer {} is not available, skipping", r.name());
                }
                available
            })
    }

    /// Export a view to `path`, returning the name of the renderer used
    ///
    /// Tries renderers in priority order until one succeeds.
    /// Returns an error only if all renderers fail.
    pub fn export_view(
        &self,
        model: &Model,
        view: &View,
        path: &Path,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<&'static str> {
        self.try_each(format, |renderer| {
            renderer.render_to_file(model, view, path, format, options)
        })
        .map(|(name, ())| {
            log::debug!("Exported view '{}' with {} to {}", view.name, name, path.display());
            name
        })
    }

    /// Render a view to bytes using the best available renderer
    pub fn render(
        &self,
        model: &Model,
        view: &View,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>> {
        self.render_with_metadata(model, view, format, options)
            .map(|rendered| rendered.data)
    }

    /// Render a view and return it with metadata
    pub fn render_with_metadata(
        &self,
        model: &Model,
        view: &View,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<RenderedView> {
        let (renderer, data) =
            self.try_each(format, |renderer| renderer.render(model, view, format, options))?;

        log::debug!(
            "Rendered view '{}' with {} ({} bytes)",
            view.name,
            renderer,
            data.len()
        );

        Ok(RenderedView {
            data,
            format,
            view_id: view.id.clone(),
            source_hash: view_fingerprint(view),
            renderer: renderer.to_string(),
        })
    }

    fn try_each<T>(
        &self,
        format: OutputFormat,
        mut attempt: impl FnMut(&dyn ViewRenderer) -> RenderResult<T>,
    ) -> RenderResult<(&'static str, T)> {
        if self.renderers.is_empty() {
            return Err(RenderError::Unavailable(
                "No renderers registered. Enable the 'native' feature or configure a command."
                    .to_string(),
            ));
        }

        let mut last_error = None;

        for renderer in self.candidates(format) {
            match attempt(renderer) {
                Ok(value) => return Ok((renderer.name(), value)),
                Err(e) => {
                    log::warn!("Renderer {} failed: {}", renderer.name(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(RenderError::UnsupportedFormat(format)))
    }
}

/// SHA-256 fingerprint of a view's content
///
/// Covers everything that affects the rendered image (name, objects,
/// bounds, labels, connections), so unchanged views keep their hash
/// between runs.
pub fn view_fingerprint(view: &View) -> String {
    let mut hasher = Sha256::new();
    hasher.update(view.id.as_bytes());
    hasher.update([0]);
    hasher.update(view.name.as_bytes());
    for node in view.walk_nodes() {
        hasher.update([1]);
        hasher.update(node.id.as_bytes());
        hasher.update([0]);
        hasher.update(node.label.as_bytes());
        hasher.update([0]);
        hasher.update(node.element_type.as_bytes());
        for v in [node.bounds.x, node.bounds.y, node.bounds.width, node.bounds.height] {
            hasher.update(v.to_le_bytes());
        }
    }
    for conn in &view.connections {
        hasher.update([2]);
        hasher.update(conn.source.as_bytes());
        hasher.update([0]);
        hasher.update(conn.target.as_bytes());
    }
    let result = hasher.finalize();
    format!(
        "sha256:{}",
        result.iter().map(|b| format!("{:02x}", b)).collect::<String>()
    )
}
