//! # archiexport-render
//!
//! Renders the views of an ArchiMate model to image files.
//!
//! Two renderers are provided:
//!
//! - [`NativeRenderer`] lays the view out as SVG and rasterizes it with
//!   resvg, fully offline (feature `native`, enabled by default)
//! - [`CommandRenderer`] delegates to the modeling application's own
//!   command line, one invocation per view
//!
//! [`ExportEngine`] tries them in priority order.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use archiexport_model::Model;
//! use archiexport_render::{ExportEngine, OutputFormat, RenderOptions};
//!
//! let model = Model::load("model/archiPKG.archimate")?;
//! let engine = ExportEngine::new();
//! for view in model.all_views() {
//!     let path = PathBuf::from(format!("diagrams/{}.png", view.id));
//!     engine.export_view(&model, view, &path, OutputFormat::Png, &RenderOptions::default())?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod engine;
#[cfg(feature = "native")]
pub mod native;
pub mod renderer;
pub mod svg;
pub mod types;

pub use command::{CommandRenderer, CommandTemplate};
pub use engine::{view_fingerprint, ExportEngine};
#[cfg(feature = "native")]
pub use native::NativeRenderer;
pub use renderer::{RenderError, RenderOptions, RenderResult, RenderedView, ViewRenderer};
pub use svg::render_view_svg;
pub use types::OutputFormat;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
