//! archiexport CLI library
//!
//! Exposes the batch export pipeline used by the `archiexport` binary:
//! configuration layering, model discovery, name sanitization and the
//! [`ExportDriver`] that ties them to the rendering engine.
//!
//! # Binary Usage
//!
//! ```bash
//! # Export with defaults (MODEL_PATH / OUTPUT_FOLDER respected)
//! archiexport
//!
//! # Export a specific model as SVG, keeping colliding names apart
//! archiexport export --model model/shop.archimate --output out/ --format svg --collisions suffix
//!
//! # Show views and the file names they export to
//! archiexport list --model model/shop.archimate
//! ```

mod app;
pub mod config;
pub mod discover;
pub mod driver;
pub mod sanitize;

pub use app::run_cli;
pub use config::{load_settings, Settings};
pub use discover::resolve_model_path;
pub use driver::{
    plan_file_names, CollisionPolicy, DriverError, EngineHost, ExportDriver, ExportRecord,
    ExportReport, ModelHost, NameCollision, COMPLETION_MESSAGE, DRY_RUN_MESSAGE,
};
pub use sanitize::{output_path, sanitize_name};
