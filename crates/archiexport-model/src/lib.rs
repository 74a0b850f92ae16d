//! # archiexport-model
//!
//! Loads ArchiMate models saved by [Archi](https://www.archimatetool.com)
//! (`.archimate` files) and exposes their views (diagrams) for export.
//!
//! ## Example
//!
//! ```no_run
//! use archiexport_model::Model;
//!
//! let model = Model::load("model/archiPKG.archimate")?;
//! for view in model.all_views() {
//!     println!("{} ({} nodes)", view.name, view.node_count());
//! }
//! model.close();
//! # Ok::<(), archiexport_model::ModelError>(())
//! ```

pub mod error;
pub mod layer;
pub mod model;
mod parser;

pub use error::{ModelError, Result};
pub use layer::Layer;
pub use model::{Bounds, Element, Model, View, ViewConnection, ViewKind, ViewNode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
