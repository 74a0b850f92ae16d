//! Export driver
//!
//! Runs one batch: load the model, make sure the output directory exists,
//! export every view under its sanitized name, then close the model.
//! Model access goes through [`ModelHost`] so the sequence can be driven
//! against a recording host in tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use archiexport_model::{Model, ModelError, View};
use archiexport_render::{
    view_fingerprint, ExportEngine, OutputFormat, RenderOptions, RenderResult,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitize::{output_path, sanitize_name};

/// Line printed once every view has been attempted
pub const COMPLETION_MESSAGE: &str = "Finished exporting all diagrams";

/// Line printed at the end of a dry run
pub const DRY_RUN_MESSAGE: &str = "Dry run finished, no diagrams exported";

/// Errors that abort a batch
#[derive(Debug, Error)]
pub enum DriverError {
    /// The model could not be loaded; nothing was exported
    #[error("Model not found or failed to load: {path}")]
    LoadFailure {
        path: String,
        #[source]
        source: ModelError,
    },
}

/// Model access used by the driver
pub trait ModelHost {
    /// Load the model at `path`
    fn load_model(&self, path: &Path) -> Result<Model, ModelError>;

    /// Export one view to `path`, returning the name of the renderer used
    fn export_view(
        &self,
        model: &Model,
        view: &View,
        path: &Path,
        format: OutputFormat,
    ) -> RenderResult<&'static str>;
}

/// [`ModelHost`] backed by the file loader and an [`ExportEngine`]
pub struct EngineHost {
    engine: ExportEngine,
    options: RenderOptions,
}

impl EngineHost {
    pub fn new(engine: ExportEngine, options: RenderOptions) -> Self {
        Self { engine, options }
    }
}

impl ModelHost for EngineHost {
    fn load_model(&self, path: &Path) -> Result<Model, ModelError> {
        Model::load(path)
    }

    fn export_view(
        &self,
        model: &Model,
        view: &View,
        path: &Path,
        format: OutputFormat,
    ) -> RenderResult<&'static str> {
        self.engine.export_view(model, view, path, format, &self.options)
    }
}

/// What to do when two views sanitize to the same file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later views overwrite earlier ones
    #[default]
    Overwrite,
    /// Later views get `_2`, `_3`, ... appended
    Suffix,
}

/// One attempted view export
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord {
    pub view_id: String,
    pub view_name: String,
    pub file_name: String,
    pub path: PathBuf,
    pub source_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Two views that mapped to the same sanitized name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    pub file_name: String,
    pub first_view: String,
    pub view: String,
}

/// Outcome of a batch
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub model_path: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub created_output_dir: bool,
    pub dry_run: bool,
    pub exports: Vec<ExportRecord>,
    pub collisions: Vec<NameCollision>,
}

impl ExportReport {
    pub fn exported_count(&self) -> usize {
        self.exports.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.exports.len() - self.exported_count()
    }
}

/// Assigns output file stems and remembers which view claimed each one
#[derive(Default)]
struct NameTable {
    claimed: HashMap<String, String>,
}

impl NameTable {
    fn assign(
        &mut self,
        view: &View,
        policy: CollisionPolicy,
        collisions: &mut Vec<NameCollision>,
    ) -> String {
        let base = sanitize_name(&view.name);

        let Some(first) = self.claimed.get(&base).cloned() else {
            self.claimed.insert(base.clone(), view.name.clone());
            return base;
        };

        collisions.push(NameCollision {
            file_name: base.clone(),
            first_view: first.clone(),
            view: view.name.clone(),
        });

        match policy {
            CollisionPolicy::Overwrite => {
                tracing::warn!(
                    "View '{}' overwrites '{}' ({})",
                    view.name,
                    first,
                    base
                );
                base
            }
            CollisionPolicy::Suffix => {
                let mut n = 2;
                let stem = loop {
                    let candidate = format!("{}_{}", base, n);
                    if !self.claimed.contains_key(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                tracing::warn!(
                    "View '{}' collides with '{}', writing {}",
                    view.name,
                    first,
                    stem
                );
                self.claimed.insert(stem.clone(), view.name.clone());
                stem
            }
        }
    }
}

/// Output file stems for `views` in order, as a batch assigns them
pub fn plan_file_names(views: &[View], policy: CollisionPolicy) -> (Vec<String>, Vec<NameCollision>) {
    let mut names = NameTable::default();
    let mut collisions = Vec::new();
    let stems = views
        .iter()
        .map(|view| names.assign(view, policy, &mut collisions))
        .collect();
    (stems, collisions)
}

/// Batch exporter
#[derive(Debug, Clone)]
pub struct ExportDriver {
    output_dir: PathBuf,
    format: OutputFormat,
    collisions: CollisionPolicy,
    dry_run: bool,
}

impl ExportDriver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::Png,
            collisions: CollisionPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_collisions(mut self, policy: CollisionPolicy) -> Self {
        self.collisions = policy;
        self
    }

    /// Print planned paths without touching the filesystem
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Final console line of a run
    pub fn completion_line(&self) -> &'static str {
        if self.dry_run {
            DRY_RUN_MESSAGE
        } else {
            COMPLETION_MESSAGE
        }
    }

    /// Run one batch against `host`
    pub fn run(&self, host: &dyn ModelHost, model_path: &Path) -> Result<ExportReport, DriverError> {
        let model = host
            .load_model(model_path)
            .map_err(|source| DriverError::LoadFailure {
                path: model_path.display().to_string(),
                source,
            })?;

        let created_output_dir = if self.dry_run {
            false
        } else {
            self.ensure_output_dir()
        };

        let mut report = ExportReport {
            model_path: model_path.to_path_buf(),
            output_dir: self.output_dir.clone(),
            format: self.format,
            created_output_dir,
            dry_run: self.dry_run,
            exports: Vec::new(),
            collisions: Vec::new(),
        };

        let views = model.all_views();
        tracing::info!("Exporting {} view(s) from '{}'", views.len(), model.name);

        let (file_names, collisions) = plan_file_names(views, self.collisions);
        report.collisions = collisions;

        for (view, file_name) in views.iter().zip(file_names) {
            let path = output_path(&self.output_dir, &file_name, self.format);

            let mut record = ExportRecord {
                view_id: view.id.clone(),
                view_name: view.name.clone(),
                file_name,
                path: path.clone(),
                source_hash: view_fingerprint(view),
                renderer: None,
                error: None,
            };

            if self.dry_run {
                println!("Would export: {} -> {}", view.name, path.display());
                report.exports.push(record);
                continue;
            }

            match host.export_view(&model, view, &path, self.format) {
                Ok(renderer) => record.renderer = Some(renderer.to_string()),
                Err(e) => {
                    tracing::warn!("Failed to export view '{}': {}", view.name, e);
                    record.error = Some(e.to_string());
                }
            }
            println!("Exported: {}", path.display());
            report.exports.push(record);
        }

        model.close();
        println!("{}", self.completion_line());

        Ok(report)
    }

    /// Create the output directory when absent; returns whether it was created
    fn ensure_output_dir(&self) -> bool {
        if self.output_dir.exists() {
            return false;
        }
        match fs::create_dir_all(&self.output_dir) {
            Ok(()) => {
                tracing::debug!("Created output directory {}", self.output_dir.display());
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Could not create output directory {}: {}",
                    self.output_dir.display(),
                    e
                );
                false
            }
        }
    }
}
