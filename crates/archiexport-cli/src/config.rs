//! Configuration Settings
//!
//! Settings are layered: built-in defaults, then `archiexport.toml`, then
//! the `MODEL_PATH` / `OUTPUT_FOLDER` environment variables, then flags.
//!
//! ```toml
//! [export]
//! model = "model/archiPKG.archimate"
//! output = "model/diagrams"
//! format = "png"
//! collisions = "suffix"
//!
//! [render]
//! scale = 2.0
//!
//! [command]
//! program = "/opt/archi/export-view.sh"
//! args = ["{model}", "{view_id}", "{output}"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use archiexport_render::{CommandTemplate, OutputFormat, RenderOptions};
use serde::Deserialize;

use crate::driver::CollisionPolicy;

/// Model path used when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "/github/workspace/model/archiPKG.archimate";

/// Output directory used when nothing else is configured
pub const DEFAULT_OUTPUT_DIR: &str = "/github/workspace/model/diagrams";

/// Environment variable overriding the model path
pub const MODEL_PATH_VAR: &str = "MODEL_PATH";

/// Environment variable overriding the output directory
pub const OUTPUT_FOLDER_VAR: &str = "OUTPUT_FOLDER";

/// Config files looked up in the working directory
const CONFIG_CANDIDATES: [&str; 2] = ["archiexport.toml", ".archiexport.toml"];

/// Top-level settings structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub export: ExportSettings,
    pub render: RenderSettings,
    /// Host command; when present it is tried before the native renderer
    pub command: Option<CommandTemplate>,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Apply `MODEL_PATH` and `OUTPUT_FOLDER` from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides read through `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(model) = get(MODEL_PATH_VAR) {
            self.export.model = PathBuf::from(model);
        }
        if let Some(output) = get(OUTPUT_FOLDER_VAR) {
            self.export.output = PathBuf::from(output);
        }
    }
}

/// `[export]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub model: PathBuf,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub collisions: CollisionPolicy,
    /// Search for a model file when `model` does not exist
    pub discover: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            model: PathBuf::from(DEFAULT_MODEL_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Png,
            collisions: CollisionPolicy::Overwrite,
            discover: true,
        }
    }
}

/// `[render]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub scale: f32,
    pub padding: u32,
    pub min_width: u32,
    pub min_height: u32,
    pub background: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        let defaults = RenderOptions::default();
        Self {
            scale: defaults.scale,
            padding: defaults.padding,
            min_width: defaults.min_width,
            min_height: defaults.min_height,
            background: defaults.background,
        }
    }
}

impl RenderSettings {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_scale(self.scale)
            .with_padding(self.padding)
            .with_min_size(self.min_width, self.min_height)
            .with_background(self.background.clone())
    }
}

/// Load settings from an explicit config file, or from the first
/// candidate in the working directory
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            read_settings(path)
        }
        None => {
            for candidate in CONFIG_CANDIDATES {
                let path = Path::new(candidate);
                if path.exists() {
                    tracing::debug!("Using config {}", path.display());
                    return read_settings(path);
                }
            }
            Ok(Settings::default())
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    Settings::from_toml_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}
