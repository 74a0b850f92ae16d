//! Export through the modeling application's command line
//!
//! When the host application is installed, its own renderer gives output
//! identical to what users see in the tool. The command is an argv
//! template run once per view, typically a wrapper around Archi's
//! command-line mode:
//!
//! ```toml
//! [command]
//! program = "/opt/archi/export-view.sh"
//! args = ["{model}", "{view_id}", "{output}", "{format}"]
//! ```
//!
//! Placeholders: `{model}`, `{view}`, `{view_id}`, `{output}`, `{format}`.

use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;

use archiexport_model::{Model, View};
use serde::Deserialize;

use crate::renderer::{RenderError, RenderOptions, RenderResult, ViewRenderer};
use crate::types::OutputFormat;

/// Program and argument template for the host command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Substitute placeholders in every argument
    ///
    /// Substituted values are not scanned again, so a view named
    /// `x{format}` stays `x{format}`.
    pub fn expand(&self, model: &Path, view: &View, output: &Path, format: OutputFormat) -> Vec<String> {
        let model = model.display().to_string();
        let output = output.display().to_string();
        let values = [
            ("model", model.as_str()),
            ("view", view.name.as_str()),
            ("view_id", view.id.as_str()),
            ("output", output.as_str()),
            ("format", format.name()),
        ];

        self.args.iter().map(|arg| substitute(arg, &values)).collect()
    }

    /// Command line as a single display string
    pub fn display(&self, args: &[String]) -> String {
        std::iter::once(self.program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Replace `{key}` tokens in one left-to-right pass; unknown tokens are kept
fn substitute(arg: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let known = tail.find('}').and_then(|end| {
            let key = &tail[1..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (end, *value))
        });

        match known {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Renderer that shells out to the host application
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    template: CommandTemplate,
}

impl CommandRenderer {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }
}

impl ViewRenderer for CommandRenderer {
    fn name(&self) -> &'static str {
        "command"
    }

    fn is_available(&self) -> bool {
        let program = Path::new(&self.template.program);
        if program.components().count() > 1 {
            program.is_file()
        } else {
            which::which(&self.template.program).is_ok()
        }
    }

    fn render(
        &self,
        model: &Model,
        view: &View,
        format: OutputFormat,
        options: &RenderOptions,
    ) -> RenderResult<Vec<u8>> {
        let scratch = tempfile::tempdir()?;
        let target = scratch.path().join(format!("view.{}", format.extension()));
        self.render_to_file(model, view, &target, format, options)?;
        Ok(fs::read(&target)?)
    }

    fn render_to_file(
        &self,
        model: &Model,
        view: &View,
        path: &Path,
        format: OutputFormat,
        _options: &RenderOptions,
    ) -> RenderResult<()> {
        // A leftover file must not pass for this run's output
        match fs::remove_file(path) {
            Ok(()) => log::debug!("Removed previous {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let args = self.template.expand(&model.path, view, path, format);
        log::info!("Running: {}", self.template.display(&args));
        let output = Command::new(&self.template.program)
            .args(&args)
            .output()
            .map_err(|e| {
                RenderError::Unavailable(format!("failed to run {}: {}", self.template.program, e))
            })?;

        if !output.status.success() {
            return Err(RenderError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !path.exists() {
            return Err(RenderError::RenderFailed(format!(
                "{} exited successfully but wrote no file at {}",
                self.template.program,
                path.display()
            )));
        }

        Ok(())
    }
}
