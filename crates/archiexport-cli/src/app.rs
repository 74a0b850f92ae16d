//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use archiexport_model::{Model, ViewKind};
use archiexport_render::{ExportEngine, OutputFormat};

use crate::config::{load_settings, Settings};
use crate::discover::resolve_model_path;
use crate::driver::{plan_file_names, CollisionPolicy, EngineHost, ExportDriver};
use crate::sanitize::sanitize_name;

/// Output format for the view listing
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table
    #[default]
    Text,
    /// JSON array for scripting
    Json,
}

#[derive(Parser)]
#[command(name = "archiexport")]
#[command(author, version, about = "Batch-export ArchiMate views as images", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Defaults to `export` with configured settings
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every view of a model to the output directory
    Export(ExportArgs),

    /// List the views of a model and their output file names
    List {
        /// Model file (.archimate)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Collision handling used to derive file names
        #[arg(long, value_enum)]
        collisions: Option<CollisionPolicy>,

        /// Output format (text or json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: ListFormat,
    },

    /// Print the file-safe form of view names
    Sanitize {
        /// View names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Debug, Default, Args)]
struct ExportArgs {
    /// Model file (.archimate) [env: MODEL_PATH]
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Output directory [env: OUTPUT_FOLDER]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image format (png or svg)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Handling of views whose names sanitize to the same file
    #[arg(long, value_enum)]
    collisions: Option<CollisionPolicy>,

    /// Print the files that would be written and exit
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON report of the batch to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Do not search for a model when the path does not exist
    #[arg(long)]
    no_discover: bool,
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        None => export_command(&ExportArgs::default()),
        Some(Commands::Export(args)) => export_command(&args),
        Some(Commands::List {
            model,
            config,
            collisions,
            format,
        }) => list_command(model.as_deref(), config.as_deref(), collisions, format),
        Some(Commands::Sanitize { names }) => {
            sanitize_command(&names);
            Ok(())
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Defaults, config file and environment, with the model flag on top
fn layered_settings(config: Option<&Path>, model: Option<&Path>) -> Result<Settings> {
    let mut settings = load_settings(config)?;
    settings.apply_env();
    if let Some(model) = model {
        settings.export.model = model.to_path_buf();
    }
    Ok(settings)
}

fn export_settings(args: &ExportArgs) -> Result<Settings> {
    let mut settings = layered_settings(args.config.as_deref(), args.model.as_deref())?;
    if let Some(output) = &args.output {
        settings.export.output = output.clone();
    }
    if let Some(format) = args.format {
        settings.export.format = format;
    }
    if let Some(policy) = args.collisions {
        settings.export.collisions = policy;
    }
    if args.no_discover {
        settings.export.discover = false;
    }
    Ok(settings)
}

fn model_path(settings: &Settings) -> PathBuf {
    if settings.export.discover {
        resolve_model_path(&settings.export.model)
    } else {
        settings.export.model.clone()
    }
}

fn export_command(args: &ExportArgs) -> Result<()> {
    let settings = export_settings(args)?;
    let model_path = model_path(&settings);

    let engine = match &settings.command {
        Some(template) => ExportEngine::with_command(template.clone()),
        None => ExportEngine::new(),
    };
    tracing::debug!("Renderers: {}", engine.renderer_names().join(", "));

    let host = EngineHost::new(engine, settings.render.to_options());
    let driver = ExportDriver::new(&settings.export.output)
        .with_format(settings.export.format)
        .with_collisions(settings.export.collisions)
        .with_dry_run(args.dry_run);

    let report = driver.run(&host, &model_path)?;

    if report.failed_count() > 0 {
        tracing::warn!(
            "{} of {} view(s) failed to export",
            report.failed_count(),
            report.exports.len()
        );
    }

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    Ok(())
}

#[derive(Serialize)]
struct ViewSummary<'a> {
    id: &'a str,
    name: &'a str,
    kind: ViewKind,
    nodes: usize,
    connections: usize,
    file_name: String,
}

/// One row per view, with the file name `export` would write
fn view_summaries(model: &Model, policy: CollisionPolicy) -> Vec<ViewSummary<'_>> {
    let views = model.all_views();
    let (file_names, _) = plan_file_names(views, policy);

    views
        .iter()
        .zip(file_names)
        .map(|(view, file_name)| ViewSummary {
            id: &view.id,
            name: &view.name,
            kind: view.kind,
            nodes: view.node_count(),
            connections: view.connections.len(),
            file_name,
        })
        .collect()
}

fn list_command(
    model: Option<&Path>,
    config: Option<&Path>,
    collisions: Option<CollisionPolicy>,
    format: ListFormat,
) -> Result<()> {
    let settings = layered_settings(config, model)?;
    let policy = collisions.unwrap_or(settings.export.collisions);
    let path = model_path(&settings);
    let model = Model::load(&path)
        .with_context(|| format!("Model not found or failed to load: {}", path.display()))?;

    let summaries = view_summaries(&model, policy);

    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        ListFormat::Text => {
            println!("{} ({} views)", model.name, summaries.len());
            for s in &summaries {
                println!(
                    "  {:<32} {:<18} {:>4} nodes  -> {}",
                    s.name,
                    s.kind.to_string(),
                    s.nodes,
                    s.file_name
                );
            }
        }
    }

    Ok(())
}

fn sanitize_command(names: &[String]) {
    for name in names {
        println!("{}", sanitize_name(name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let args = vec![
            "archiexport",
            "export",
            "--model",
            "m.archimate",
            "--output",
            "out",
            "--format",
            "svg",
            "--collisions",
            "suffix",
            "--dry-run",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Some(Commands::Export(args)) => {
                assert_eq!(args.model, Some(PathBuf::from("m.archimate")));
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert_eq!(args.format, Some(OutputFormat::Svg));
                assert_eq!(args.collisions, Some(CollisionPolicy::Suffix));
                assert!(args.dry_run);
                assert!(!args.no_discover);
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_cli_parse_no_subcommand() {
        let cli = Cli::try_parse_from(vec!["archiexport"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_verbose_count() {
        let cli = Cli::try_parse_from(vec!["archiexport", "-vv", "export"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let result = Cli::try_parse_from(vec!["archiexport", "export", "--format", "gif"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_list_json() {
        let args = vec!["archiexport", "list", "-m", "m.archimate", "--format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Some(Commands::List { model, format, .. }) => {
                assert_eq!(model, Some(PathBuf::from("m.archimate")));
                assert!(matches!(format, ListFormat::Json));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_sanitize_requires_names() {
        assert!(Cli::try_parse_from(vec!["archiexport", "sanitize"]).is_err());

        let cli = Cli::try_parse_from(vec!["archiexport", "sanitize", "Layer 1", "Layer-2!"]).unwrap();
        match cli.command {
            Some(Commands::Sanitize { names }) => assert_eq!(names, vec!["Layer 1", "Layer-2!"]),
            _ => panic!("Expected Sanitize command"),
        }
    }

    #[test]
    fn test_list_names_follow_collision_policy() {
        let model = Model::parse(
            br#"<archimate:model xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:archimate="http://www.archimatetool.com/archimate">
  <element xsi:type="archimate:ArchimateDiagramModel" id="v1" name="Layer 1"/>
  <element xsi:type="archimate:ArchimateDiagramModel" id="v2" name="Layer-2!"/>
  <element xsi:type="archimate:ArchimateDiagramModel" id="v3" name="Layer_1"/>
</archimate:model>"#,
            "m.archimate",
        )
        .unwrap();

        let names = |policy: CollisionPolicy| -> Vec<String> {
            view_summaries(&model, policy)
                .into_iter()
                .map(|s| s.file_name)
                .collect()
        };

        assert_eq!(names(CollisionPolicy::Overwrite), vec!["Layer_1", "Layer_2_", "Layer_1"]);
        assert_eq!(names(CollisionPolicy::Suffix), vec!["Layer_1", "Layer_2_", "Layer_1_2"]);
    }

    #[test]
    fn test_cli_parse_list_collisions() {
        let args = vec!["archiexport", "list", "--collisions", "suffix"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Some(Commands::List { collisions, .. }) => {
                assert_eq!(collisions, Some(CollisionPolicy::Suffix));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("archiexport.toml");
        fs::write(
            &config,
            "[export]\nmodel = \"from-config.archimate\"\noutput = \"config-out\"\nformat = \"svg\"\n",
        )
        .unwrap();

        let args = ExportArgs {
            config: Some(config),
            output: Some(PathBuf::from("flag-out")),
            no_discover: true,
            ..ExportArgs::default()
        };
        let settings = export_settings(&args).unwrap();

        assert_eq!(settings.export.output, PathBuf::from("flag-out"));
        assert_eq!(settings.export.format, OutputFormat::Svg);
        assert!(!settings.export.discover);
    }
}
