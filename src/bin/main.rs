//! semlink CLI - Generate BI views and explores from semantic models
//!
//! Usage:
//!   semlink generate --input-dir <dir> --output-dir <dir> --schema <schema>
//!   semlink list --input-dir <dir>
//!
//! Examples:
//!   semlink generate -i models -o lookml --schema analytics
//!   semlink generate -i models -o lookml --schema analytics --fact-models rental_orders
//!   semlink list -i models

use clap::{Parser, Subcommand};
use semlink::config::{Settings, SettingsError};
use semlink::generate::{generate, GeneratedProject};
use semlink::model::loader::load_project;
use semlink::semantic::{Eligibility, MetricResolver, ModelRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "semlink")]
#[command(about = "semlink - Generate BI views and explores from semantic models")]
#[command(version)]
struct Cli {
    /// Path to a semlink.toml (defaults to the standard search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate view and explore files
    Generate {
        /// Directory containing semantic model YAML
        #[arg(short, long)]
        input_dir: Option<PathBuf>,

        /// Directory to write generated files to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Schema that ref('...') tables resolve into
        #[arg(short, long)]
        schema: Option<String>,

        /// Prefix for view names
        #[arg(long)]
        view_prefix: Option<String>,

        /// Prefix for explore names
        #[arg(long)]
        explore_prefix: Option<String>,

        /// Fact models to build explores for
        #[arg(long, num_args = 1..)]
        fact_models: Vec<String>,
    },

    /// List models and metrics with their resolved primary entities
    List {
        /// Directory containing semantic model YAML
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Generate {
            input_dir,
            output_dir,
            schema,
            view_prefix,
            explore_prefix,
            fact_models,
        } => {
            // Flags override the config file
            let mut generate_settings = settings.generate;
            if input_dir.is_some() {
                generate_settings.input_dir = input_dir;
            }
            if output_dir.is_some() {
                generate_settings.output_dir = output_dir;
            }
            if schema.is_some() {
                generate_settings.schema = schema;
            }
            if let Some(prefix) = view_prefix {
                generate_settings.view_prefix = prefix;
            }
            if let Some(prefix) = explore_prefix {
                generate_settings.explore_prefix = prefix;
            }
            if !fact_models.is_empty() {
                generate_settings.fact_models = fact_models;
            }
            cmd_generate(generate_settings)
        }
        Commands::List { input_dir } => {
            match input_dir.or(settings.generate.input_dir) {
                Some(dir) => cmd_list(&dir),
                None => {
                    tracing::error!("--input-dir is required");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn cmd_generate(settings: semlink::config::GenerateSettings) -> ExitCode {
    let (Some(input_dir), Some(output_dir)) = (&settings.input_dir, &settings.output_dir) else {
        tracing::error!("--input-dir and --output-dir are required");
        return ExitCode::FAILURE;
    };

    let options = match settings.to_options() {
        Ok(o) => o,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let project = match load_project(input_dir) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Error loading '{}': {}", input_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let registry = ModelRegistry::new(project.models, project.metrics);
    let generated = match generate(&registry, &options) {
        Ok(g) => g,
        Err(e) => {
            tracing::error!("Generation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match write_project(&generated, output_dir) {
        Ok(count) => {
            tracing::info!("Wrote {} files to {}", count, output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Error writing '{}': {}", output_dir.display(), e);
            ExitCode::FAILURE
        }
    }
}

/// Write one JSON file per view plus `explores.json`.
fn write_project(project: &GeneratedProject, dir: &Path) -> std::io::Result<usize> {
    fs::create_dir_all(dir)?;

    for view in &project.views {
        let json = serde_json::to_string_pretty(view)?;
        fs::write(dir.join(format!("{}.view.json", view.name)), json)?;
    }

    let json = serde_json::to_string_pretty(&project.explores)?;
    fs::write(dir.join("explores.json"), json)?;

    Ok(project.views.len() + 1)
}

fn cmd_list(input_dir: &Path) -> ExitCode {
    let project = match load_project(input_dir) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Error loading '{}': {}", input_dir.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let registry = ModelRegistry::new(project.models, project.metrics);
    let resolver = MetricResolver::new(&registry);

    println!("Input: {}", input_dir.display());
    println!();

    println!("Semantic models:");
    for model in registry.models() {
        let primary = model
            .primary_entity()
            .map(|e| e.name.as_str())
            .unwrap_or("-");
        println!("  - {} (primary entity: {})", model.name, primary);
    }
    println!();

    if registry.metric_count() == 0 {
        println!("No metrics defined.");
        return ExitCode::SUCCESS;
    }

    let mut failed = false;
    println!("Metrics:");
    for metric in registry.metrics() {
        match resolver.resolve(metric) {
            Ok(resolved) => {
                let note = match &resolved.eligibility {
                    Eligibility::Eligible => String::new(),
                    Eligibility::Ineligible(reason) => format!(" [ineligible: {}]", reason),
                };
                println!(
                    "  - {} ({}, primary entity: {}){}",
                    metric.name,
                    metric.kind.as_str(),
                    resolved.primary_entity,
                    note
                );
            }
            Err(e) => {
                failed = true;
                println!("  - {} ({}) ERROR: {}", metric.name, metric.kind.as_str(), e);
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
