//! Loading semantic models and metrics from YAML files.
//!
//! A project directory is scanned recursively for `.yml`/`.yaml` files.
//! Each file may declare `semantic_models:` and/or `metrics:`; any other
//! top-level keys are ignored, so the loader can point at a whole project.
//!
//! # Example
//!
//! ```rust,ignore
//! use semlink::model::loader::load_project;
//! use std::path::Path;
//!
//! let project = load_project(Path::new("models/"))?;
//! println!("{} models, {} metrics", project.models.len(), project.metrics.len());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::{Metric, SemanticModel};

/// Errors that can occur when loading a project.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input directory does not exist
    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// IO error reading a file or directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error in {file}: {message}")]
    Yaml { file: String, message: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Everything declared across a project's YAML files, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    pub models: Vec<SemanticModel>,
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    semantic_models: Vec<SemanticModel>,
    #[serde(default)]
    metrics: Vec<Metric>,
}

/// Load every semantic model and metric below `dir`.
///
/// Files are visited in sorted path order so registry order, and with it
/// join-target selection, is stable across runs.
pub fn load_project(dir: &Path) -> LoadResult<LoadedProject> {
    if !dir.is_dir() {
        return Err(LoadError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }

    let mut files = Vec::new();
    collect_yaml_files(dir, &mut files)?;
    files.sort();

    let mut project = LoadedProject::default();
    for file in &files {
        let content = fs::read_to_string(file)?;
        let parsed = load_project_from_str(&content, &file.display().to_string())?;
        tracing::debug!(
            file = %file.display(),
            models = parsed.models.len(),
            metrics = parsed.metrics.len(),
            "loaded project file"
        );
        project.models.extend(parsed.models);
        project.metrics.extend(parsed.metrics);
    }

    Ok(project)
}

/// Load models and metrics from a YAML string (useful for testing).
pub fn load_project_from_str(content: &str, filename: &str) -> LoadResult<LoadedProject> {
    // Empty files and comment-only files deserialize to null
    if content.trim().is_empty() {
        return Ok(LoadedProject::default());
    }

    let file: Option<ProjectFile> =
        serde_yaml::from_str(content).map_err(|e| LoadError::Yaml {
            file: filename.to_string(),
            message: e.to_string(),
        })?;
    let file = file.unwrap_or_default();

    Ok(LoadedProject {
        models: file.semantic_models,
        metrics: file.metrics,
    })
}

fn collect_yaml_files(dir: &Path, out: &mut Vec<PathBuf>) -> LoadResult<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_yaml_files(&path, out)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        ) {
            out.push(path);
        }
    }
    Ok(())
}
