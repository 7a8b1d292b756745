//! # semlink
//!
//! Translates a semantic-model definition (semantic models with entities,
//! dimensions and measures, plus metrics) into BI views and explores.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           YAML (semantic_models + metrics)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model::loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Model (Rust Types)                      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [semantic::registry]
//! ┌─────────────────────────────────────────────────────────┐
//! │   ModelRegistry → JoinGraph / Exposure / Resolver        │
//! │                 → SqlSynthesizer                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [generate]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Views + Explores (JSON)                     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod generate;
pub mod model;
pub mod semantic;

pub use generate::{generate, GenerateError, GenerateOptions, GeneratedProject};
pub use model::loader::{load_project, load_project_from_str, LoadError, LoadedProject};
pub use semantic::{ModelRegistry, Naming};
