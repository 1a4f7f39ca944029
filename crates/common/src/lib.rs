//! Common types and utilities for apidocs-gen
//!
//! This crate contains the semantic model of an API (definitions, fields,
//! operations and their categories), the YAML configuration, the run options
//! record, the diagnostics collector and the error type shared by the parser,
//! generator and CLI components.

pub mod config;
pub mod diagnostics;
pub mod model;
mod version;

pub use config::{
    Backend, Config, OperationCategoryConfig, OperationTypeConfig, Resource, ResourceCategory,
    RunOptions,
};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use model::{
    title_case, DefId, Definition, ExampleConfig, Field, Gvk, HttpResponse, Operation,
    OperationCategory, OperationType, SampleConfig,
};
pub use version::ApiVersion;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a documentation run
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Could not load {path} as an api-spec: {reason}")]
    SpecLoad { path: PathBuf, reason: String },

    #[error("Could not locate group for definition {name}")]
    DefinitionName { name: String },

    #[error(
        "Found multiple matching definitions [{first}, {second}] for operation key: {operation_id}"
    )]
    AmbiguousOperation {
        operation_id: String,
        first: String,
        second: String,
    },

    #[error("Failed to read config file {path}: {reason}")]
    MissingConfig { path: PathBuf, reason: String },

    #[error("Invalid {extension} extension on {owner}: {reason}")]
    InvalidExtension {
        extension: String,
        owner: String,
        reason: String,
    },

    #[error("Invalid operation template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("{0} spec/reference mismatch(es) found and errors are not allowed")]
    Diagnostics(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for documentation operations
pub type Result<T> = std::result::Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_operation_names_everything() {
        let err = DocsError::AmbiguousOperation {
            operation_id: "createAppsV1NamespacedDeployment".to_string(),
            first: "apps/v1/Deployment".to_string(),
            second: "extensions/v1/Deployment".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("createAppsV1NamespacedDeployment"));
        assert!(msg.contains("apps/v1/Deployment"));
        assert!(msg.contains("extensions/v1/Deployment"));
    }

    #[test]
    fn test_definition_name_error() {
        let err = DocsError::DefinitionName {
            name: "com.example.Widget".to_string(),
        };
        assert!(err.to_string().contains("com.example.Widget"));
    }
}
