//! Example fixtures
//!
//! Fixtures live under `<config_dir>/<example_location>/<kind>/`:
//! `<kind>.yaml` holds a definition sample and `<operation type>.yaml` an
//! operation request/response pair. The relative path is matched lowercased
//! with spaces replaced by underscores. A missing fixture is expected.

use apidocs_gen_common::{Diagnostic, Diagnostics, ExampleConfig, SampleConfig};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads example fixtures from one directory
#[derive(Debug, Clone)]
pub struct ExampleLoader {
    dir: PathBuf,
}

impl ExampleLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a fixture for `kind` named `name`
    pub fn fixture_path(&self, kind: &str, name: &str) -> PathBuf {
        let relative = format!("{kind}/{name}.yaml")
            .to_lowercase()
            .replace(' ', "_");
        self.dir.join(relative)
    }

    /// Sample payload for a definition
    pub fn definition_sample(&self, kind: &str, diagnostics: &mut Diagnostics) -> SampleConfig {
        self.read(&self.fixture_path(kind, kind), diagnostics)
    }

    /// Request/response example for an operation type of a definition
    pub fn operation_example(
        &self,
        kind: &str,
        operation_type: &str,
        diagnostics: &mut Diagnostics,
    ) -> ExampleConfig {
        self.read(&self.fixture_path(kind, operation_type), diagnostics)
    }

    fn read<T: DeserializeOwned + Default>(&self, path: &Path, diagnostics: &mut Diagnostics) -> T {
        let content = match fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => content,
            Ok(_) => return T::default(),
            Err(_) => {
                debug!(path = %path.display(), "no example fixture");
                return T::default();
            }
        };
        match serde_yaml::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.push(Diagnostic::InvalidExample {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fixture_path_is_normalised() {
        let loader = ExampleLoader::new("/docs/Examples");
        assert_eq!(
            loader.fixture_path("Deployment", "Delete Collection"),
            PathBuf::from("/docs/Examples/deployment/delete_collection.yaml")
        );
    }

    #[test]
    fn test_reads_fixtures() {
        let dir = TempDir::new().unwrap();
        let kind_dir = dir.path().join("deployment");
        fs::create_dir_all(&kind_dir).unwrap();
        fs::write(
            kind_dir.join("deployment.yaml"),
            "note: Deployment Config to run 3 nginx instances.\nsample: |\n  apiVersion: apps/v1\n  kind: Deployment\n",
        )
        .unwrap();
        fs::write(
            kind_dir.join("create.yaml"),
            "name: deployment-example\nnamespace: default\nrequest: |\n  kind: Deployment\nresponse: |\n  kind: Deployment\n",
        )
        .unwrap();

        let loader = ExampleLoader::new(dir.path());
        let mut diagnostics = Diagnostics::new();

        let sample = loader.definition_sample("Deployment", &mut diagnostics);
        assert_eq!(sample.note, "Deployment Config to run 3 nginx instances.");
        assert!(sample.sample.contains("kind: Deployment"));

        let example = loader.operation_example("Deployment", "Create", &mut diagnostics);
        assert_eq!(example.name, "deployment-example");
        assert_eq!(example.namespace, "default");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_fixture_is_silent() {
        let dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let sample = ExampleLoader::new(dir.path()).definition_sample("Pod", &mut diagnostics);
        assert_eq!(sample, SampleConfig::default());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_fixture_is_a_diagnostic() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pod")).unwrap();
        fs::write(dir.path().join("pod/pod.yaml"), "note: [unclosed").unwrap();

        let mut diagnostics = Diagnostics::new();
        ExampleLoader::new(dir.path()).definition_sample("Pod", &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
    }
}
