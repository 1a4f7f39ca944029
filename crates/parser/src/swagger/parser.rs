//! Swagger spec directory loader

use super::types::SwaggerSpec;
use apidocs_gen_common::{DocsError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Loads every `*.json` document below a directory
pub struct SpecLoader {
    dir: PathBuf,
}

impl SpecLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load all documents in path order
    ///
    /// A single unreadable or malformed file fails the whole load.
    pub fn load(&self) -> Result<Vec<SwaggerSpec>> {
        if !self.dir.is_dir() {
            return Err(DocsError::SpecLoad {
                path: self.dir.clone(),
                reason: "spec directory does not exist".to_string(),
            });
        }

        let mut specs = Vec::new();
        for entry in WalkDir::new(&self.dir).sort_by_file_name() {
            let entry = entry.map_err(|e| DocsError::SpecLoad {
                path: self.dir.clone(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("json")
            {
                continue;
            }
            specs.push(Self::from_file(path)?);
        }

        debug!(count = specs.len(), dir = %self.dir.display(), "loaded api specs");
        Ok(specs)
    }

    /// Load one Swagger document from a file
    pub fn from_file(path: &Path) -> Result<SwaggerSpec> {
        let content = fs::read_to_string(path).map_err(|e| DocsError::SpecLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&content).map_err(|e| DocsError::SpecLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Parse a Swagger document from a JSON string
    pub fn from_json(json: &str) -> Result<SwaggerSpec> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{"swagger": "2.0", "info": {"title": "Kubernetes", "version": "v1.9.0"}, "paths": {}}"#;

    #[test]
    fn test_loads_json_files_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("a.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a spec").unwrap();

        let specs = SpecLoader::new(dir.path()).load().unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].info.title, "Kubernetes");
    }

    #[test]
    fn test_malformed_file_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), MINIMAL).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let err = SpecLoader::new(dir.path()).load().unwrap_err();
        match err {
            DocsError::SpecLoad { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = SpecLoader::new(dir.path().join("openapi-spec")).load().unwrap_err();
        assert!(matches!(err, DocsError::SpecLoad { .. }));
    }
}
