//! Run options and table-of-contents configuration
//!
//! [`RunOptions`] carries every switch of a single run; it replaces
//! process-wide flags so that several runs can coexist in one process.
//! [`Config`] is loaded from `<config_dir>/config.yaml` and describes the
//! explicit table of contents plus any extra operation categories.

use crate::model::{DefId, OperationType};
use crate::{DocsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Output backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Monolithic `index.html` with a generated navigation script
    #[default]
    Html,
    /// Markdown fragments plus a JSON manifest for a static-site assembler
    Markdown,
}

/// Options of one documentation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory holding `config.yaml`, `openapi-spec/`, `static_includes/`
    /// and receiving `includes/`, `build/` and `manifest.json`
    pub config_dir: PathBuf,
    pub backend: Backend,
    /// Infer the table of contents from OpenAPI extension tags instead of `config.yaml`
    pub use_tags: bool,
    /// Include operation documentation
    pub build_operations: bool,
    /// Report spec/reference mismatches without failing the run
    pub allow_errors: bool,
    /// Map resource groups to the group names used in operation IDs
    pub munge_groups: bool,
    pub title: Option<String>,
    pub copyright: String,
}

impl RunOptions {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            backend: Backend::Html,
            use_tags: false,
            build_operations: true,
            allow_errors: true,
            munge_groups: true,
            title: None,
            copyright: "<a href=\"https://github.com/kubernetes/kubernetes\">Copyright 2016 The Kubernetes Authors.</a>".to_string(),
        }
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_tags(mut self, use_tags: bool) -> Self {
        self.use_tags = use_tags;
        self
    }

    pub fn with_operations(mut self, build_operations: bool) -> Self {
        self.build_operations = build_operations;
        self
    }

    pub fn with_allow_errors(mut self, allow_errors: bool) -> Self {
        self.allow_errors = allow_errors;
        self
    }

    /// Document title, defaulting by whether operations are documented
    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None if self.build_operations => "Kubernetes API Reference Docs".to_string(),
            None => "Kubernetes Resource Reference Docs".to_string(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.yaml")
    }

    pub fn spec_dir(&self) -> PathBuf {
        self.config_dir.join("openapi-spec")
    }

    pub fn static_includes_dir(&self) -> PathBuf {
        self.config_dir.join("static_includes")
    }

    pub fn includes_dir(&self) -> PathBuf {
        self.config_dir.join("includes")
    }

    pub fn build_dir(&self) -> PathBuf {
        self.config_dir.join("build")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.config_dir.join("manifest.json")
    }
}

/// Root of `config.yaml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_groups: Vec<String>,
    pub example_location: String,
    pub operation_categories: Vec<OperationCategoryConfig>,
    pub resource_categories: Vec<ResourceCategory>,
}

/// A named group of operation types
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OperationCategoryConfig {
    pub name: String,
    pub operation_types: Vec<OperationTypeConfig>,
}

/// Alias kept for readability at call sites that build categories by hand
pub type OperationTypeConfig = OperationType;

/// A titled section of the table of contents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceCategory {
    pub name: String,
    /// Base name of the static fragment introducing this category
    pub include: String,
    pub resources: Vec<Resource>,
    pub link_to_md: String,
}

impl ResourceCategory {
    /// Fragment base name, falling back to the category name
    pub fn include_name(&self) -> String {
        if !self.include.is_empty() {
            return self.include.clone();
        }
        self.name.to_lowercase().replace(' ', "_")
    }
}

/// A table-of-contents entry pointing at one definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Resource {
    /// Kind
    pub name: String,
    pub version: String,
    pub group: String,
    pub inline_definition: Vec<String>,
    pub description_warning: String,
    pub description_note: String,
    pub concept_guide: String,
    pub related_tasks: Vec<String>,
    pub include_description: String,
    pub link_to_md: String,

    /// Resolved definition
    #[serde(skip)]
    pub definition: Option<DefId>,
}

impl Resource {
    /// Bare resource page for a definition (old versions have no ToC entry)
    pub fn for_definition(name: impl Into<String>, id: DefId) -> Self {
        Self {
            name: name.into(),
            definition: Some(id),
            ..Default::default()
        }
    }
}

impl Config {
    /// Load `config.yaml`, or fall back to an empty config in tag-driven mode
    ///
    /// The built-in operation categories are always placed before any
    /// categories listed in the file.
    pub fn load(options: &RunOptions) -> Result<Self> {
        let path = options.config_file();
        let mut config = match fs::read_to_string(&path) {
            Ok(content) => Self::from_yaml(&content)?,
            Err(e) if options.use_tags => {
                tracing::debug!(path = %path.display(), error = %e, "no config file, using tags");
                Self::default()
            }
            Err(e) => {
                return Err(DocsError::MissingConfig {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let mut categories = default_operation_categories();
        categories.append(&mut config.operation_categories);
        config.operation_categories = categories;
        Ok(config)
    }

    /// Parse a config document without touching the built-in categories
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Directory of example fixtures
    pub fn example_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.example_location)
    }
}

fn operation_type(name: &str, template: &str) -> OperationType {
    OperationType {
        name: name.to_string(),
        template: template.to_string(),
    }
}

/// Write, Read and Status categories in declaration order
pub fn default_operation_categories() -> Vec<OperationCategoryConfig> {
    let write = OperationCategoryConfig {
        name: "Write Operations".to_string(),
        operation_types: vec![
            operation_type("Create", "create${group}${version}(Namespaced)?${resource}"),
            operation_type(
                "Create Eviction",
                "create${group}${version}(Namespaced)?${resource}Eviction",
            ),
            operation_type("Patch", "patch${group}${version}(Namespaced)?${resource}"),
            operation_type("Replace", "replace${group}${version}(Namespaced)?${resource}"),
            operation_type("Delete", "delete${group}${version}(Namespaced)?${resource}"),
            operation_type(
                "Delete Collection",
                "delete${group}${version}Collection(Namespaced)?${resource}",
            ),
        ],
    };

    let read = OperationCategoryConfig {
        name: "Read Operations".to_string(),
        operation_types: vec![
            operation_type("Read", "read${group}${version}(Namespaced)?${resource}"),
            operation_type("List", "list${group}${version}(Namespaced)?${resource}"),
            operation_type(
                "List All Namespaces",
                "list${group}${version}(Namespaced)?${resource}ForAllNamespaces",
            ),
            operation_type("Watch", "watch${group}${version}(Namespaced)?${resource}"),
            operation_type(
                "Watch List",
                "watch${group}${version}(Namespaced)?${resource}List",
            ),
            operation_type(
                "Watch List All Namespaces",
                "watch${group}${version}(Namespaced)?${resource}ListForAllNamespaces",
            ),
        ],
    };

    let status = OperationCategoryConfig {
        name: "Status Operations".to_string(),
        operation_types: vec![
            operation_type(
                "Patch Status",
                "patch${group}${version}(Namespaced)?${resource}Status",
            ),
            operation_type(
                "Read Status",
                "read${group}${version}(Namespaced)?${resource}Status",
            ),
            operation_type(
                "Replace Status",
                "replace${group}${version}(Namespaced)?${resource}Status",
            ),
        ],
    };

    vec![write, read, status]
}
