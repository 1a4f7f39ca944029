//! Writer abstraction shared by the output backends
//!
//! The assembler drives a [`DocWriter`] through a fixed sequence of calls;
//! each backend decides how fragments land on disk and how they are
//! stitched together in [`DocWriter::finalize`].

use apidocs_gen_common::{Definition, Resource, Result, RunOptions};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Output backend
#[cfg_attr(test, mockall::automock)]
pub trait DocWriter {
    /// File extension of fragments, including the dot
    fn extension(&self) -> &'static str;

    /// Fallback content of a static section page
    fn default_static_content(&self, title: &str) -> String;

    fn write_overview(&mut self) -> Result<()>;

    /// Start a ToC category; `file` is the include name without extension
    fn write_resource_category(&mut self, name: &str, file: &str) -> Result<()>;

    fn write_resource(&mut self, resource: &Resource) -> Result<()>;

    fn write_definitions_overview(&mut self) -> Result<()>;

    fn write_definition(&mut self, definition: &Definition) -> Result<()>;

    fn write_old_versions_overview(&mut self) -> Result<()>;

    /// Emit the aggregate output (navigation and index, or manifest)
    fn finalize(&mut self) -> Result<()>;
}

/// Table-of-contents node of the HTML navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocItem {
    pub level: u8,
    pub title: String,
    pub link: String,
    /// Fragment file under `includes/`, if this node has one
    pub file: Option<String>,
    pub sub_sections: Vec<TocItem>,
}

impl TocItem {
    pub fn new(level: u8, title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            link: link.into(),
            ..Default::default()
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Headings rendered in bold carry `strong` in their anchor
    pub fn is_strong(&self) -> bool {
        self.link.contains("strong")
    }
}

/// `generated_<kind>_<version>_<group>_definition`
pub fn definition_file_name(definition: &Definition) -> String {
    format!(
        "generated_{}_{}_{}_definition",
        definition.name.to_lowercase().replace('.', "_"),
        definition.version,
        definition.group
    )
}

/// `generated_<kind>_<version>_<group>_concept`
pub fn concept_file_name(definition: &Definition) -> String {
    format!(
        "generated_{}_{}_{}_concept",
        definition.name.to_lowercase().replace('.', "_"),
        definition.version,
        definition.group
    )
}

/// Path of fragment `name` under `includes/`
pub fn include_path(options: &RunOptions, name: &str, extension: &str) -> PathBuf {
    options.includes_dir().join(format!("_{name}{extension}"))
}

/// Write a fragment under `includes/`
pub fn write_include(
    options: &RunOptions,
    name: &str,
    extension: &str,
    content: &str,
) -> Result<PathBuf> {
    let path = include_path(options, name, extension);
    fs::write(&path, content)?;
    debug!(path = %path.display(), "wrote fragment");
    Ok(path)
}

/// Copy `static_includes/<location>` into `includes/`, or write `default` there
pub fn write_static_file(options: &RunOptions, location: &str, default: &str) -> Result<()> {
    let target = options.includes_dir().join(location);
    let source = options.static_includes_dir().join(location);
    if source.is_file() {
        debug!(source = %source.display(), "using static include");
        fs::copy(&source, &target)?;
    } else {
        fs::write(&target, default)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidocs_gen_common::ApiVersion;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> RunOptions {
        let options = RunOptions::new(dir.path());
        fs::create_dir_all(options.includes_dir()).unwrap();
        options
    }

    #[test]
    fn test_file_names() {
        let definition = Definition {
            name: "Deployment".to_string(),
            group: "apps".to_string(),
            version: ApiVersion::new("v1"),
            ..Default::default()
        };
        assert_eq!(
            definition_file_name(&definition),
            "generated_deployment_v1_apps_definition"
        );
        assert_eq!(
            concept_file_name(&definition),
            "generated_deployment_v1_apps_concept"
        );
    }

    #[test]
    fn test_static_file_default() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        write_static_file(&options, "_overview.md", "# default").unwrap();
        let written = fs::read_to_string(options.includes_dir().join("_overview.md")).unwrap();
        assert_eq!(written, "# default");
    }

    #[test]
    fn test_static_file_override() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        fs::create_dir_all(options.static_includes_dir()).unwrap();
        fs::write(options.static_includes_dir().join("_overview.md"), "# custom").unwrap();

        write_static_file(&options, "_overview.md", "# default").unwrap();
        let written = fs::read_to_string(options.includes_dir().join("_overview.md")).unwrap();
        assert_eq!(written, "# custom");
    }

    #[test]
    fn test_toc_item_strong() {
        assert!(TocItem::new(1, "DEFINITIONS", "-strong-definitions-strong-").is_strong());
        assert!(!TocItem::new(2, "Pod v1 core", "pod-v1-core").is_strong());
    }
}
