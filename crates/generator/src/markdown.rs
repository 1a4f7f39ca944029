//! Markdown backend
//!
//! Fragments are written under `includes/` and listed, in order, in
//! `manifest.json` for a static-site assembler to stitch together.

use crate::escape::Syntax;
use crate::templates::{load_templates, render};
use crate::views::ViewBuilder;
use crate::writer::{
    concept_file_name, definition_file_name, write_include, write_static_file, DocWriter,
};
use apidocs_gen_common::{Definition, Resource, Result, RunOptions};
use apidocs_gen_parser::ApiReference;
use serde::Serialize;
use std::fs;
use tera::{Context, Tera};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ManifestDoc {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
}

/// Ordered list of fragments plus document metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<ManifestDoc>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub copyright: String,
}

pub struct MarkdownWriter<'a> {
    reference: &'a ApiReference,
    options: &'a RunOptions,
    views: ViewBuilder<'a>,
    tera: Tera,
    manifest: Manifest,
}

impl<'a> MarkdownWriter<'a> {
    pub fn new(reference: &'a ApiReference, options: &'a RunOptions) -> Result<Self> {
        Ok(Self {
            reference,
            options,
            views: ViewBuilder::new(reference, Syntax::Markdown),
            tera: load_templates()?,
            manifest: Manifest::default(),
        })
    }

    fn add_doc(&mut self, filename: impl Into<String>) {
        self.manifest.docs.push(ManifestDoc {
            filename: filename.into(),
        });
    }

    fn write_section_page(&mut self, file: &str, title: &str) -> Result<()> {
        write_static_file(self.options, file, &self.default_static_content(title))?;
        self.add_doc(file);
        Ok(())
    }
}

impl DocWriter for MarkdownWriter<'_> {
    fn extension(&self) -> &'static str {
        ".md"
    }

    fn default_static_content(&self, title: &str) -> String {
        format!(
            "# <strong>{}</strong>\n\n----------\n\n",
            Syntax::Markdown.escape(title)
        )
    }

    /// The overview only describes operations, so it is left out without them
    fn write_overview(&mut self) -> Result<()> {
        if !self.options.build_operations {
            return Ok(());
        }
        self.write_section_page("_overview.md", "API Overview")
    }

    fn write_resource_category(&mut self, name: &str, file: &str) -> Result<()> {
        self.write_section_page(&format!("_{file}.md"), name)
    }

    fn write_resource(&mut self, resource: &Resource) -> Result<()> {
        let Some(id) = resource.definition else {
            warn!(resource = %resource.name, "Missing definition for item in TOC");
            return Ok(());
        };
        let reference = self.reference;
        let definition = reference.definitions.get(id);
        let view = self.views.resource(resource, definition);

        let mut context = Context::new();
        context.insert("r", &view);
        let page = render(&self.tera, "markdown/resource.md", &context)?;

        let name = concept_file_name(definition);
        write_include(self.options, &name, self.extension(), &page)?;
        self.add_doc(format!("_{name}.md"));
        Ok(())
    }

    fn write_definitions_overview(&mut self) -> Result<()> {
        self.write_section_page("_definitions.md", "Definitions")
    }

    fn write_definition(&mut self, definition: &Definition) -> Result<()> {
        let mut context = Context::new();
        context.insert("d", &self.views.definition(definition));
        let page = render(&self.tera, "markdown/definition.md", &context)?;

        let name = definition_file_name(definition);
        write_include(self.options, &name, self.extension(), &page)?;
        self.add_doc(format!("_{name}.md"));
        Ok(())
    }

    fn write_old_versions_overview(&mut self) -> Result<()> {
        self.write_section_page("_oldversions.md", "Old API Versions")
    }

    fn finalize(&mut self) -> Result<()> {
        self.manifest.title = self.options.title();
        self.manifest.copyright = self.options.copyright.clone();

        let path = self.options.manifest_path();
        fs::write(&path, serde_json::to_string_pretty(&self.manifest)?)?;
        info!(
            path = %path.display(),
            docs = self.manifest.docs.len(),
            "wrote markdown manifest"
        );
        Ok(())
    }
}
