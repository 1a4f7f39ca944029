//! Reference document generation
//!
//! This crate renders an indexed [`ApiReference`] through one of two
//! backends:
//! - [`HtmlWriter`]: fragments plus a single-page `build/index.html`
//! - [`MarkdownWriter`]: fragments plus `manifest.json`
//!
//! Both are driven by [`DocsGenerator`] in the same order: overview,
//! categorised resources, standalone definitions, old API versions.

mod escape;
mod examples;
mod html;
mod markdown;
mod templates;
mod views;
mod writer;

pub use escape::{escape_asterisks, escape_html, Syntax};
pub use examples::{providers, CurlExample, ExampleProvider, KubectlExample};
pub use html::HtmlWriter;
pub use markdown::{Manifest, ManifestDoc, MarkdownWriter};
pub use writer::{
    concept_file_name, definition_file_name, write_static_file, DocWriter, TocItem,
};

use apidocs_gen_common::{Backend, DefId, DocsError, Resource, Result, RunOptions};
use apidocs_gen_parser::ApiReference;
use std::fs;
use tracing::{debug, warn};

/// Document generator for one run
pub struct DocsGenerator<'a> {
    reference: &'a ApiReference,
    options: &'a RunOptions,
}

impl<'a> DocsGenerator<'a> {
    pub fn new(reference: &'a ApiReference, options: &'a RunOptions) -> Self {
        Self { reference, options }
    }

    /// Write every document with the configured backend
    ///
    /// Without `allow_errors`, any recorded diagnostic fails the run once
    /// output has been written.
    pub fn generate(&self) -> Result<()> {
        fs::create_dir_all(self.options.includes_dir())?;

        match self.options.backend {
            Backend::Html => {
                let mut writer = HtmlWriter::new(self.reference, self.options)?;
                self.write_with(&mut writer)?;
            }
            Backend::Markdown => {
                let mut writer = MarkdownWriter::new(self.reference, self.options)?;
                self.write_with(&mut writer)?;
            }
        }

        let diagnostics = self.reference.diagnostics.len();
        if !self.options.allow_errors && diagnostics > 0 {
            return Err(DocsError::Diagnostics(diagnostics));
        }
        Ok(())
    }

    /// Drive `writer` through the whole document
    pub fn write_with(&self, writer: &mut dyn DocWriter) -> Result<()> {
        let definitions = &self.reference.definitions;

        writer.write_overview()?;

        for category in &self.reference.config.resource_categories {
            writer.write_resource_category(&category.name, &category.include_name())?;
            for resource in &category.resources {
                if resource.definition.is_none() {
                    warn!(
                        resource = %resource.name,
                        group = %resource.group,
                        version = %resource.version,
                        "Missing definition for item in TOC"
                    );
                    continue;
                }
                writer.write_resource(resource)?;
            }
        }

        writer.write_definitions_overview()?;
        for id in self.standalone_definitions() {
            writer.write_definition(definitions.get(id))?;
        }

        writer.write_old_versions_overview()?;
        for id in self.old_definitions() {
            let resource = Resource::for_definition(definitions.get(id).name.clone(), id);
            writer.write_resource(&resource)?;
        }

        debug!("finalizing documents");
        writer.finalize()
    }

    /// Current definitions outside the ToC that are not inlined elsewhere
    fn standalone_definitions(&self) -> Vec<DefId> {
        let definitions = &self.reference.definitions;
        let mut ids: Vec<DefId> = definitions
            .iter()
            .filter(|(_, d)| !d.in_toc && !d.is_inlined && !d.is_old_version)
            .map(|(id, _)| id)
            .collect();
        definitions.sort_by_name(&mut ids);
        ids
    }

    /// Superseded versions, each documented as a resource page
    fn old_definitions(&self) -> Vec<DefId> {
        let definitions = &self.reference.definitions;
        let mut ids: Vec<DefId> = definitions
            .iter()
            .filter(|(_, d)| d.is_old_version && !d.is_inlined)
            .map(|(id, _)| id)
            .collect();
        definitions.sort_by_name(&mut ids);
        ids
    }
}

/// Generate documents for `reference` according to `options`
pub fn generate_docs(reference: &ApiReference, options: &RunOptions) -> Result<()> {
    DocsGenerator::new(reference, options).generate()
}
