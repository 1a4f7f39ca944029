//! API reference model construction from Swagger specifications
//!
//! This crate turns a directory of Swagger 2.0 documents plus the YAML
//! configuration into a cross-referenced model of the API.
//!
//! ## Pipeline
//!
//! Each stage completes before the next one starts:
//! - load `config.yaml` (optional in tag-driven mode) and every spec document
//! - index definitions: fields, version ranking, references, inlining
//! - resolve the table of contents, or generate it from the definitions
//! - index operations and attach them to definitions
//! - sort and de-duplicate back-references, prune the generated ToC
//!
//! ```rust,ignore
//! use apidocs_gen_common::RunOptions;
//! use apidocs_gen_parser::ApiReference;
//!
//! let reference = ApiReference::load(&RunOptions::new("docs").with_tags(true))?;
//! println!("{} definitions", reference.definitions.len());
//! ```

pub mod definitions;
pub mod examples;
mod operation_mapper;
pub mod swagger;
pub mod toc;
mod type_mapper;

pub use definitions::Definitions;
pub use examples::ExampleLoader;
pub use operation_mapper::{
    is_allowed_unmatched, is_metadata_operation, split_subresource_path, OperationMatcher,
    OperationTemplate, Operations,
};
pub use type_mapper::TypeMapper;

use apidocs_gen_common::{Config, Diagnostics, Result, RunOptions};
use swagger::SpecLoader;
use tracing::debug;

/// Fully indexed API reference, read-only once loaded
#[derive(Debug)]
pub struct ApiReference {
    pub config: Config,
    pub definitions: Definitions,
    pub operations: Operations,
    pub diagnostics: Diagnostics,
}

impl ApiReference {
    /// Load configuration and specs from `options.config_dir` and index them
    pub fn load(options: &RunOptions) -> Result<Self> {
        let config = Config::load(options)?;
        let specs = SpecLoader::new(options.spec_dir()).load()?;
        Self::from_specs(config, &specs, options)
    }

    /// Index already loaded documents
    pub fn from_specs(
        mut config: Config,
        specs: &[swagger::SwaggerSpec],
        options: &RunOptions,
    ) -> Result<Self> {
        let mut diagnostics = Diagnostics::new();
        let mut definitions = Definitions::from_specs(specs, &mut diagnostics)?;

        if options.use_tags && config.example_location.is_empty() {
            config.example_location = "examples".to_string();
        }
        let examples = ExampleLoader::new(config.example_dir(&options.config_dir));

        if options.use_tags {
            toc::generate_from_tags(&mut config, &mut definitions, &examples, &mut diagnostics);
        } else {
            toc::resolve_explicit(&mut config, &mut definitions, &examples, &mut diagnostics);
        }

        let operations = Operations::build(
            specs,
            &config.operation_categories,
            &mut definitions,
            &examples,
            options,
            &mut diagnostics,
        )?;

        definitions.clean_up();
        if options.use_tags {
            toc::prune(&mut config, &definitions);
        }

        debug!(
            definitions = definitions.len(),
            operations = operations.len(),
            diagnostics = diagnostics.len(),
            "api reference loaded"
        );
        Ok(Self {
            config,
            definitions,
            operations,
            diagnostics,
        })
    }
}
