//! Swagger 2.0 (OpenAPI v2) specification loading
//!
//! ## Sources
//! - From a cluster: `kubectl proxy && curl http://localhost:8001/openapi/v2`
//! - From GitHub: `https://github.com/kubernetes/kubernetes/blob/master/api/openapi-spec/swagger.json`
//!
//! Documents are placed under `<config_dir>/openapi-spec/`; every `*.json`
//! file there is loaded.
//!
//! ## Usage
//! ```rust,ignore
//! use apidocs_gen_parser::swagger::SpecLoader;
//!
//! let specs = SpecLoader::new("docs/openapi-spec").load()?;
//! ```

mod parser;
mod types;

pub use parser::SpecLoader;
pub use types::*;
