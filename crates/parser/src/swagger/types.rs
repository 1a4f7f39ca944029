//! Swagger 2.0 type definitions
//!
//! Only the parts that feed the documentation model are represented.
//! Maps are ordered so that every pass over them is deterministic.

use apidocs_gen_common::{DocsError, Gvk, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Group/version/kind triple extension
pub const GVK_EXTENSION: &str = "x-kubernetes-group-version-kind";
/// Plural resource name extension
pub const RESOURCE_EXTENSION: &str = "x-kubernetes-resource";
pub const PATCH_STRATEGY_EXTENSION: &str = "x-kubernetes-patch-strategy";
pub const PATCH_MERGE_KEY_EXTENSION: &str = "x-kubernetes-patch-merge-key";

const DEFINITION_REF_PREFIX: &str = "#/definitions/";
const PARAMETER_REF_PREFIX: &str = "#/parameters/";

/// Swagger document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwaggerSpec {
    /// Swagger version (always "2.0")
    #[serde(default)]
    pub swagger: String,

    #[serde(default)]
    pub info: Info,

    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,

    #[serde(default)]
    pub definitions: BTreeMap<String, Schema>,

    /// Shared parameters referenced with `#/parameters/<name>`
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,
}

/// Operations available on one path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,

    /// Parameters shared by every operation on this path
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Present operations with their upper-case HTTP method
    pub fn operations(&self) -> Vec<(&'static str, &Operation)> {
        [
            ("GET", &self.get),
            ("DELETE", &self.delete),
            ("PATCH", &self.patch),
            ("PUT", &self.put),
            ("POST", &self.post),
            ("HEAD", &self.head),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
        .collect()
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Responses keyed by status code (or `default`)
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Extensions (x-kubernetes-*, etc.)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Operation {
    /// The operation's group/version/kind, carried as a single object
    ///
    /// Only a non-object payload or a non-string group is rejected.
    pub fn gvk(&self) -> Result<Option<Gvk>> {
        let Some(value) = self.extensions.get(GVK_EXTENSION) else {
            return Ok(None);
        };
        let object = value
            .as_object()
            .ok_or_else(|| invalid_extension(&self.operation_id, "expected an object"))?;
        gvk_from_object(object, &self.operation_id).map(Some)
    }
}

/// Operation parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,

    /// Location: path, query, body, header or formData
    #[serde(rename = "in")]
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,

    /// Schema of a body parameter
    #[serde(default)]
    pub schema: Option<Schema>,

    /// Primitive type of a non-body parameter
    #[serde(rename = "type")]
    #[serde(default)]
    pub param_type: Option<String>,

    /// Reference to a shared parameter
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,
}

/// Response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Schema definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Reference, e.g. `#/definitions/io.k8s.api.core.v1.PodSpec`
    #[serde(rename = "$ref")]
    #[serde(default)]
    pub ref_path: Option<String>,

    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    /// Element schema of an array
    #[serde(default)]
    pub items: Option<Box<Schema>>,

    #[serde(default)]
    pub required: Vec<String>,

    /// Extensions (x-kubernetes-*, etc.)
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Schema {
    /// Name of the referenced definition, if this schema is a reference
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITION_REF_PREFIX))
            .filter(|name| !name.is_empty())
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }

    /// String-valued extension
    pub fn extension_str(&self, key: &str) -> Option<&str> {
        self.extensions.get(key).and_then(Value::as_str)
    }

    /// First object in the group/version/kind list carried by a definition
    ///
    /// Payloads that are not a list, and entries that are not objects, are
    /// ignored. A non-string group is rejected.
    pub fn gvk(&self, owner: &str) -> Result<Option<Gvk>> {
        let Some(Value::Array(items)) = self.extensions.get(GVK_EXTENSION) else {
            return Ok(None);
        };
        items
            .iter()
            .find_map(Value::as_object)
            .map(|object| gvk_from_object(object, owner))
            .transpose()
    }
}

impl SwaggerSpec {
    /// Follow a `#/parameters/<name>` reference, returning the parameter itself otherwise
    pub fn resolve_parameter<'a>(&'a self, param: &'a Parameter) -> Option<&'a Parameter> {
        match param.ref_path.as_deref() {
            Some(ref_path) => ref_path
                .strip_prefix(PARAMETER_REF_PREFIX)
                .and_then(|name| self.parameters.get(name)),
            None => Some(param),
        }
    }
}

fn invalid_extension(owner: &str, reason: &str) -> DocsError {
    DocsError::InvalidExtension {
        extension: GVK_EXTENSION.to_string(),
        owner: owner.to_string(),
        reason: reason.to_string(),
    }
}

fn gvk_from_object(object: &Map<String, Value>, owner: &str) -> Result<Gvk> {
    let group = match object.get("group") {
        Some(Value::String(group)) => group.clone(),
        Some(_) => return Err(invalid_extension(owner, "group is not a string")),
        None => String::new(),
    };
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Ok(Gvk::new(group, text("version"), text("kind")))
}
