//! Semantic model of an API reference
//!
//! Definitions form a graph (fields refer to other definitions, definitions
//! list where they appear, which siblings are inlined and which other versions
//! exist). The graph is stored as an arena owned by the definitions index, and
//! edges are [`DefId`] handles into it.

use crate::ApiVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a [`Definition`] inside the definitions index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DefId(pub usize);

/// The (group, version, kind) identity triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Index key, `group.version.kind`
    pub fn key(&self) -> String {
        format!("{}.{}.{}", self.group, self.version, self.kind)
    }
}

impl fmt::Display for Gvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.version, self.kind)
    }
}

/// One API type at one group/version
#[derive(Debug, Clone, Default, Serialize)]
pub struct Definition {
    /// Display name, which is also the kind (e.g. `Deployment`)
    pub name: String,
    pub group: String,
    /// Full group name as served (e.g. `rbac.authorization.k8s.io`)
    pub group_full_name: String,
    pub version: ApiVersion,
    /// Plural resource name from `x-kubernetes-resource`, if present
    pub resource: Option<String>,
    /// Raw schema description
    pub description: String,

    /// Fields sorted by name
    pub fields: Vec<Field>,

    pub in_toc: bool,
    pub is_inlined: bool,
    pub is_old_version: bool,
    pub found_in_field: bool,
    pub found_in_operation: bool,

    /// Definitions documented together with this one (Spec, Status, List, ...)
    pub inline: Vec<DefId>,
    /// Definitions that have a field referring to this one
    pub appears_in: Vec<DefId>,
    /// Same kind, other versions
    pub other_versions: Vec<DefId>,
    /// Categorised operations whose resource this definition represents
    pub operation_categories: Vec<OperationCategory>,

    pub sample: SampleConfig,
}

impl Definition {
    pub fn gvk(&self) -> Gvk {
        Gvk::new(&self.group, self.version.as_str(), &self.name)
    }

    pub fn key(&self) -> String {
        self.gvk().key()
    }

    pub fn group_display_name(&self) -> &str {
        if !self.group_full_name.is_empty() {
            return &self.group_full_name;
        }
        if self.group.is_empty() || self.group == "core" {
            return "Core";
        }
        &self.group
    }

    /// Group name as it appears inside operation IDs, before alias mapping
    pub fn operation_group_name(&self) -> String {
        if self.group.eq_ignore_ascii_case("rbac") {
            return "RbacAuthorization".to_string();
        }
        title_case(&self.group)
    }

    /// Plural lowercase resource name used in REST paths
    pub fn resource_name(&self) -> String {
        if let Some(resource) = self.resource.as_deref().filter(|r| !r.is_empty()) {
            return resource.to_string();
        }
        let lower = self.name.to_lowercase();
        match lower.strip_suffix('y') {
            Some(stem) => format!("{stem}ies"),
            None => format!("{lower}s"),
        }
    }

    /// Anchor shared by every rendering of this definition
    pub fn link_id(&self) -> String {
        let group = self.group_full_name.to_lowercase().replace('.', "-");
        format!("{}-{}-{}", self.name, self.version, group).to_lowercase()
    }

    pub fn is_deprecated(&self) -> bool {
        self.description.starts_with("Deprecated. Please use")
    }
}

/// A named, typed member of a definition, or an operation parameter/response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Primitive name, kind name, or `<type> array`
    pub type_name: String,
    /// Raw description with newlines folded to spaces
    pub description: String,
    pub patch_strategy: Option<String>,
    pub patch_merge_key: Option<String>,
    /// Referenced definition for complex types
    pub definition: Option<DefId>,
}

/// One response of an operation, keyed by HTTP status code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpResponse {
    pub code: String,
    pub field: Field,
}

/// A high level operation type such as Read, Replace or Patch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationType {
    /// Display name
    pub name: String,
    /// Operation-ID template with `${group}`, `${version}`, `${resource}`
    /// placeholders and an optional `(Namespaced)?` alternator
    #[serde(rename = "match")]
    pub template: String,
}

/// Operations of one definition grouped under a category name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperationCategory {
    pub name: String,
    /// Operation IDs in match order
    pub operations: Vec<String>,
}

/// One HTTP endpoint
#[derive(Debug, Clone, Default, Serialize)]
pub struct Operation {
    pub id: String,
    pub path: String,
    pub http_method: String,
    pub description: String,
    /// Assigned once categorised
    pub operation_type: Option<OperationType>,
    /// Owning definition once matched
    pub definition: Option<DefId>,
    pub path_params: Vec<Field>,
    pub query_params: Vec<Field>,
    pub body_params: Vec<Field>,
    /// Responses sorted by code
    pub responses: Vec<HttpResponse>,
    pub example: ExampleConfig,
}

impl Operation {
    /// `METHOD /path`
    pub fn display_http(&self) -> String {
        format!("{} {}", self.http_method, self.path)
    }

    /// Verb used for categories synthesised from subresource paths
    pub fn method_verb(&self) -> &'static str {
        match self.http_method.as_str() {
            "GET" => "List",
            "POST" => "Create",
            "PATCH" => "Patch",
            "DELETE" => "Delete",
            "PUT" => "Update",
            _ => "",
        }
    }

    pub fn type_name(&self) -> &str {
        self.operation_type
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or_default()
    }
}

/// Example payload shown next to a definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub note: String,
    pub sample: String,
}

/// Example request/response for an operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExampleConfig {
    pub name: String,
    pub namespace: String,
    pub request: String,
    pub response: String,
    pub request_note: String,
    pub response_note: String,
}

/// Upper-case the first letter of every dot, dash or space separated word
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start {
            result.extend(ch.to_uppercase());
        } else {
            result.push(ch);
        }
        at_word_start = matches!(ch, '.' | '-' | ' ' | '_');
    }
    result
}
