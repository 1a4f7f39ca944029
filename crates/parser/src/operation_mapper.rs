//! Operation classification and definition mapping
//!
//! Operation IDs follow a naming convention such as
//! `createAppsV1NamespacedDeployment`. Each configured operation type carries
//! a template (`create${group}${version}(Namespaced)?${resource}`) that is
//! compiled once and expanded for every definition; an operation whose ID
//! equals an expansion belongs to that definition.

use crate::definitions::Definitions;
use crate::examples::ExampleLoader;
use crate::swagger::{self, Parameter, PathItem, Response, SwaggerSpec};
use apidocs_gen_common::{
    title_case, DefId, Diagnostic, Diagnostics, DocsError, Field, HttpResponse, Operation,
    OperationCategory, OperationCategoryConfig, OperationType, Result, RunOptions,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

/// Known operations that no definition models
const ALLOWED_UNMATCHED: &[&str] = &[
    "connectCoreV1Patch",
    "createCoreV1NamespacedPodBinding",
    "getCodeVersion",
    "logFileHandler",
    "logFileListHandler",
    "NamespacedPodAttach",
    "NamespacedPodExec",
    "replaceCoreV1NamespaceFinalize",
    "V1beta1CertificateSigningRequestApproval",
    "V1beta1NamespacedReplicationControllerDummyScale",
];

/// API group metadata endpoints
const METADATA_SUFFIXES: &[&str] = &["APIGroup", "APIResources", "APIVersions"];

// /apis/<group>/<version>/namespaces/{namespace}/<resources>/{name}/<subresource>
static NAMESPACED_SUBRESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^/apis/([A-Za-z0-9\.]+)/([A-Za-z0-9]+)/namespaces/\{namespace\}/([A-Za-z0-9\.]+)/\{name\}/([A-Za-z0-9\.]+)$",
    )
    .expect("namespaced subresource pattern is valid")
});

// /apis/<group>/<version>/<resources>/{name}/<subresource>
static CLUSTER_SUBRESOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/apis/([A-Za-z0-9\.]+)/([A-Za-z0-9]+)/([A-Za-z0-9\.]+)/\{name\}/([A-Za-z0-9\.]+)$")
        .expect("cluster subresource pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group,
    Version,
    Resource,
    Namespaced,
}

/// A compiled operation-ID template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTemplate {
    segments: Vec<Segment>,
}

impl OperationTemplate {
    /// Compile a template with `${group}`, `${version}`, `${resource}`
    /// placeholders and an optional `(Namespaced)?` alternator
    ///
    /// # Examples
    /// ```
    /// use apidocs_gen_parser::OperationTemplate;
    ///
    /// let template = OperationTemplate::parse("create${group}${version}(Namespaced)?${resource}").unwrap();
    /// assert_eq!(
    ///     template.expand("Apps", "V1", "Deployment", true),
    ///     "createAppsV1NamespacedDeployment"
    /// );
    /// assert_eq!(template.expand("Apps", "V1", "Deployment", false), "createAppsV1Deployment");
    /// ```
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason: String| DocsError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;
        while !rest.is_empty() {
            let segment = if let Some(after) = rest.strip_prefix("(Namespaced)?") {
                rest = after;
                Segment::Namespaced
            } else if let Some(after) = rest.strip_prefix("${") {
                let end = after
                    .find('}')
                    .ok_or_else(|| invalid("unterminated placeholder".to_string()))?;
                let segment = match &after[..end] {
                    "group" => Segment::Group,
                    "version" => Segment::Version,
                    "resource" => Segment::Resource,
                    other => return Err(invalid(format!("unknown placeholder ${{{other}}}"))),
                };
                rest = &after[end + 1..];
                segment
            } else {
                let mut chars = rest.chars();
                literal.extend(chars.next());
                rest = chars.as_str();
                continue;
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// True when the template has a `(Namespaced)?` alternator
    pub fn is_namespaceable(&self) -> bool {
        self.segments.contains(&Segment::Namespaced)
    }

    /// Substitute the placeholders, resolving the alternator to `Namespaced` or nothing
    pub fn expand(&self, group: &str, version: &str, resource: &str, namespaced: bool) -> String {
        let mut id = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => id.push_str(s),
                Segment::Group => id.push_str(group),
                Segment::Version => id.push_str(version),
                Segment::Resource => id.push_str(resource),
                Segment::Namespaced if namespaced => id.push_str("Namespaced"),
                Segment::Namespaced => {}
            }
        }
        id
    }
}

/// Operation categories with their templates compiled
#[derive(Debug, Clone)]
pub struct OperationMatcher {
    categories: Vec<MatcherCategory>,
}

#[derive(Debug, Clone)]
struct MatcherCategory {
    name: String,
    types: Vec<(OperationType, OperationTemplate)>,
}

impl OperationMatcher {
    pub fn new(categories: &[OperationCategoryConfig]) -> Result<Self> {
        let categories = categories
            .iter()
            .map(|category| {
                let types = category
                    .operation_types
                    .iter()
                    .map(|ot| Ok((ot.clone(), OperationTemplate::parse(&ot.template)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(MatcherCategory {
                    name: category.name.clone(),
                    types,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { categories })
    }

    /// Candidate operation IDs per category, in probe order
    ///
    /// Namespaced variants are probed before cluster-scoped ones.
    pub fn candidates<'a>(
        &'a self,
        group: &str,
        version: &str,
        resource: &str,
    ) -> Vec<(&'a str, Vec<(&'a OperationType, String)>)> {
        self.categories
            .iter()
            .map(|category| {
                let mut ids = Vec::new();
                for (operation_type, template) in &category.types {
                    if template.is_namespaceable() {
                        ids.push((operation_type, template.expand(group, version, resource, true)));
                    }
                    ids.push((operation_type, template.expand(group, version, resource, false)));
                }
                (category.name.as_str(), ids)
            })
            .collect()
    }
}

/// True when an unmatched operation is a known unmodelled endpoint
pub fn is_allowed_unmatched(operation_id: &str) -> bool {
    ALLOWED_UNMATCHED.iter().any(|known| operation_id.contains(known))
}

/// True for API group metadata endpoints, which are never documented
pub fn is_metadata_operation(operation_id: &str) -> bool {
    METADATA_SUFFIXES
        .iter()
        .any(|suffix| operation_id.ends_with(suffix))
}

/// Split a subresource path into (group, version, resources, subresource)
///
/// Only the first dot-separated segment of the group is kept, matching the
/// short group names definitions use.
pub fn split_subresource_path(path: &str) -> Option<(String, String, String, String)> {
    let caps = NAMESPACED_SUBRESOURCE
        .captures(path)
        .or_else(|| CLUSTER_SUBRESOURCE.captures(path))?;
    let group = caps[1].split('.').next().unwrap_or_default().to_string();
    Some((group, caps[2].to_string(), caps[3].to_string(), caps[4].to_string()))
}

/// One operation as found in a document
struct VisitedOperation<'a> {
    spec: &'a SwaggerSpec,
    path: &'a str,
    method: &'static str,
    item: &'a PathItem,
    op: &'a swagger::Operation,
}

fn visit_operations(specs: &[SwaggerSpec]) -> Vec<VisitedOperation<'_>> {
    let mut visited = Vec::new();
    for spec in specs {
        for (path, item) in &spec.paths {
            for (method, op) in item.operations() {
                if op.operation_id.is_empty() {
                    debug!(path = %path, method, "skipping operation without id");
                    continue;
                }
                if is_metadata_operation(&op.operation_id) {
                    continue;
                }
                visited.push(VisitedOperation {
                    spec,
                    path,
                    method,
                    item,
                    op,
                });
            }
        }
    }
    visited
}

/// Map from the group as a resource names it to the group as operation IDs spell it
///
/// Built from each operation's group/version/kind extension: the title-cased
/// first segment maps to the concatenation of every title-cased segment, so
/// `rbac.authorization.k8s.io` gives `Rbac` -> `RbacAuthorizationK8sIo`.
fn group_aliases(visited: &[VisitedOperation<'_>]) -> Result<BTreeMap<String, String>> {
    let mut aliases = BTreeMap::new();
    for v in visited {
        let Some(gvk) = v.op.gvk()? else {
            continue;
        };
        let group = gvk.group.as_str();
        if group.is_empty() {
            continue;
        }
        let first = title_case(group.split('.').next().unwrap_or_default());
        let alias: String = group.split('.').map(title_case).collect();
        aliases.insert(first, alias);
    }
    Ok(aliases)
}

/// Parameters and responses of an operation, kept until fields are built
#[derive(Debug, Clone)]
struct OperationSource {
    parameters: Vec<Parameter>,
    responses: BTreeMap<String, Response>,
}

/// Registry of all operations keyed by operation ID
#[derive(Debug, Default)]
pub struct Operations {
    all: BTreeMap<String, Operation>,
    sources: BTreeMap<String, OperationSource>,
}

impl Operations {
    /// Index every operation and attach it to its definition
    pub fn build(
        specs: &[SwaggerSpec],
        categories: &[OperationCategoryConfig],
        definitions: &mut Definitions,
        examples: &ExampleLoader,
        options: &RunOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let visited = visit_operations(specs);
        let aliases = if options.munge_groups {
            group_aliases(&visited)?
        } else {
            BTreeMap::new()
        };

        let mut operations = Self::default();
        for v in &visited {
            let parameters = v
                .item
                .parameters
                .iter()
                .chain(&v.op.parameters)
                .filter_map(|p| {
                    let resolved = v.spec.resolve_parameter(p).cloned();
                    if resolved.is_none() {
                        debug!(operation = %v.op.operation_id, reference = ?p.ref_path, "unresolved parameter reference");
                    }
                    resolved
                })
                .collect();
            let id = v.op.operation_id.clone();
            operations.sources.insert(
                id.clone(),
                OperationSource {
                    parameters,
                    responses: v.op.responses.clone(),
                },
            );
            operations.all.insert(
                id.clone(),
                Operation {
                    id,
                    path: v.path.to_string(),
                    http_method: v.method.to_string(),
                    description: v.op.description.clone(),
                    ..Default::default()
                },
            );
        }
        debug!(count = operations.all.len(), "indexed operations");

        let matcher = OperationMatcher::new(categories)?;
        operations.map_to_definitions(&matcher, &aliases, definitions, examples, options, diagnostics)?;

        let mut reported = BTreeSet::new();
        if options.use_tags {
            reported = operations.map_subresources(&visited, definitions, diagnostics);
        }
        operations.report_unmatched(&reported, diagnostics);
        operations.init_parameters(definitions);

        // Still computed above: tag-driven ToC membership depends on them
        if !options.build_operations {
            operations.clear(definitions);
        }
        Ok(operations)
    }

    fn map_to_definitions(
        &mut self,
        matcher: &OperationMatcher,
        aliases: &BTreeMap<String, String>,
        definitions: &mut Definitions,
        examples: &ExampleLoader,
        options: &RunOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<()> {
        for id in definitions.ids() {
            let definition = definitions.get(id);
            if definition.is_inlined {
                continue;
            }
            let group = definition.operation_group_name();
            let group = aliases.get(&group).cloned().unwrap_or(group);
            let version = definition.version.capitalized();
            let kind = definition.name.clone();
            let mark_in_toc = options.use_tags && !definition.is_old_version;

            let mut categories = Vec::new();
            for (category_name, candidates) in matcher.candidates(&group, &version, &kind) {
                let mut category = OperationCategory {
                    name: category_name.to_string(),
                    operations: Vec::new(),
                };
                for (operation_type, key) in candidates {
                    let Some(operation) = self.all.get_mut(&key) else {
                        continue;
                    };
                    match operation.definition {
                        Some(owner) if owner == id => {
                            debug!(operation = %key, "operation already claimed by this definition");
                            continue;
                        }
                        Some(owner) => {
                            return Err(DocsError::AmbiguousOperation {
                                operation_id: key,
                                first: definitions.get(owner).gvk().to_string(),
                                second: definitions.get(id).gvk().to_string(),
                            })
                        }
                        None => {}
                    }
                    operation.operation_type = Some(operation_type.clone());
                    operation.definition = Some(id);
                    operation.example =
                        examples.operation_example(&kind, &operation_type.name, diagnostics);
                    category.operations.push(key);
                }
                if !category.operations.is_empty() {
                    categories.push(category);
                }
            }

            if !categories.is_empty() {
                let definition = definitions.get_mut(id);
                definition.operation_categories.extend(categories);
                if mark_in_toc {
                    definition.in_toc = true;
                }
            }
        }
        Ok(())
    }

    /// Attach unclaimed subresource operations to their resource by path
    ///
    /// Returns the IDs already reported as having no owner.
    fn map_subresources(
        &mut self,
        visited: &[VisitedOperation<'_>],
        definitions: &mut Definitions,
        diagnostics: &mut Diagnostics,
    ) -> BTreeSet<String> {
        let owners: BTreeMap<String, DefId> = definitions
            .iter()
            .map(|(id, d)| (format!("{}.{}.{}", d.group, d.version, d.resource_name()), id))
            .collect();

        let mut reported = BTreeSet::new();
        let mut by_owner: BTreeMap<DefId, BTreeMap<String, Vec<String>>> = BTreeMap::new();
        for v in visited {
            let id = &v.op.operation_id;
            let Some(operation) = self.all.get_mut(id) else {
                continue;
            };
            if operation.definition.is_some() {
                continue;
            }
            let Some((group, version, resources, sub)) = split_subresource_path(v.path) else {
                continue;
            };
            if sub == "status" {
                continue;
            }
            let key = format!("{group}.{version}.{resources}");
            let Some(&owner) = owners.get(&key) else {
                if reported.insert(id.clone()) {
                    diagnostics.push(Diagnostic::UnknownSubresourceOwner {
                        operation_id: id.clone(),
                        key,
                    });
                }
                continue;
            };
            operation.definition = Some(owner);
            by_owner
                .entry(owner)
                .or_default()
                .entry(sub)
                .or_default()
                .push(id.clone());
        }

        for (owner, subresources) in by_owner {
            for (sub, ids) in subresources {
                let title = title_case(&sub);
                for id in &ids {
                    if let Some(operation) = self.all.get_mut(id) {
                        operation.operation_type = Some(OperationType {
                            name: format!("{} {title}", operation.method_verb()),
                            template: String::new(),
                        });
                    }
                }
                definitions
                    .get_mut(owner)
                    .operation_categories
                    .push(OperationCategory {
                        name: format!("{title} Operations"),
                        operations: ids,
                    });
            }
        }
        reported
    }

    fn report_unmatched(&self, reported: &BTreeSet<String>, diagnostics: &mut Diagnostics) {
        for operation in self.all.values() {
            if operation.definition.is_some() || reported.contains(&operation.id) {
                continue;
            }
            if is_allowed_unmatched(&operation.id) {
                debug!(operation = %operation.id, "known unmodelled operation");
                continue;
            }
            diagnostics.push(Diagnostic::UnmatchedOperation {
                operation_id: operation.id.clone(),
                path: operation.path.clone(),
            });
        }
    }

    /// Build parameter and response fields
    fn init_parameters(&mut self, definitions: &mut Definitions) {
        let mut found_in_operation = Vec::new();
        for (id, operation) in self.all.iter_mut() {
            let Some(source) = self.sources.get(id) else {
                continue;
            };
            for param in &source.parameters {
                let field = parameter_field(definitions, param);
                match param.location.as_str() {
                    "path" => operation.path_params.push(field),
                    "query" => operation.query_params.push(field),
                    "body" => operation.body_params.push(field),
                    other => {
                        debug!(operation = %id, location = other, param = %param.name, "skipping parameter")
                    }
                }
            }

            for (code, response) in &source.responses {
                if code.parse::<u16>().is_err() {
                    continue;
                }
                let Some(schema) = &response.schema else {
                    continue;
                };
                let field = definitions.field_from_schema(code, &response.description, schema);
                found_in_operation.extend(field.definition);
                operation.responses.push(HttpResponse {
                    code: code.clone(),
                    field,
                });
            }
        }

        for id in found_in_operation {
            definitions.get_mut(id).found_in_operation = true;
        }
    }

    fn clear(&mut self, definitions: &mut Definitions) {
        self.all.clear();
        self.sources.clear();
        for id in definitions.ids() {
            definitions.get_mut(id).operation_categories.clear();
        }
    }

    pub fn get(&self, id: &str) -> Option<&Operation> {
        self.all.get(id)
    }

    /// Operations in ID order
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.all.values()
    }

    /// Operations that no definition claimed
    pub fn unmatched(&self) -> impl Iterator<Item = &Operation> {
        self.all.values().filter(|o| o.definition.is_none())
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

fn parameter_field(definitions: &Definitions, param: &Parameter) -> Field {
    match &param.schema {
        Some(schema) => definitions.field_from_schema(&param.name, &param.description, schema),
        None => Field {
            name: param.name.clone(),
            type_name: param.param_type.clone().unwrap_or_default(),
            description: param.description.replace('\n', " "),
            ..Default::default()
        },
    }
}
