//! Template view models
//!
//! Views carry ready-to-print strings: descriptions are escaped and links
//! are rendered for the target syntax before a template sees them.

use crate::escape::{anchor, full_href_link, version_link, Syntax};
use crate::examples::{providers, ExampleProvider};
use apidocs_gen_common::{Definition, Field, Operation, Resource};
use apidocs_gen_parser::ApiReference;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    /// Display type with the referenced kind linked
    pub link: String,
    pub patch_strategy: String,
    pub patch_merge_key: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DefinitionView {
    pub name: String,
    pub version: String,
    pub group: String,
    pub group_display_name: String,
    pub link_id: String,
    /// `Kind version group`, anchored through the `anchor` filter
    pub title: String,
    pub description: String,
    pub other_versions: Vec<String>,
    pub appears_in: Vec<String>,
    pub fields: Vec<FieldView>,
}

/// One collapsible sample block
#[derive(Debug, Clone, Serialize)]
pub struct ExampleView {
    pub id: String,
    /// Tab name, e.g. `kubectl`
    pub label: String,
    pub tab: String,
    /// Fenced-code type, e.g. `bdocs-tab:kubectl_yaml`
    pub block_type: String,
    /// Highlighting language taken from the block type
    pub lang: String,
    pub msg: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub code: String,
    pub link: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationView {
    pub type_name: String,
    pub anchor: String,
    pub description: String,
    pub http: String,
    pub request_examples: Vec<ExampleView>,
    pub response_examples: Vec<ExampleView>,
    pub path_params: Vec<FieldView>,
    pub query_params: Vec<FieldView>,
    pub body_params: Vec<FieldView>,
    pub responses: Vec<ResponseView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub anchor: String,
    pub operations: Vec<OperationView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceView {
    pub name: String,
    pub title: String,
    pub description_warning: String,
    pub description_note: String,
    pub samples: Vec<ExampleView>,
    pub definition: DefinitionView,
    pub inline: Vec<DefinitionView>,
    pub categories: Vec<CategoryView>,
}

/// Anchor of an operation category heading within a resource page
pub fn category_anchor(category: &str, definition: &Definition) -> String {
    format!("-strong-{}-{}-strong-", anchor(category), definition.link_id())
}

/// Anchor of an operation heading within a resource page
pub fn operation_anchor(type_name: &str, definition: &Definition) -> String {
    format!("{}-{}", anchor(type_name), definition.link_id())
}

/// Builds views out of the indexed reference
pub struct ViewBuilder<'a> {
    reference: &'a ApiReference,
    syntax: Syntax,
    providers: Vec<Box<dyn ExampleProvider>>,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(reference: &'a ApiReference, syntax: Syntax) -> Self {
        Self {
            reference,
            syntax,
            providers: providers(),
        }
    }

    fn field(&self, field: &Field) -> FieldView {
        let definition = field.definition.map(|id| self.reference.definitions.get(id));
        FieldView {
            name: field.name.clone(),
            link: self.syntax.type_link(&field.type_name, definition),
            patch_strategy: field.patch_strategy.clone().unwrap_or_default(),
            patch_merge_key: field.patch_merge_key.clone().unwrap_or_default(),
            description: self.syntax.escape(&field.description),
        }
    }

    fn fields(&self, fields: &[Field]) -> Vec<FieldView> {
        fields.iter().map(|f| self.field(f)).collect()
    }

    pub fn definition(&self, definition: &Definition) -> DefinitionView {
        let definitions = &self.reference.definitions;
        let title = format!(
            "{} {} {}",
            definition.name,
            definition.version,
            definition.group_display_name()
        );
        DefinitionView {
            name: definition.name.clone(),
            version: definition.version.to_string(),
            group: definition.group.clone(),
            group_display_name: definition.group_display_name().to_string(),
            link_id: definition.link_id(),
            title,
            description: self.syntax.escape(&definition.description),
            other_versions: definition
                .other_versions
                .iter()
                .map(|id| version_link(definitions.get(*id)))
                .collect(),
            appears_in: definition
                .appears_in
                .iter()
                .map(|id| full_href_link(definitions.get(*id)))
                .collect(),
            fields: self.fields(&definition.fields),
        }
    }

    /// View of a resource page for its resolved definition
    pub fn resource(&self, resource: &Resource, definition: &Definition) -> ResourceView {
        let view = self.definition(definition);

        let samples = self
            .providers
            .iter()
            .filter_map(|p| {
                self.example(
                    p.as_ref(),
                    format!("{}-{}", p.label(), view.link_id),
                    p.sample_type(),
                    &definition.sample.note,
                    &p.sample(definition),
                )
            })
            .collect();

        let inline = definition
            .inline
            .iter()
            .map(|id| self.definition(self.reference.definitions.get(*id)))
            .collect();

        let categories = definition
            .operation_categories
            .iter()
            .map(|category| CategoryView {
                name: category.name.clone(),
                anchor: category_anchor(&category.name, definition),
                operations: category
                    .operations
                    .iter()
                    .filter_map(|id| self.reference.operations.get(id))
                    .map(|op| self.operation(op, definition))
                    .collect(),
            })
            .collect();

        ResourceView {
            name: resource.name.clone(),
            title: view.title.clone(),
            description_warning: resource.description_warning.clone(),
            description_note: resource.description_note.clone(),
            samples,
            definition: view,
            inline,
            categories,
        }
    }

    fn operation(&self, operation: &Operation, definition: &Definition) -> OperationView {
        let op_anchor = operation_anchor(operation.type_name(), definition);
        let mut request_examples = Vec::new();
        let mut response_examples = Vec::new();
        for provider in &self.providers {
            let label = provider.label();
            request_examples.extend(self.example(
                provider.as_ref(),
                format!("{label}-request-{op_anchor}"),
                provider.request_type(),
                provider.request_message(),
                &provider.request(operation),
            ));
            response_examples.extend(self.example(
                provider.as_ref(),
                format!("{label}-response-{op_anchor}"),
                provider.response_type(),
                provider.response_message(),
                &provider.response(operation),
            ));
        }

        OperationView {
            type_name: operation.type_name().to_string(),
            anchor: op_anchor,
            description: self.syntax.escape(&operation.description),
            http: operation.display_http(),
            request_examples,
            response_examples,
            path_params: self.fields(&operation.path_params),
            query_params: self.fields(&operation.query_params),
            body_params: self.fields(&operation.body_params),
            responses: operation
                .responses
                .iter()
                .map(|r| {
                    let field = self.field(&r.field);
                    ResponseView {
                        code: r.code.clone(),
                        link: field.link,
                        description: field.description,
                    }
                })
                .collect(),
        }
    }

    /// Sample block, skipped when there is no text
    fn example(
        &self,
        provider: &dyn ExampleProvider,
        id: String,
        block_type: &str,
        msg: &str,
        text: &str,
    ) -> Option<ExampleView> {
        if text.is_empty() {
            return None;
        }
        let lang = block_type.rsplit('_').next().unwrap_or_default().to_string();
        let text = match self.syntax {
            Syntax::Html => crate::escape::escape_html(text),
            Syntax::Markdown => text.to_string(),
        };
        Some(ExampleView {
            id,
            label: provider.label().to_string(),
            tab: provider.tab().to_string(),
            block_type: block_type.to_string(),
            lang,
            msg: msg.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidocs_gen_common::{Config, RunOptions};
    use apidocs_gen_parser::swagger::SpecLoader;

    const SPEC: &str = r##"{
        "swagger": "2.0",
        "definitions": {
            "io.k8s.api.apps.v1.Deployment": {
                "description": "Deployment <enables> updates; '*' matches all.",
                "properties": {
                    "spec": {"$ref": "#/definitions/io.k8s.api.apps.v1.DeploymentSpec"}
                }
            },
            "io.k8s.api.apps.v1.DeploymentSpec": {
                "properties": {
                    "replicas": {"type": "integer", "description": "Number of pods."}
                }
            }
        }
    }"##;

    fn reference() -> ApiReference {
        let spec = SpecLoader::from_json(SPEC).unwrap();
        let config = Config::from_yaml("resource_categories: []\n").unwrap();
        ApiReference::from_specs(config, &[spec], &RunOptions::new("unused")).unwrap()
    }

    #[test]
    fn test_anchors() {
        let reference = reference();
        let id = reference
            .definitions
            .get_by_version_kind("apps", "v1", "Deployment")
            .unwrap();
        let deployment = reference.definitions.get(id);
        assert_eq!(
            category_anchor("Write Operations", deployment),
            "-strong-write-operations-deployment-v1-apps-strong-"
        );
        assert_eq!(
            operation_anchor("Delete Collection", deployment),
            "delete-collection-deployment-v1-apps"
        );
    }

    #[test]
    fn test_resource_view_escapes_per_syntax() {
        let reference = reference();
        let id = reference
            .definitions
            .get_by_version_kind("apps", "v1", "Deployment")
            .unwrap();
        let deployment = reference.definitions.get(id);
        let resource = Resource::for_definition("Deployment", id);

        let html = ViewBuilder::new(&reference, Syntax::Html).resource(&resource, deployment);
        assert_eq!(html.title, "Deployment v1 apps");
        assert_eq!(
            html.definition.description,
            "Deployment &lt;enables&gt; updates; &#39;*&#39; matches all."
        );
        assert!(html.samples.is_empty());
        assert_eq!(html.inline.len(), 1);
        assert_eq!(html.inline[0].name, "DeploymentSpec");

        let markdown =
            ViewBuilder::new(&reference, Syntax::Markdown).resource(&resource, deployment);
        assert_eq!(
            markdown.definition.description,
            r"Deployment &lt;enables&gt; updates; &#39;\*&#39; matches all."
        );
    }
}
