//! Integration tests for operation indexing and categorisation

use apidocs_gen_common::config::default_operation_categories;
use apidocs_gen_common::{Config, Diagnostic, DocsError, RunOptions};
use apidocs_gen_parser::swagger::{SpecLoader, SwaggerSpec};
use apidocs_gen_parser::ApiReference;
use pretty_assertions::assert_eq;

const DEPLOYMENT_SPEC: &str = r##"{
  "swagger": "2.0",
  "paths": {
    "/apis/apps/v1/namespaces/{namespace}/deployments": {
      "parameters": [
        {"name": "namespace", "in": "path", "required": true, "type": "string"}
      ],
      "post": {
        "operationId": "createAppsV1NamespacedDeployment",
        "parameters": [
          {"name": "body", "in": "body", "required": true,
           "schema": {"$ref": "#/definitions/io.k8s.api.apps.v1.Deployment"}},
          {"$ref": "#/parameters/pretty"}
        ],
        "responses": {
          "200": {"description": "OK", "schema": {"$ref": "#/definitions/io.k8s.api.apps.v1.Deployment"}},
          "201": {"description": "Created", "schema": {"$ref": "#/definitions/io.k8s.api.apps.v1.Deployment"}},
          "default": {"description": "error"}
        },
        "x-kubernetes-group-version-kind": {"group": "apps", "version": "v1", "kind": "Deployment"}
      },
      "get": {
        "operationId": "listAppsV1NamespacedDeployment",
        "responses": {"200": {"description": "OK"}}
      }
    },
    "/apis/apps/v1/namespaces/{namespace}/deployments/{name}/scale": {
      "put": {
        "operationId": "replaceAppsV1NamespacedDeploymentScale",
        "responses": {"200": {"description": "OK"}}
      }
    },
    "/apis/apps/v1/namespaces/{namespace}/widgets/{name}/scale": {
      "put": {
        "operationId": "replaceAppsV1NamespacedWidgetScale",
        "responses": {"200": {"description": "OK"}}
      }
    },
    "/apis/apps/v1/": {
      "get": {
        "operationId": "getAppsV1APIResources",
        "responses": {"200": {"description": "OK"}}
      }
    }
  },
  "parameters": {
    "pretty": {"name": "pretty", "in": "query", "type": "string", "description": "If 'true', then the output is pretty printed."}
  },
  "definitions": {
    "io.k8s.api.apps.v1.Deployment": {},
    "io.k8s.api.apps.v1.DeploymentSpec": {},
    "io.k8s.api.apps.v1.ReplicaSet": {}
  }
}"##;

fn spec(json: &str) -> SwaggerSpec {
    SpecLoader::from_json(json).unwrap()
}

fn config() -> Config {
    Config {
        operation_categories: default_operation_categories(),
        ..Default::default()
    }
}

fn load(json: &str, options: &RunOptions) -> apidocs_gen_common::Result<ApiReference> {
    ApiReference::from_specs(config(), &[spec(json)], options)
}

#[test]
fn test_create_attaches_to_write_operations() {
    let reference = load(DEPLOYMENT_SPEC, &RunOptions::new("unused")).unwrap();
    let definitions = &reference.definitions;
    let deployment = definitions.get_by_version_kind("apps", "v1", "Deployment").unwrap();

    let create = reference.operations.get("createAppsV1NamespacedDeployment").unwrap();
    assert_eq!(create.definition, Some(deployment));
    assert_eq!(create.type_name(), "Create");
    assert_eq!(create.http_method, "POST");

    let categories = &definitions.get(deployment).operation_categories;
    assert_eq!(categories[0].name, "Write Operations");
    assert_eq!(categories[0].operations, vec!["createAppsV1NamespacedDeployment"]);
    assert_eq!(categories[1].name, "Read Operations");
    assert_eq!(categories[1].operations, vec!["listAppsV1NamespacedDeployment"]);
}

#[test]
fn test_parameters_and_responses() {
    let reference = load(DEPLOYMENT_SPEC, &RunOptions::new("unused")).unwrap();
    let create = reference.operations.get("createAppsV1NamespacedDeployment").unwrap();

    let path: Vec<&str> = create.path_params.iter().map(|f| f.name.as_str()).collect();
    let query: Vec<&str> = create.query_params.iter().map(|f| f.name.as_str()).collect();
    let body: Vec<&str> = create.body_params.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(path, vec!["namespace"]);
    assert_eq!(query, vec!["pretty"]);
    assert_eq!(body, vec!["body"]);
    assert_eq!(create.body_params[0].type_name, "Deployment");

    let codes: Vec<&str> = create.responses.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["200", "201"]);

    let deployment = reference
        .definitions
        .get_by_version_kind("apps", "v1", "Deployment")
        .unwrap();
    assert!(reference.definitions.get(deployment).found_in_operation);
}

#[test]
fn test_every_operation_has_one_owner() {
    let reference = load(DEPLOYMENT_SPEC, &RunOptions::new("unused")).unwrap();

    for operation in reference.operations.iter() {
        let owners = reference
            .definitions
            .iter()
            .filter(|(_, d)| {
                d.operation_categories
                    .iter()
                    .any(|c| c.operations.contains(&operation.id))
            })
            .count();
        assert!(owners <= 1, "{} listed by {} definitions", operation.id, owners);
        assert_eq!(owners == 1, operation.definition.is_some(), "{}", operation.id);
    }
}

const MULTI_GROUP_SPEC: &str = r##"{
  "swagger": "2.0",
  "paths": {
    "/apis/apps/v1/namespaces/{namespace}/deployments": {
      "post": {"operationId": "createAppsV1NamespacedDeployment", "responses": {}},
      "get": {"operationId": "listAppsV1NamespacedDeployment", "responses": {}},
      "delete": {"operationId": "deleteAppsV1CollectionNamespacedDeployment", "responses": {}}
    },
    "/apis/apps/v1/namespaces/{namespace}/deployments/{name}": {
      "get": {"operationId": "readAppsV1NamespacedDeployment", "responses": {}},
      "put": {"operationId": "replaceAppsV1NamespacedDeployment", "responses": {}},
      "patch": {"operationId": "patchAppsV1NamespacedDeployment", "responses": {}},
      "delete": {"operationId": "deleteAppsV1NamespacedDeployment", "responses": {}}
    },
    "/apis/apps/v1/namespaces/{namespace}/deployments/{name}/status": {
      "get": {"operationId": "readAppsV1NamespacedDeploymentStatus", "responses": {}},
      "put": {"operationId": "replaceAppsV1NamespacedDeploymentStatus", "responses": {}}
    },
    "/apis/apps/v1/deployments": {
      "get": {"operationId": "listAppsV1DeploymentForAllNamespaces", "responses": {}}
    },
    "/apis/apps/v1beta1/namespaces/{namespace}/deployments": {
      "post": {"operationId": "createAppsV1beta1NamespacedDeployment", "responses": {}}
    },
    "/apis/batch/v1/namespaces/{namespace}/jobs": {
      "post": {"operationId": "createBatchV1NamespacedJob", "responses": {}}
    },
    "/apis/batch/v1/watch/namespaces/{namespace}/jobs": {
      "get": {"operationId": "watchBatchV1NamespacedJobList", "responses": {}}
    },
    "/api/v1/namespaces/{namespace}/pods/{name}": {
      "get": {"operationId": "readCoreV1NamespacedPod", "responses": {}}
    },
    "/api/v1/namespaces/{namespace}/pods/{name}/eviction": {
      "post": {"operationId": "createCoreV1NamespacedPodEviction", "responses": {}}
    },
    "/api/v1/nodes/{name}": {
      "get": {"operationId": "readCoreV1Node", "responses": {}}
    },
    "/apis/rbac.authorization.k8s.io/v1/namespaces/{namespace}/roles": {
      "get": {
        "operationId": "listRbacAuthorizationV1NamespacedRole",
        "responses": {},
        "x-kubernetes-group-version-kind": {"group": "rbac.authorization.k8s.io", "version": "v1", "kind": "Role"}
      }
    },
    "/apis/rbac.authorization.k8s.io/v1/clusterroles/{name}": {
      "delete": {"operationId": "deleteRbacAuthorizationV1ClusterRole", "responses": {}}
    }
  },
  "definitions": {
    "io.k8s.api.apps.v1.Deployment": {},
    "io.k8s.api.apps.v1.DeploymentSpec": {},
    "io.k8s.api.apps.v1.DeploymentStatus": {},
    "io.k8s.api.apps.v1beta1.Deployment": {},
    "io.k8s.api.batch.v1.Job": {},
    "io.k8s.api.batch.v1.JobList": {},
    "io.k8s.api.core.v1.Pod": {},
    "io.k8s.api.core.v1.Node": {},
    "io.k8s.api.rbac.v1.Role": {},
    "io.k8s.api.rbac.v1.ClusterRole": {}
  }
}"##;

#[test]
fn test_every_claimed_operation_has_exactly_one_owner_across_groups() {
    let reference = load(MULTI_GROUP_SPEC, &RunOptions::new("unused")).unwrap();
    let definitions = &reference.definitions;

    let mut claimed = 0;
    for operation in reference.operations.iter() {
        let listings: Vec<(String, &str)> = definitions
            .iter()
            .flat_map(|(_, d)| {
                d.operation_categories
                    .iter()
                    .filter(|c| c.operations.contains(&operation.id))
                    .map(move |c| (d.key(), c.name.as_str()))
            })
            .collect();
        let occurrences: usize = definitions
            .iter()
            .flat_map(|(_, d)| d.operation_categories.iter())
            .map(|c| c.operations.iter().filter(|id| **id == operation.id).count())
            .sum();

        let owner = operation
            .definition
            .unwrap_or_else(|| panic!("{} was not claimed", operation.id));
        assert_eq!(listings.len(), 1, "{} listed by {:?}", operation.id, listings);
        assert_eq!(occurrences, 1, "{} listed more than once", operation.id);
        assert_eq!(listings[0].0, definitions.get(owner).key(), "{}", operation.id);
        claimed += 1;
    }
    assert_eq!(claimed, 18);
    assert!(reference.diagnostics.is_empty());

    let node = definitions.get_by_version_kind("core", "v1", "Node").unwrap();
    let role = definitions.get_by_version_kind("rbac", "v1", "ClusterRole").unwrap();
    let old = definitions.get_by_version_kind("apps", "v1beta1", "Deployment").unwrap();
    for (id, operation_id) in [
        (node, "readCoreV1Node"),
        (role, "deleteRbacAuthorizationV1ClusterRole"),
        (old, "createAppsV1beta1NamespacedDeployment"),
    ] {
        assert_eq!(
            reference.operations.get(operation_id).unwrap().definition,
            Some(id)
        );
    }
}

#[test]
fn test_unmatched_operations_are_reported_once() {
    let reference = load(DEPLOYMENT_SPEC, &RunOptions::new("unused")).unwrap();

    let unmatched: Vec<String> = reference
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::UnmatchedOperation { operation_id, .. } => Some(operation_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        unmatched,
        vec![
            "replaceAppsV1NamespacedDeploymentScale",
            "replaceAppsV1NamespacedWidgetScale",
        ]
    );

    let message = reference.diagnostics.iter().next().unwrap().to_string();
    assert!(message.starts_with("No Definition found for replaceAppsV1NamespacedDeploymentScale"));

    // Group metadata endpoints are never indexed
    assert!(reference.operations.get("getAppsV1APIResources").is_none());
}

#[test]
fn test_single_unknown_operation_yields_one_diagnostic() {
    let json = r#"{
      "swagger": "2.0",
      "paths": {
        "/apis/apps/v1/frobnicate": {
          "post": {"operationId": "frobnicateAppsV1Widgets", "responses": {}}
        }
      },
      "definitions": {"io.k8s.api.apps.v1.Deployment": {}}
    }"#;
    let reference = load(json, &RunOptions::new("unused")).unwrap();

    assert_eq!(reference.diagnostics.len(), 1);
    let message = reference.diagnostics.iter().next().unwrap().to_string();
    assert!(message.contains("frobnicateAppsV1Widgets"));
}

#[test]
fn test_allow_listed_operation_is_silent() {
    let json = r#"{
      "swagger": "2.0",
      "paths": {
        "/version/": {"get": {"operationId": "getCodeVersion", "responses": {}}}
      },
      "definitions": {}
    }"#;
    let reference = load(json, &RunOptions::new("unused")).unwrap();
    assert!(reference.diagnostics.is_empty());
}

#[test]
fn test_ambiguous_claim_is_fatal() {
    let json = r#"{
      "swagger": "2.0",
      "paths": {
        "/apis/rbac.authorization.k8s.io/v1/namespaces/{namespace}/roles/{name}": {
          "get": {"operationId": "readRbacAuthorizationV1NamespacedRole", "responses": {}}
        }
      },
      "definitions": {
        "io.k8s.api.rbac.v1.Role": {},
        "io.k8s.api.rbacAuthorization.v1.Role": {}
      }
    }"#;
    let err = load(json, &RunOptions::new("unused")).unwrap_err();
    match err {
        DocsError::AmbiguousOperation { operation_id, .. } => {
            assert_eq!(operation_id, "readRbacAuthorizationV1NamespacedRole");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_tag_mode_groups_subresources() {
    let options = RunOptions::new("unused").with_tags(true);
    let reference = load(DEPLOYMENT_SPEC, &options).unwrap();
    let definitions = &reference.definitions;
    let deployment = definitions.get_by_version_kind("apps", "v1", "Deployment").unwrap();

    let scale = reference
        .operations
        .get("replaceAppsV1NamespacedDeploymentScale")
        .unwrap();
    assert_eq!(scale.definition, Some(deployment));
    assert_eq!(scale.type_name(), "Update Scale");

    let names: Vec<&str> = definitions
        .get(deployment)
        .operation_categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Write Operations", "Read Operations", "Scale Operations"]);

    // The widget has no resource to hang off, and is reported exactly once
    let widget: Vec<&Diagnostic> = reference
        .diagnostics
        .iter()
        .filter(|d| d.to_string().contains("replaceAppsV1NamespacedWidgetScale"))
        .collect();
    assert_eq!(widget.len(), 1);
    assert!(matches!(widget[0], Diagnostic::UnknownSubresourceOwner { .. }));

    // Only definitions with operations survive in the generated ToC
    assert!(definitions.get(deployment).in_toc);
    let resources: Vec<&str> = reference
        .config
        .resource_categories
        .iter()
        .flat_map(|c| c.resources.iter().map(|r| r.name.as_str()))
        .collect();
    assert_eq!(resources, vec!["Deployment"]);
}

#[test]
fn test_resource_only_run_drops_operations() {
    let options = RunOptions::new("unused").with_operations(false);
    let reference = load(DEPLOYMENT_SPEC, &options).unwrap();

    assert!(reference.operations.is_empty());
    assert!(reference
        .definitions
        .iter()
        .all(|(_, d)| d.operation_categories.is_empty()));
}
