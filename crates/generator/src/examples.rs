//! Example providers
//!
//! Each provider renders one tab of samples: the definition sample plus the
//! request and response of every operation.

use apidocs_gen_common::{Definition, Operation};

/// Address of a local `kubectl proxy`
const PROXY_ADDRESS: &str = "http://127.0.0.1:8001";

/// One tab of example content
pub trait ExampleProvider {
    /// CSS class of the tab, e.g. `bdocs-tab:kubectl`
    fn tab(&self) -> &'static str;
    fn request_message(&self) -> &'static str;
    fn response_message(&self) -> &'static str;
    /// Code-block type of requests, e.g. `bdocs-tab:kubectl_shell`
    fn request_type(&self) -> &'static str;
    fn response_type(&self) -> &'static str;
    fn sample_type(&self) -> &'static str;

    /// Sample manifest for a definition, empty when there is none
    fn sample(&self, definition: &Definition) -> String {
        definition.sample.sample.clone()
    }

    fn request(&self, operation: &Operation) -> String;

    fn response(&self, operation: &Operation) -> String {
        operation.example.response.clone()
    }

    /// Tab name without the `bdocs-tab:` prefix
    fn label(&self) -> &'static str {
        let tab = self.tab();
        tab.strip_prefix("bdocs-tab:").unwrap_or(tab)
    }
}

/// Shows manifests and `kubectl` invocations
pub struct KubectlExample;

impl ExampleProvider for KubectlExample {
    fn tab(&self) -> &'static str {
        "bdocs-tab:kubectl"
    }

    fn request_message(&self) -> &'static str {
        "`kubectl` Command"
    }

    fn response_message(&self) -> &'static str {
        "Output"
    }

    fn request_type(&self) -> &'static str {
        "bdocs-tab:kubectl_shell"
    }

    fn response_type(&self) -> &'static str {
        "bdocs-tab:kubectl_json"
    }

    fn sample_type(&self) -> &'static str {
        "bdocs-tab:kubectl_yaml"
    }

    fn request(&self, operation: &Operation) -> String {
        operation.example.request.clone()
    }
}

/// Shows raw HTTP calls through `kubectl proxy`
pub struct CurlExample;

impl ExampleProvider for CurlExample {
    fn tab(&self) -> &'static str {
        "bdocs-tab:curl"
    }

    fn request_message(&self) -> &'static str {
        "`curl` Command (*requires `kubectl proxy` to be running*)"
    }

    fn response_message(&self) -> &'static str {
        "Response Body"
    }

    fn request_type(&self) -> &'static str {
        "bdocs-tab:curl_shell"
    }

    fn response_type(&self) -> &'static str {
        "bdocs-tab:curl_json"
    }

    fn sample_type(&self) -> &'static str {
        "bdocs-tab:curl_yaml"
    }

    /// `curl` against the proxied API path, with the request body for writes
    fn request(&self, operation: &Operation) -> String {
        let example = &operation.example;
        if example.request.is_empty() {
            return String::new();
        }
        let mut path = operation.path.clone();
        if !example.namespace.is_empty() {
            path = path.replace("{namespace}", &example.namespace);
        }
        if !example.name.is_empty() {
            path = path.replace("{name}", &example.name);
        }

        let mut command = format!("$ curl -X {} '{}{}'", operation.http_method, PROXY_ADDRESS, path);
        if matches!(operation.http_method.as_str(), "POST" | "PUT" | "PATCH") {
            let content_type = if operation.http_method == "PATCH" {
                "application/strategic-merge-patch+json"
            } else {
                "application/yaml"
            };
            command.push_str(&format!(
                " -H 'Content-Type: {}' --data '\n{}'",
                content_type,
                example.request.trim_end()
            ));
        }
        command
    }
}

/// Providers in tab order
pub fn providers() -> Vec<Box<dyn ExampleProvider>> {
    vec![Box::new(KubectlExample), Box::new(CurlExample)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidocs_gen_common::ExampleConfig;

    fn create_deployment() -> Operation {
        Operation {
            id: "createAppsV1NamespacedDeployment".to_string(),
            path: "/apis/apps/v1/namespaces/{namespace}/deployments".to_string(),
            http_method: "POST".to_string(),
            example: ExampleConfig {
                name: "deployment-example".to_string(),
                namespace: "default".to_string(),
                request: "kind: Deployment\n".to_string(),
                response: "{\"kind\": \"Deployment\"}".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_kubectl_passes_fixture_through() {
        let op = create_deployment();
        assert_eq!(KubectlExample.request(&op), "kind: Deployment\n");
        assert_eq!(KubectlExample.response(&op), "{\"kind\": \"Deployment\"}");
        assert_eq!(KubectlExample.label(), "kubectl");
    }

    #[test]
    fn test_curl_builds_proxy_command() {
        let request = CurlExample.request(&create_deployment());
        assert!(request.starts_with(
            "$ curl -X POST 'http://127.0.0.1:8001/apis/apps/v1/namespaces/default/deployments'"
        ));
        assert!(request.contains("Content-Type: application/yaml"));
        assert!(request.ends_with("kind: Deployment'"));
    }

    #[test]
    fn test_curl_without_fixture_is_empty() {
        let mut op = create_deployment();
        op.example = ExampleConfig::default();
        assert!(CurlExample.request(&op).is_empty());
        assert!(CurlExample.response(&op).is_empty());
    }

    #[test]
    fn test_provider_order() {
        let tabs: Vec<&str> = providers().iter().map(|p| p.tab()).collect();
        assert_eq!(tabs, vec!["bdocs-tab:kubectl", "bdocs-tab:curl"]);
    }
}
