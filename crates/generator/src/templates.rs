//! Template loading and rendering

use crate::escape;
use apidocs_gen_common::{DocsError, Result};
use std::collections::HashMap;
use std::error::Error as _;
use tera::{Context, Tera, Value};

/// Templates compiled into the binary, as (name, source)
const TEMPLATES: &[(&str, &str)] = &[
    ("html/macros.html", include_str!("../templates/html/macros.html.tera")),
    ("html/definition.html", include_str!("../templates/html/definition.html.tera")),
    ("html/resource.html", include_str!("../templates/html/resource.html.tera")),
    ("html/index.html", include_str!("../templates/html/index.html.tera")),
    ("markdown/macros.md", include_str!("../templates/markdown/macros.md.tera")),
    ("markdown/definition.md", include_str!("../templates/markdown/definition.md.tera")),
    ("markdown/resource.md", include_str!("../templates/markdown/resource.md.tera")),
];

/// Load all templates
///
/// Autoescaping is disabled: view models are escaped for their syntax
/// before rendering.
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("anchor", anchor_filter);

    tera.add_raw_templates(TEMPLATES.to_vec())
        .map_err(|e| DocsError::InvalidTemplate {
            template: "builtin".to_string(),
            reason: error_chain(&e),
        })?;

    Ok(tera)
}

/// Render `name`, flattening tera's error chain into the message
pub fn render(tera: &Tera, name: &str, context: &Context) -> Result<String> {
    tera.render(name, context)
        .map_err(|e| DocsError::Render(format!("{}: {}", name, error_chain(&e))))
}

fn error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Filter turning a heading into its anchor form
fn anchor_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("anchor filter expects a string"))?;
    Ok(Value::String(escape::anchor(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_templates() {
        let tera = load_templates().unwrap();
        let names: Vec<&str> = tera.get_template_names().collect();
        assert!(names.contains(&"html/resource.html"));
        assert!(names.contains(&"markdown/definition.md"));
    }

    #[test]
    fn test_anchor_filter() {
        let value = Value::String("Read Operations".to_string());
        let result = anchor_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(result, Value::String("read-operations".to_string()));

        assert!(anchor_filter(&Value::Bool(true), &HashMap::new()).is_err());
    }

    #[test]
    fn test_render_reports_template_name() {
        let tera = load_templates().unwrap();
        let err = render(&tera, "html/missing.html", &Context::new()).unwrap_err();
        assert!(err.to_string().contains("html/missing.html"));
    }
}
