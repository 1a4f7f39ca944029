//! Type mapping from schema names to group/version/kind
//!
//! Definition names are fully qualified dotted paths such as
//! `io.k8s.api.apps.v1.Deployment`. The group, version and kind are read
//! positionally from the end of the name.

use crate::swagger::Schema;
use apidocs_gen_common::{DocsError, Gvk, Result};

/// Maps schema names and schemas to their identity and display type
pub struct TypeMapper;

impl TypeMapper {
    /// Guess the (group, version, kind) of a definition name
    ///
    /// Returns `Ok(None)` for utility types that carry no identity.
    ///
    /// # Examples
    /// ```
    /// use apidocs_gen_parser::TypeMapper;
    ///
    /// let gvk = TypeMapper::guess_gvk("io.k8s.api.apps.v1.Deployment").unwrap().unwrap();
    /// assert_eq!(gvk.key(), "apps.v1.Deployment");
    ///
    /// let quantity = TypeMapper::guess_gvk("io.k8s.apimachinery.pkg.api.resource.Quantity")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(quantity.group, "core");
    ///
    /// assert!(TypeMapper::guess_gvk("io.k8s.apimachinery.pkg.util.intstr.IntOrString")
    ///     .unwrap()
    ///     .is_none());
    /// ```
    pub fn guess_gvk(name: &str) -> Result<Option<Gvk>> {
        let parts: Vec<&str> = name.split('.').collect();
        let n = parts.len();
        // `api.<version>.<kind>` is the shortest accepted shape
        if n < 3 || (n == 3 && parts[0] != "api") {
            return Err(DocsError::DefinitionName {
                name: name.to_string(),
            });
        }

        let (kind, version) = (parts[n - 1], parts[n - 2]);
        if parts[n - 3] == "api" {
            // io.k8s.apimachinery.pkg.api.resource.Quantity
            Ok(Some(Gvk::new("core", version, kind)))
        } else if parts[n - 4] == "api" || parts[n - 4] == "apis" {
            // io.k8s.api.core.v1.Pod, io.k8s.apimachinery.pkg.apis.meta.v1.Status
            Ok(Some(Gvk::new(parts[n - 3], version, kind)))
        } else if parts[n - 3] == "util" || parts[n - 3] == "pkg" {
            // io.k8s.apimachinery.pkg.util.intstr.IntOrString
            Ok(None)
        } else {
            Err(DocsError::DefinitionName {
                name: name.to_string(),
            })
        }
    }

    /// Identity of the definition a schema refers to, looking through arrays
    pub fn schema_gvk(schema: &Schema) -> Option<Gvk> {
        if let Some(name) = schema.ref_name() {
            return Self::guess_gvk(name).ok().flatten();
        }
        if schema.is_array() {
            return schema.items.as_deref().and_then(Self::schema_gvk);
        }
        None
    }

    /// Display type: the kind for references, `<type> array` for arrays,
    /// otherwise the primitive type
    ///
    /// # Examples
    /// ```
    /// use apidocs_gen_parser::TypeMapper;
    /// use apidocs_gen_parser::swagger::Schema;
    ///
    /// let schema: Schema = serde_json::from_str(
    ///     r##"{"type": "array", "items": {"$ref": "#/definitions/io.k8s.api.core.v1.Container"}}"##,
    /// ).unwrap();
    /// assert_eq!(TypeMapper::type_name(&schema), "Container array");
    /// ```
    pub fn type_name(schema: &Schema) -> String {
        if let Some(name) = schema.ref_name() {
            return match Self::guess_gvk(name) {
                Ok(Some(gvk)) => gvk.kind,
                // Utility types keep their short name
                _ => name.rsplit('.').next().unwrap_or(name).to_string(),
            };
        }
        if schema.is_array() {
            let inner = schema
                .items
                .as_deref()
                .map(Self::type_name)
                .unwrap_or_else(|| "object".to_string());
            return format!("{inner} array");
        }
        schema
            .schema_type
            .clone()
            .unwrap_or_else(|| "object".to_string())
    }

    /// True when the schema refers to a modelled definition
    pub fn is_complex(schema: &Schema) -> bool {
        Self::schema_gvk(schema).is_some()
    }
}
