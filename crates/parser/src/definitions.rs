//! Definition index
//!
//! One [`Definition`] per (group, version, kind), stored in an arena and
//! addressed by [`DefId`]. Construction runs the enrichment passes in order:
//! fields, version ranking, references, inlining.

use crate::swagger::{
    Schema, SwaggerSpec, PATCH_MERGE_KEY_EXTENSION, PATCH_STRATEGY_EXTENSION, RESOURCE_EXTENSION,
};
use crate::TypeMapper;
use apidocs_gen_common::{
    ApiVersion, DefId, Definition, Diagnostic, Diagnostics, Field, Gvk, Result,
};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Name templates of definitions documented inside their parent's page
pub const INLINE_TEMPLATES: &[(&str, &str)] = &[
    ("Spec", "${resource}Spec"),
    ("Status", "${resource}Status"),
    ("List", "${resource}List"),
    ("Strategy", "${resource}Strategy"),
    ("Rollback", "${resource}Rollback"),
    ("RollingUpdate", "RollingUpdate${resource}"),
    ("EventSource", "${resource}EventSource"),
];

/// Sibling names probed for inlining into `parent`
pub fn inlined_definition_names(parent: &str) -> Vec<String> {
    INLINE_TEMPLATES
        .iter()
        .map(|(_, template)| template.replace("${resource}", parent))
        .collect()
}

/// Registry of all definitions
#[derive(Debug, Default)]
pub struct Definitions {
    all: Vec<Definition>,
    schemas: Vec<Schema>,
    by_key: BTreeMap<String, DefId>,
    /// Same-kind definitions, newest version first
    by_kind: BTreeMap<String, Vec<DefId>>,
}

impl Definitions {
    /// Build and enrich the index from loaded documents
    pub fn from_specs(specs: &[SwaggerSpec], diagnostics: &mut Diagnostics) -> Result<Self> {
        let mut definitions = Self::load(specs)?;
        definitions.init_fields(diagnostics);
        definitions.rank_versions();
        definitions.init_appears_in();
        definitions.inline_pass();
        Ok(definitions)
    }

    fn load(specs: &[SwaggerSpec]) -> Result<Self> {
        let full_names = group_full_names(specs)?;

        let mut loaded: BTreeMap<String, (Definition, Schema)> = BTreeMap::new();
        for spec in specs {
            for (name, schema) in &spec.definitions {
                // Legacy aliases of types that moved to another package
                if schema.description.starts_with("Deprecated. Please use") {
                    continue;
                }
                if name.contains("JSONSchemaPropsOrStringArray") {
                    continue;
                }
                let Some(gvk) = TypeMapper::guess_gvk(name)? else {
                    continue;
                };

                let group_full_name = full_names
                    .get(&gvk.group)
                    .cloned()
                    .unwrap_or_else(|| gvk.group.clone());
                let definition = Definition {
                    name: gvk.kind.clone(),
                    group: gvk.group.clone(),
                    group_full_name,
                    version: ApiVersion::new(gvk.version.as_str()),
                    resource: schema.extension_str(RESOURCE_EXTENSION).map(str::to_string),
                    description: schema.description.clone(),
                    ..Default::default()
                };
                if loaded
                    .insert(gvk.key(), (definition, schema.clone()))
                    .is_some()
                {
                    debug!(key = %gvk.key(), name = %name, "definition replaced by later schema");
                }
            }
        }

        let mut definitions = Self::default();
        for (key, (definition, schema)) in loaded {
            let id = DefId(definitions.all.len());
            definitions
                .by_kind
                .entry(definition.name.clone())
                .or_default()
                .push(id);
            definitions.by_key.insert(key, id);
            definitions.all.push(definition);
            definitions.schemas.push(schema);
        }
        debug!(count = definitions.all.len(), "indexed definitions");
        Ok(definitions)
    }

    fn init_fields(&mut self, diagnostics: &mut Diagnostics) {
        for index in 0..self.all.len() {
            let mut fields = Vec::with_capacity(self.schemas[index].properties.len());
            for (name, property) in &self.schemas[index].properties {
                let mut field = self.field_from_schema(name, &property.description, property);
                field.patch_strategy = property
                    .extension_str(PATCH_STRATEGY_EXTENSION)
                    .map(str::to_string);
                field.patch_merge_key = property
                    .extension_str(PATCH_MERGE_KEY_EXTENSION)
                    .map(str::to_string);

                if field.definition.is_none() && TypeMapper::is_complex(property) {
                    diagnostics.push(Diagnostic::UnresolvedReference {
                        definition: self.all[index].key(),
                        field: name.clone(),
                        target: field.type_name.clone(),
                    });
                }
                fields.push(field);
            }
            self.all[index].fields = fields;
        }
    }

    /// Mark every same-kind definition but the newest as old
    fn rank_versions(&mut self) {
        let all = &self.all;
        for (kind, ids) in self.by_kind.iter_mut() {
            ids.sort_by(|a, b| {
                let (a, b) = (&all[a.0], &all[b.0]);
                b.version
                    .cmp(&a.version)
                    .then_with(|| a.group.cmp(&b.group))
            });
            if ids.len() > 1 {
                let versions: Vec<String> =
                    ids.iter().map(|id| all[id.0].key()).collect();
                debug!(kind = %kind, current = %versions[0], old = ?&versions[1..], "ranked versions");
            }
        }

        for ids in self.by_kind.values() {
            for (rank, id) in ids.iter().enumerate() {
                self.all[id.0].is_old_version = rank > 0;
            }
            for id in ids {
                let version = self.all[id.0].version.clone();
                let others: Vec<DefId> = ids
                    .iter()
                    .copied()
                    .filter(|other| self.all[other.0].version != version)
                    .collect();
                self.all[id.0].other_versions = others;
            }
        }
    }

    fn init_appears_in(&mut self) {
        for index in 0..self.all.len() {
            let referenced: Vec<DefId> = self.all[index]
                .fields
                .iter()
                .filter_map(|f| f.definition)
                .collect();
            for target in referenced {
                let target = &mut self.all[target.0];
                target.appears_in.push(DefId(index));
                target.found_in_field = true;
            }
        }
    }

    /// Attach conventionally named siblings (Spec, Status, List, ...) to their parent
    ///
    /// Running the pass again leaves every `inline` set unchanged.
    pub fn inline_pass(&mut self) {
        for index in 0..self.all.len() {
            let parent = &self.all[index];
            let children: Vec<DefId> = inlined_definition_names(&parent.name)
                .iter()
                .filter_map(|name| {
                    self.get_by_version_kind(&parent.group, parent.version.as_str(), name)
                })
                .collect();

            for child in children {
                if !self.all[index].inline.contains(&child) {
                    self.all[index].inline.push(child);
                }
                let child = &mut self.all[child.0];
                child.is_inlined = true;
                child.found_in_field = true;
            }
        }
    }

    /// Sort and de-duplicate back-references, sort fields by name
    pub fn clean_up(&mut self) {
        for index in 0..self.all.len() {
            let mut appears_in = std::mem::take(&mut self.all[index].appears_in);
            self.sort_by_name(&mut appears_in);
            appears_in.dedup();
            let definition = &mut self.all[index];
            definition.appears_in = appears_in;
            definition.fields.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Order by name, then newest version, then group
    pub fn sort_by_name(&self, ids: &mut [DefId]) {
        ids.sort_by(|a, b| self.compare_by_name(*a, *b));
    }

    fn compare_by_name(&self, a: DefId, b: DefId) -> Ordering {
        let (a, b) = (&self.all[a.0], &self.all[b.0]);
        a.name
            .cmp(&b.name)
            .then_with(|| b.version.cmp(&a.version))
            .then_with(|| a.group.cmp(&b.group))
    }

    /// Field for a schema-typed member, resolving its definition when modelled
    pub fn field_from_schema(&self, name: &str, description: &str, schema: &Schema) -> Field {
        Field {
            name: name.to_string(),
            type_name: TypeMapper::type_name(schema),
            description: description.replace('\n', " "),
            definition: self.get_for_schema(schema),
            ..Default::default()
        }
    }

    pub fn get(&self, id: DefId) -> &Definition {
        &self.all[id.0]
    }

    pub fn get_mut(&mut self, id: DefId) -> &mut Definition {
        &mut self.all[id.0]
    }

    /// Look up a definition by its primary key
    pub fn get_by_version_kind(&self, group: &str, version: &str, kind: &str) -> Option<DefId> {
        self.by_key
            .get(&Gvk::new(group, version, kind).key())
            .copied()
    }

    pub fn get_by_gvk(&self, gvk: &Gvk) -> Option<DefId> {
        self.by_key.get(&gvk.key()).copied()
    }

    /// Definition referenced by a schema, looking through arrays
    pub fn get_for_schema(&self, schema: &Schema) -> Option<DefId> {
        TypeMapper::schema_gvk(schema).and_then(|gvk| self.get_by_gvk(&gvk))
    }

    /// Same-kind definitions, newest first
    pub fn by_kind(&self, kind: &str) -> &[DefId] {
        self.by_kind.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Definitions in key order
    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition)> {
        self.by_key.values().map(|id| (*id, &self.all[id.0]))
    }

    pub fn ids(&self) -> Vec<DefId> {
        self.by_key.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Short group name to full group name
///
/// Seeded with groups whose definitions carry no usable group extension;
/// the rest come from each definition's group/version/kind extension.
pub fn group_full_names(specs: &[SwaggerSpec]) -> Result<BTreeMap<String, String>> {
    let mut mapping: BTreeMap<String, String> = [
        ("apiregistration", "apiregistration.k8s.io"),
        ("apiextensions", "apiextensions.k8s.io"),
        ("certificates", "certificates.k8s.io"),
        ("meta", "meta"),
        ("core", "core"),
        ("extensions", "extensions"),
    ]
    .into_iter()
    .map(|(short, full)| (short.to_string(), full.to_string()))
    .collect();

    for spec in specs {
        for (name, schema) in &spec.definitions {
            let Ok(Some(gvk)) = TypeMapper::guess_gvk(name) else {
                continue;
            };
            if mapping.contains_key(&gvk.group) {
                continue;
            }
            if let Some(extension) = schema.gvk(name)? {
                mapping.insert(gvk.group, extension.group);
            }
        }
    }
    Ok(mapping)
}
