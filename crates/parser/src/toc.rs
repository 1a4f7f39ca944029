//! Table-of-contents resolution
//!
//! In explicit mode the configured resources are resolved against the
//! definitions index. In tag-driven mode one category per API group is
//! generated from the definitions themselves, and pruned once operations
//! have decided which definitions belong in the ToC.

use crate::definitions::Definitions;
use crate::examples::ExampleLoader;
use apidocs_gen_common::{
    title_case, Config, DefId, Diagnostic, Diagnostics, Resource, ResourceCategory,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Resolve every configured resource to its definition
///
/// A resource with no definition is reported and left unresolved.
pub fn resolve_explicit(
    config: &mut Config,
    definitions: &mut Definitions,
    examples: &ExampleLoader,
    diagnostics: &mut Diagnostics,
) {
    let mut missing = false;
    for category in &mut config.resource_categories {
        for resource in &mut category.resources {
            match definitions.get_by_version_kind(&resource.group, &resource.version, &resource.name)
            {
                Some(id) => {
                    let sample = examples.definition_sample(&resource.name, diagnostics);
                    let definition = definitions.get_mut(id);
                    definition.in_toc = true;
                    definition.sample = sample;
                    resource.definition = Some(id);
                }
                None => {
                    missing = true;
                    diagnostics.push(Diagnostic::MissingDefinition {
                        group: resource.group.clone(),
                        version: resource.version.clone(),
                        kind: resource.name.clone(),
                    });
                }
            }
        }
    }
    if missing {
        let known: Vec<String> = definitions.iter().map(|(_, d)| d.key()).collect();
        debug!(known = ?known, "known definitions");
    }
}

/// One category per API group, holding every candidate definition of that group
///
/// List and Status types and deprecated definitions are never candidates.
pub fn generate_from_tags(
    config: &mut Config,
    definitions: &mut Definitions,
    examples: &ExampleLoader,
    diagnostics: &mut Diagnostics,
) {
    info!("Using OpenAPI extension tags to configure");

    let mut groups: BTreeMap<String, Vec<DefId>> = BTreeMap::new();
    for id in definitions.ids() {
        let definition = definitions.get(id);
        if definition.name.ends_with("List")
            || definition.name.ends_with("Status")
            || definition.is_deprecated()
        {
            continue;
        }
        let group = definition.group.clone();
        let sample = examples.definition_sample(&definition.name, diagnostics);
        definitions.get_mut(id).sample = sample;
        groups.entry(group).or_default().push(id);
    }

    for (group, mut ids) in groups {
        let group_name = title_case(&group);
        config.api_groups.push(group_name.clone());

        definitions.sort_by_name(&mut ids);
        let resources = ids
            .into_iter()
            .map(|id| {
                let definition = definitions.get(id);
                Resource {
                    name: definition.name.clone(),
                    group: definition.group.clone(),
                    version: definition.version.to_string(),
                    definition: Some(id),
                    ..Default::default()
                }
            })
            .collect();

        config.resource_categories.push(ResourceCategory {
            name: group_name,
            include: group,
            resources,
            ..Default::default()
        });
    }
}

/// Drop resources whose definition did not make it into the ToC, then empty categories
pub fn prune(config: &mut Config, definitions: &Definitions) {
    for category in &mut config.resource_categories {
        category.resources.retain(|resource| {
            definitions
                .get_by_version_kind(&resource.group, &resource.version, &resource.name)
                .is_some_and(|id| definitions.get(id).in_toc)
        });
    }
    config
        .resource_categories
        .retain(|category| !category.resources.is_empty());
}
