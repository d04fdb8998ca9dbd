//! Fragment merging and descriptor validation.
//!
//! The production pattern this supports is several structurally identical
//! declaration fragments kept in different places; merging is deterministic
//! last-wins, so keeping them byte-identical is allowed but no longer
//! required.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::model::{Dependency, ModuleDescriptor, Publication};
use crate::utils::error::{BuildError, Result};
use crate::utils::validation::{validate_group_id, validate_non_empty};

/// A partial declaration of module metadata, to be merged with others into
/// one authoritative descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorFragment {
    pub name: Option<String>,
    pub group: Option<String>,
    pub version: Option<String>,
    pub repositories: Vec<String>,
    pub dependencies: Vec<Dependency>,
    /// Ordered declarations; later entries overwrite earlier ones for the
    /// same source-set name.
    pub source_roots: Vec<(String, PathBuf)>,
    pub publication: Option<Publication>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// When set, a re-declaration of a source-set with a *different* root is
    /// an error instead of an overwrite. Identical re-declarations stay
    /// legal so merging a fragment with itself is always idempotent.
    pub strict_source_sets: bool,
}

/// Merges the fragments in order and validates the result. All-or-nothing:
/// no partial descriptor is ever returned.
pub fn load(fragments: &[DescriptorFragment]) -> Result<ModuleDescriptor> {
    load_with(fragments, LoadOptions::default())
}

pub fn load_with(
    fragments: &[DescriptorFragment],
    options: LoadOptions,
) -> Result<ModuleDescriptor> {
    let mut name = String::new();
    let mut group = String::new();
    let mut version = String::new();
    let mut repositories: Vec<String> = Vec::new();
    let mut dependencies: Vec<Dependency> = Vec::new();
    let mut source_roots: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut publication: Option<Publication> = None;

    for fragment in fragments {
        // Scalars: last non-empty fragment wins.
        if let Some(v) = fragment.name.as_deref().filter(|v| !v.is_empty()) {
            name = v.to_string();
        }
        if let Some(v) = fragment.group.as_deref().filter(|v| !v.is_empty()) {
            group = v.to_string();
        }
        if let Some(v) = fragment.version.as_deref().filter(|v| !v.is_empty()) {
            version = v.to_string();
        }

        // Repositories: concatenated, de-duplicated by name, first position
        // kept. Order determines resolution search order.
        for repo in &fragment.repositories {
            if !repositories.contains(repo) {
                repositories.push(repo.clone());
            }
        }

        // Dependencies: de-duplicated by (scope, group, artifact); a later
        // occurrence overwrites the version in place.
        for dep in &fragment.dependencies {
            match dependencies.iter_mut().find(|d| {
                d.scope == dep.scope
                    && d.coordinate.group == dep.coordinate.group
                    && d.coordinate.artifact == dep.coordinate.artifact
            }) {
                Some(existing) => {
                    existing.coordinate.version = dep.coordinate.version.clone();
                }
                None => dependencies.push(dep.clone()),
            }
        }

        for (set_name, root) in &fragment.source_roots {
            if options.strict_source_sets {
                if let Some(existing) = source_roots.get(set_name) {
                    if existing != root {
                        return Err(BuildError::DuplicateSourceSet {
                            name: set_name.clone(),
                            existing: existing.display().to_string(),
                            conflicting: root.display().to_string(),
                        });
                    }
                }
            }
            source_roots.insert(set_name.clone(), root.clone());
        }

        if fragment.publication.is_some() {
            publication = fragment.publication.clone();
        }
    }

    validate_group_id("group", &group)?;
    validate_non_empty("version", &version)?;

    if let Some(publication) = &publication {
        if !source_roots.contains_key(&publication.component) {
            return Err(BuildError::MalformedDescriptor {
                field: "publication.component".to_string(),
                reason: format!(
                    "references undeclared source-set \"{}\"",
                    publication.component
                ),
            });
        }
        if name.is_empty() {
            return Err(BuildError::MalformedDescriptor {
                field: "name".to_string(),
                reason: "a publication requires a module name for its artifact id".to_string(),
            });
        }
    }

    Ok(ModuleDescriptor {
        name,
        group,
        version,
        repositories,
        dependencies,
        source_roots,
        publication,
    })
}
