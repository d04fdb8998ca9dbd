//! Publication plan derivation. Pure over the descriptor; no I/O.

use crate::domain::model::{
    ArtifactKind, Coordinate, ModuleDescriptor, PlannedArtifact, PublicationPlan, Scope,
};
use crate::utils::error::{BuildError, Result};

/// Derives the ordered artifact list and the coordinate to publish under.
/// Exactly one artifact in this model: the published component's compiled
/// output.
pub fn publication_plan(descriptor: &ModuleDescriptor) -> Result<PublicationPlan> {
    let publication = descriptor
        .publication
        .as_ref()
        .ok_or(BuildError::NoPublicationDefined)?;

    let source_root = descriptor
        .source_roots
        .get(&publication.component)
        .ok_or_else(|| BuildError::MalformedDescriptor {
            field: "publication.component".to_string(),
            reason: format!(
                "references undeclared source-set \"{}\"",
                publication.component
            ),
        })?;

    Ok(PublicationPlan {
        coordinate: Coordinate {
            group: descriptor.group.clone(),
            artifact: descriptor.name.clone(),
            version: descriptor.version.clone(),
        },
        artifacts: vec![PlannedArtifact {
            source_set: publication.component.clone(),
            source_root: source_root.clone(),
            kind: ArtifactKind::Jar,
        }],
        dependencies: descriptor.dependencies_for(Scope::Compile).cloned().collect(),
    })
}
