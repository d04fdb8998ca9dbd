use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::utils::error::{BuildError, Result};

/// Dependency scope, mirroring the two configurations a module declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Compile,
    Test,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Compile => write!(f, "compile"),
            Scope::Test => write!(f, "test"),
        }
    }
}

/// A (group, artifact, version) triple identifying a dependency or a
/// published artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Parses the compact `group:artifact:version` form.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self {
                    group: group.to_string(),
                    artifact: artifact.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(BuildError::MalformedDescriptor {
                field: "coordinate".to_string(),
                reason: format!("expected group:artifact:version, got \"{}\"", raw),
            }),
        }
    }

    /// Relative path of the jar inside a Maven-layout repository.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}-{}.jar",
            self.group.replace('.', "/"),
            self.artifact,
            self.version,
            self.artifact,
            self.version
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub scope: Scope,
    pub coordinate: Coordinate,
}

/// A named, externally consumable reference to one compiled output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub name: String,
    /// Source-set whose compiled output is exposed (always "main" in practice).
    pub component: String,
}

/// The merged, validated module descriptor. Immutable after construction;
/// safe to share read-only across tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Artifact id used for publication.
    pub name: String,
    pub group: String,
    pub version: String,
    /// Resolution search order.
    pub repositories: Vec<String>,
    pub dependencies: Vec<Dependency>,
    /// Source-set name to its single root directory.
    pub source_roots: BTreeMap<String, PathBuf>,
    pub publication: Option<Publication>,
}

impl ModuleDescriptor {
    pub fn dependencies_for(&self, scope: Scope) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(move |d| d.scope == scope)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Jar,
}

/// One artifact the publication plan commits to producing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedArtifact {
    pub source_set: String,
    pub source_root: PathBuf,
    pub kind: ArtifactKind,
}

/// Derived from a descriptor by `core::plan::publication_plan`. Carries the
/// compile-scope dependencies so the publisher can generate POM metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationPlan {
    pub coordinate: Coordinate,
    pub artifacts: Vec<PlannedArtifact>,
    pub dependencies: Vec<Dependency>,
}

/// A compiled output produced by the Compiler collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub passed: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub repository: PathBuf,
    pub installed: Vec<PathBuf>,
}
