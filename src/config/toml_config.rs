use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::descriptor::DescriptorFragment;
use crate::domain::model::{Coordinate, Dependency, Publication, Scope};
use crate::utils::error::{BuildError, Result};

/// On-disk TOML form of a descriptor fragment:
///
/// ```toml
/// [module]
/// name = "flexi-gson"
/// group = "com.winterwell"
/// version = "1.2.2"
/// repositories = ["mavenCentral", "mavenLocal"]
///
/// [[dependencies]]
/// scope = "compile"
/// coordinate = "com.winterwell:utils:1.3.2"
///
/// [source_roots]
/// main = "src"
/// test = "test"
///
/// [publication]
/// name = "maven"
/// component = "main"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlFragment {
    pub module: Option<ModuleSection>,
    #[serde(default)]
    pub dependencies: Vec<DependencySection>,
    #[serde(default)]
    pub source_roots: BTreeMap<String, String>,
    pub publication: Option<PublicationSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSection {
    pub name: Option<String>,
    pub group: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySection {
    pub scope: String,
    pub coordinate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationSection {
    #[serde(default = "default_publication_name")]
    pub name: String,
    pub component: String,
}

fn default_publication_name() -> String {
    "maven".to_string()
}

/// Accepts both the short scope names and the Gradle configuration names.
fn parse_scope(raw: &str) -> Result<Scope> {
    match raw {
        "compile" | "implementation" | "api" => Ok(Scope::Compile),
        "test" | "testImplementation" => Ok(Scope::Test),
        other => Err(BuildError::MalformedDescriptor {
            field: "dependencies.scope".to_string(),
            reason: format!("unknown scope \"{}\"", other),
        }),
    }
}

impl TomlFragment {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Converts the raw declarations into a merge-ready fragment, parsing
    /// scopes and coordinates.
    pub fn into_fragment(self) -> Result<DescriptorFragment> {
        let module = self.module.unwrap_or(ModuleSection {
            name: None,
            group: None,
            version: None,
            repositories: Vec::new(),
        });

        let mut dependencies = Vec::with_capacity(self.dependencies.len());
        for dep in self.dependencies {
            dependencies.push(Dependency {
                scope: parse_scope(&dep.scope)?,
                coordinate: Coordinate::parse(&dep.coordinate)?,
            });
        }

        Ok(DescriptorFragment {
            name: module.name,
            group: module.group,
            version: module.version,
            repositories: module.repositories,
            dependencies,
            source_roots: self
                .source_roots
                .into_iter()
                .map(|(name, dir)| (name, PathBuf::from(dir)))
                .collect(),
            publication: self.publication.map(|p| Publication {
                name: p.name,
                component: p.component,
            }),
        })
    }
}

/// Reads and converts an ordered list of fragment files.
pub fn load_fragments(paths: &[PathBuf]) -> Result<Vec<DescriptorFragment>> {
    let mut fragments = Vec::with_capacity(paths.len());
    for path in paths {
        tracing::debug!("Reading descriptor fragment {}", path.display());
        fragments.push(TomlFragment::from_path(path)?.into_fragment()?);
    }
    Ok(fragments)
}
