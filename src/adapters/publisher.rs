use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::domain::model::{Artifact, PublicationPlan, PublishReceipt};
use crate::domain::ports::Publisher;
use crate::utils::error::{BuildError, Result};

/// Installs an artifact plus generated POM metadata into a Maven-layout
/// directory, the way `publishToMavenLocal` populates ~/.m2.
#[derive(Debug, Clone, Default)]
pub struct LocalRepositoryPublisher;

impl LocalRepositoryPublisher {
    pub fn new() -> Self {
        Self
    }
}

pub fn generate_pom(plan: &PublicationPlan) -> String {
    let mut pom = String::new();
    pom.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    pom.push_str("<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n");
    pom.push_str("  <modelVersion>4.0.0</modelVersion>\n");
    pom.push_str(&format!("  <groupId>{}</groupId>\n", plan.coordinate.group));
    pom.push_str(&format!(
        "  <artifactId>{}</artifactId>\n",
        plan.coordinate.artifact
    ));
    pom.push_str(&format!("  <version>{}</version>\n", plan.coordinate.version));

    if !plan.dependencies.is_empty() {
        pom.push_str("  <dependencies>\n");
        for dep in &plan.dependencies {
            pom.push_str("    <dependency>\n");
            pom.push_str(&format!(
                "      <groupId>{}</groupId>\n",
                dep.coordinate.group
            ));
            pom.push_str(&format!(
                "      <artifactId>{}</artifactId>\n",
                dep.coordinate.artifact
            ));
            pom.push_str(&format!(
                "      <version>{}</version>\n",
                dep.coordinate.version
            ));
            pom.push_str("    </dependency>\n");
        }
        pom.push_str("  </dependencies>\n");
    }

    pom.push_str("</project>\n");
    pom
}

fn generate_metadata(plan: &PublicationPlan) -> String {
    let stamp = Utc::now().format("%Y%m%d%H%M%S");
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <metadata>\n\
         \x20 <groupId>{}</groupId>\n\
         \x20 <artifactId>{}</artifactId>\n\
         \x20 <versioning>\n\
         \x20   <release>{}</release>\n\
         \x20   <versions>\n\
         \x20     <version>{}</version>\n\
         \x20   </versions>\n\
         \x20   <lastUpdated>{}</lastUpdated>\n\
         \x20 </versioning>\n\
         </metadata>\n",
        plan.coordinate.group,
        plan.coordinate.artifact,
        plan.coordinate.version,
        plan.coordinate.version,
        stamp
    )
}

#[async_trait::async_trait]
impl Publisher for LocalRepositoryPublisher {
    async fn publish(
        &self,
        plan: &PublicationPlan,
        artifact: &Artifact,
        target: &Path,
    ) -> Result<PublishReceipt> {
        if !artifact.path.exists() {
            return Err(BuildError::Publish {
                message: format!("artifact {} does not exist", artifact.path.display()),
            });
        }

        let coordinate = &plan.coordinate;
        let artifact_dir = target
            .join(coordinate.group.replace('.', "/"))
            .join(&coordinate.artifact);
        let version_dir = artifact_dir.join(&coordinate.version);
        fs::create_dir_all(&version_dir)?;

        let base_name = format!("{}-{}", coordinate.artifact, coordinate.version);
        let jar_path = version_dir.join(format!("{}.jar", base_name));
        fs::copy(&artifact.path, &jar_path)?;

        let pom_path = version_dir.join(format!("{}.pom", base_name));
        fs::write(&pom_path, generate_pom(plan))?;

        let metadata_path = artifact_dir.join("maven-metadata-local.xml");
        fs::write(&metadata_path, generate_metadata(plan))?;

        tracing::info!("Installed {} to {}", coordinate, version_dir.display());
        Ok(PublishReceipt {
            repository: target.to_path_buf(),
            installed: vec![jar_path, pom_path, metadata_path],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ArtifactKind, Coordinate, Dependency, PlannedArtifact, Scope,
    };
    use std::path::PathBuf;

    fn plan() -> PublicationPlan {
        PublicationPlan {
            coordinate: Coordinate::parse("com.winterwell:flexi-gson:1.2.2").unwrap(),
            artifacts: vec![PlannedArtifact {
                source_set: "main".to_string(),
                source_root: PathBuf::from("src"),
                kind: ArtifactKind::Jar,
            }],
            dependencies: vec![Dependency {
                scope: Scope::Compile,
                coordinate: Coordinate::parse("com.winterwell:utils:1.3.2").unwrap(),
            }],
        }
    }

    #[test]
    fn test_generated_pom_lists_dependencies() {
        let pom = generate_pom(&plan());
        assert!(pom.contains("<groupId>com.winterwell</groupId>"));
        assert!(pom.contains("<artifactId>flexi-gson</artifactId>"));
        assert!(pom.contains("<version>1.2.2</version>"));
        assert!(pom.contains("<artifactId>utils</artifactId>"));
        assert!(pom.contains("<version>1.3.2</version>"));
    }

    #[test]
    fn test_generated_metadata_names_release() {
        let metadata = generate_metadata(&plan());
        assert!(metadata.contains("<release>1.2.2</release>"));
        assert!(metadata.contains("<lastUpdated>"));
    }
}
