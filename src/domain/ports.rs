use crate::domain::model::{Artifact, Coordinate, PublicationPlan, PublishReceipt, TestReport};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Compiles one source root against a classpath into a single artifact.
pub trait Compiler: Send + Sync {
    fn compile(
        &self,
        source_root: &Path,
        classpath: &[PathBuf],
    ) -> impl std::future::Future<Output = Result<Artifact>> + Send;
}

/// Resolves a coordinate to a local artifact path, searching the given
/// repositories in declared order.
pub trait DependencyResolver: Send + Sync {
    fn resolve(
        &self,
        coordinate: &Coordinate,
        repositories: &[String],
    ) -> impl std::future::Future<Output = Result<PathBuf>> + Send;
}

#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        plan: &PublicationPlan,
        artifact: &Artifact,
        target: &Path,
    ) -> Result<PublishReceipt>;
}

#[async_trait::async_trait]
pub trait TestRunner: Send + Sync {
    async fn run_tests(
        &self,
        test_root: &Path,
        artifact: &Artifact,
        classpath: &[PathBuf],
    ) -> Result<TestReport>;
}
