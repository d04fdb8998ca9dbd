use std::path::PathBuf;

use crate::core::plan::publication_plan;
use crate::domain::model::{
    Artifact, Dependency, ModuleDescriptor, PublishReceipt, Scope, TestReport,
};
use crate::domain::ports::{Compiler, DependencyResolver, Publisher, TestRunner};
use crate::utils::error::{BuildError, BuildStage, Result};
use crate::utils::monitor::BuildMonitor;

const MAIN_SOURCE_SET: &str = "main";
const TEST_SOURCE_SET: &str = "test";

/// Sequences the collaborators over one immutable descriptor: resolve,
/// compile, test, publish. Never retries; collaborator failures surface with
/// the originating stage attached.
pub struct BuildEngine<C, R, P, T> {
    descriptor: ModuleDescriptor,
    compiler: C,
    resolver: R,
    publisher: P,
    test_runner: T,
    repo_path: PathBuf,
    monitor: BuildMonitor,
}

impl<C, R, P, T> BuildEngine<C, R, P, T>
where
    C: Compiler,
    R: DependencyResolver,
    P: Publisher,
    T: TestRunner,
{
    pub fn new(
        descriptor: ModuleDescriptor,
        compiler: C,
        resolver: R,
        publisher: P,
        test_runner: T,
        repo_path: PathBuf,
    ) -> Self {
        Self {
            descriptor,
            compiler,
            resolver,
            publisher,
            test_runner,
            repo_path,
            monitor: BuildMonitor::new(false),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = BuildMonitor::new(enabled);
        self
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Resolves every dependency in the slice to a local path, preserving
    /// declaration order.
    async fn resolve_classpath(&self, dependencies: &[&Dependency]) -> Result<Vec<PathBuf>> {
        let mut classpath = Vec::with_capacity(dependencies.len());
        for dep in dependencies {
            tracing::debug!("Resolving {} ({})", dep.coordinate, dep.scope);
            let path = self
                .resolver
                .resolve(&dep.coordinate, &self.descriptor.repositories)
                .await
                .map_err(|e| e.at_stage(BuildStage::Resolve))?;
            classpath.push(path);
        }
        Ok(classpath)
    }

    /// Resolve compile-scope dependencies and compile the main source root.
    pub async fn build(&self) -> Result<Artifact> {
        let main_root = self
            .descriptor
            .source_roots
            .get(MAIN_SOURCE_SET)
            .ok_or_else(|| BuildError::MalformedDescriptor {
                field: "source_roots.main".to_string(),
                reason: "build requires a main source root".to_string(),
            })?;

        let compile_deps: Vec<_> = self.descriptor.dependencies_for(Scope::Compile).collect();
        tracing::info!(
            "Resolving {} compile dependencies...",
            compile_deps.len()
        );
        let classpath = self.resolve_classpath(&compile_deps).await?;
        self.monitor.log_stats("resolve");

        tracing::info!("Compiling {}...", main_root.display());
        let artifact = self
            .compiler
            .compile(main_root, &classpath)
            .await
            .map_err(|e| e.at_stage(BuildStage::Compile))?;
        self.monitor.log_stats("compile");

        tracing::info!("Built {}", artifact.path.display());
        Ok(artifact)
    }

    /// Build, then run the test suite against the built artifact. A missing
    /// test source root is not an error; there is simply nothing to run.
    pub async fn test(&self) -> Result<TestReport> {
        let artifact = self.build().await?;

        let test_root = match self.descriptor.source_roots.get(TEST_SOURCE_SET) {
            Some(root) => root,
            None => {
                tracing::warn!("No test source root declared, skipping tests");
                return Ok(TestReport::default());
            }
        };

        // Tests see both compile- and test-scope dependencies.
        let test_deps: Vec<_> = self.descriptor.dependencies.iter().collect();
        let classpath = self.resolve_classpath(&test_deps).await?;

        tracing::info!("Running tests from {}...", test_root.display());
        let report = self
            .test_runner
            .run_tests(test_root, &artifact, &classpath)
            .await
            .map_err(|e| e.at_stage(BuildStage::Test))?;
        self.monitor.log_stats("test");

        if report.failed > 0 {
            return Err(BuildError::TestsFailed {
                passed: report.passed,
                failed: report.failed,
            }
            .at_stage(BuildStage::Test));
        }

        tracing::info!("Tests passed: {}", report.passed);
        Ok(report)
    }

    /// Build, derive the publication plan, and install the artifact into the
    /// local repository. Equivalent to `publishToMavenLocal`.
    pub async fn publish_local(&self) -> Result<PublishReceipt> {
        let plan = publication_plan(&self.descriptor)?;
        let artifact = self.build().await?;

        tracing::info!(
            "Publishing {} to {}...",
            plan.coordinate,
            self.repo_path.display()
        );
        let receipt = self
            .publisher
            .publish(&plan, &artifact, &self.repo_path)
            .await
            .map_err(|e| e.at_stage(BuildStage::Publish))?;
        self.monitor.log_stats("publish");

        Ok(receipt)
    }

    pub fn finish(&self) {
        self.monitor.log_final_stats();
    }
}
