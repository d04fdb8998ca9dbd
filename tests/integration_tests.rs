use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use modbuild::adapters::LocalRepositoryPublisher;
use modbuild::core::descriptor::{load, DescriptorFragment};
use modbuild::domain::model::{
    Artifact, Coordinate, Dependency, Publication, Scope, TestReport,
};
use modbuild::domain::ports::{Compiler, DependencyResolver, Publisher, TestRunner};
use modbuild::utils::error::{BuildError, BuildStage, Result};
use modbuild::BuildEngine;

struct StubCompiler {
    jar: PathBuf,
}

impl Compiler for StubCompiler {
    async fn compile(&self, _source_root: &Path, _classpath: &[PathBuf]) -> Result<Artifact> {
        fs::write(&self.jar, b"jar-bytes")?;
        Ok(Artifact {
            path: self.jar.clone(),
        })
    }
}

struct StubResolver {
    dir: PathBuf,
}

impl DependencyResolver for StubResolver {
    async fn resolve(&self, coordinate: &Coordinate, _repositories: &[String]) -> Result<PathBuf> {
        let path = self.dir.join(format!("{}.jar", coordinate.artifact));
        fs::write(&path, b"dep")?;
        Ok(path)
    }
}

struct FailingResolver;

impl DependencyResolver for FailingResolver {
    async fn resolve(&self, coordinate: &Coordinate, repositories: &[String]) -> Result<PathBuf> {
        Err(BuildError::DependencyNotFound {
            coordinate: coordinate.to_string(),
            repositories: repositories.join(", "),
        })
    }
}

struct StubTestRunner {
    report: TestReport,
}

#[async_trait::async_trait]
impl TestRunner for StubTestRunner {
    async fn run_tests(
        &self,
        _test_root: &Path,
        _artifact: &Artifact,
        _classpath: &[PathBuf],
    ) -> Result<TestReport> {
        Ok(self.report)
    }
}

fn winterwell_fragment(dir: &Path) -> DescriptorFragment {
    DescriptorFragment {
        name: Some("flexi-gson".to_string()),
        group: Some("com.winterwell".to_string()),
        version: Some("1.2.2".to_string()),
        repositories: vec!["mavenCentral".to_string(), "mavenLocal".to_string()],
        dependencies: vec![
            Dependency {
                scope: Scope::Compile,
                coordinate: Coordinate::parse("com.winterwell:utils:1.3.2").unwrap(),
            },
            Dependency {
                scope: Scope::Test,
                coordinate: Coordinate::parse("junit:junit:4.13.2").unwrap(),
            },
        ],
        source_roots: vec![
            ("main".to_string(), dir.join("src")),
            ("test".to_string(), dir.join("test")),
        ],
        publication: Some(Publication {
            name: "maven".to_string(),
            component: "main".to_string(),
        }),
    }
}

fn engine_with(
    dir: &TempDir,
    report: TestReport,
) -> BuildEngine<StubCompiler, StubResolver, LocalRepositoryPublisher, StubTestRunner> {
    let descriptor = load(&[winterwell_fragment(dir.path())]).unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::create_dir_all(dir.path().join("test")).unwrap();

    BuildEngine::new(
        descriptor,
        StubCompiler {
            jar: dir.path().join("flexi-gson-1.2.2.jar"),
        },
        StubResolver {
            dir: dir.path().to_path_buf(),
        },
        LocalRepositoryPublisher::new(),
        StubTestRunner { report },
        dir.path().join("repo"),
    )
}

#[tokio::test]
async fn test_publish_local_installs_maven_layout() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, TestReport::default());

    let receipt = engine.publish_local().await.unwrap();

    let version_dir = dir.path().join("repo/com/winterwell/flexi-gson/1.2.2");
    assert!(version_dir.join("flexi-gson-1.2.2.jar").exists());
    assert!(version_dir.join("flexi-gson-1.2.2.pom").exists());
    assert!(dir
        .path()
        .join("repo/com/winterwell/flexi-gson/maven-metadata-local.xml")
        .exists());
    assert_eq!(receipt.installed.len(), 3);

    // The generated POM declares the compile-scope dependency only.
    let pom = fs::read_to_string(version_dir.join("flexi-gson-1.2.2.pom")).unwrap();
    assert!(pom.contains("<artifactId>utils</artifactId>"));
    assert!(!pom.contains("<artifactId>junit</artifactId>"));
}

#[tokio::test]
async fn test_build_produces_artifact() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(&dir, TestReport::default());

    let artifact = engine.build().await.unwrap();
    assert!(artifact.path.exists());
}

#[tokio::test]
async fn test_passing_tests_report_counts() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(
        &dir,
        TestReport {
            passed: 7,
            failed: 0,
        },
    );

    let report = engine.test().await.unwrap();
    assert_eq!(report.passed, 7);
}

#[tokio::test]
async fn test_failing_tests_fail_the_test_stage() {
    let dir = TempDir::new().unwrap();
    let engine = engine_with(
        &dir,
        TestReport {
            passed: 5,
            failed: 2,
        },
    );

    let err = engine.test().await.unwrap_err();
    assert_eq!(err.stage(), Some(BuildStage::Test));
}

#[tokio::test]
async fn test_resolution_failure_names_the_resolve_stage() {
    let dir = TempDir::new().unwrap();
    let descriptor = load(&[winterwell_fragment(dir.path())]).unwrap();

    let engine = BuildEngine::new(
        descriptor,
        StubCompiler {
            jar: dir.path().join("out.jar"),
        },
        FailingResolver,
        LocalRepositoryPublisher::new(),
        StubTestRunner {
            report: TestReport::default(),
        },
        dir.path().join("repo"),
    );

    let err = engine.build().await.unwrap_err();
    assert_eq!(err.stage(), Some(BuildStage::Resolve));
}

#[tokio::test]
async fn test_publish_without_publication_fails_before_collaborators() {
    let dir = TempDir::new().unwrap();
    let mut fragment = winterwell_fragment(dir.path());
    fragment.publication = None;
    let descriptor = load(&[fragment]).unwrap();

    let engine = BuildEngine::new(
        descriptor,
        StubCompiler {
            jar: dir.path().join("out.jar"),
        },
        // A resolver that would fail if the engine reached it.
        FailingResolver,
        LocalRepositoryPublisher::new(),
        StubTestRunner {
            report: TestReport::default(),
        },
        dir.path().join("repo"),
    );

    let err = engine.publish_local().await.unwrap_err();
    assert!(matches!(err, BuildError::NoPublicationDefined));
}

#[tokio::test]
async fn test_missing_test_root_skips_tests() {
    let dir = TempDir::new().unwrap();
    let mut fragment = winterwell_fragment(dir.path());
    fragment.source_roots.retain(|(name, _)| name == "main");
    let descriptor = load(&[fragment]).unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();

    let engine = BuildEngine::new(
        descriptor,
        StubCompiler {
            jar: dir.path().join("out.jar"),
        },
        StubResolver {
            dir: dir.path().to_path_buf(),
        },
        LocalRepositoryPublisher::new(),
        StubTestRunner {
            report: TestReport {
                passed: 99,
                failed: 99,
            },
        },
        dir.path().join("repo"),
    );

    let report = engine.test().await.unwrap();
    assert_eq!(report, TestReport::default());
}
