use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::adapters::compiler::{collect_outputs, collect_sources, join_classpath};
use crate::domain::model::{Artifact, TestReport};
use crate::domain::ports::TestRunner;
use crate::utils::error::{BuildError, Result};

// "OK (12 tests)"
fn junit_ok_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"OK \((\d+) tests?\)").expect("ok pattern is valid"))
}

// "Tests run: 12,  Failures: 2"
fn junit_summary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Tests run: (\d+),\s*Failures: (\d+)").expect("summary pattern is valid")
    })
}

/// Parses pass/fail counts from a JUnit-style console report.
pub fn parse_test_output(output: &str) -> Option<TestReport> {
    if let Some(caps) = junit_summary_regex().captures(output) {
        let run: u32 = caps[1].parse().ok()?;
        let failed: u32 = caps[2].parse().ok()?;
        return Some(TestReport {
            passed: run.saturating_sub(failed),
            failed,
        });
    }
    if let Some(caps) = junit_ok_regex().captures(output) {
        let passed: u32 = caps[1].parse().ok()?;
        return Some(TestReport { passed, failed: 0 });
    }
    None
}

/// Fully-qualified names of the compiled test classes, by the `*Test`
/// naming convention. Inner classes are skipped.
pub fn find_test_classes(classes_dir: &Path) -> Result<Vec<String>> {
    let mut outputs = Vec::new();
    collect_outputs(classes_dir, &mut outputs)?;

    let mut classes = Vec::new();
    for path in outputs {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with("Test.class") || name.contains('$') {
            continue;
        }
        let Ok(relative) = path.strip_prefix(classes_dir) else {
            continue;
        };
        let dotted = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join(".");
        if let Some(class_name) = dotted.strip_suffix(".class") {
            classes.push(class_name.to_string());
        }
    }
    classes.sort();
    Ok(classes)
}

/// Compiles the test source root against the built artifact, then runs an
/// external test harness command (e.g. the JUnit console runner) over the
/// compiled test classes and parses its report.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    /// Harness command line, split on whitespace; the classpath and the test
    /// class names are appended.
    command: String,
    compiler_cmd: String,
    output_dir: PathBuf,
}

impl CommandTestRunner {
    pub fn new(command: String, compiler_cmd: String, output_dir: PathBuf) -> Self {
        Self {
            command,
            compiler_cmd,
            output_dir,
        }
    }

    async fn compile_tests(
        &self,
        sources: &[PathBuf],
        classes_dir: &Path,
        classpath: &[PathBuf],
    ) -> Result<()> {
        fs::create_dir_all(classes_dir)?;

        let mut cmd = tokio::process::Command::new(&self.compiler_cmd);
        cmd.arg("-d").arg(classes_dir);
        cmd.arg("-cp").arg(join_classpath(classpath));
        cmd.args(sources);

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(BuildError::Compile {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TestRunner for CommandTestRunner {
    async fn run_tests(
        &self,
        test_root: &Path,
        artifact: &Artifact,
        classpath: &[PathBuf],
    ) -> Result<TestReport> {
        let mut sources = Vec::new();
        collect_sources(test_root, &mut sources)?;
        if sources.is_empty() {
            tracing::warn!("No test sources under {}", test_root.display());
            return Ok(TestReport::default());
        }
        tracing::debug!(
            "Compiling {} test sources from {}",
            sources.len(),
            test_root.display()
        );

        // Tests compile against the built artifact plus the dependencies.
        let mut compile_classpath = vec![artifact.path.clone()];
        compile_classpath.extend_from_slice(classpath);

        let classes_dir = self.output_dir.join("test-classes");
        self.compile_tests(&sources, &classes_dir, &compile_classpath)
            .await?;

        let test_classes = find_test_classes(&classes_dir)?;
        if test_classes.is_empty() {
            return Err(BuildError::TestRun {
                message: format!(
                    "{} has sources but no *Test classes were compiled",
                    test_root.display()
                ),
            });
        }
        tracing::debug!("Running {} test classes", test_classes.len());

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| BuildError::TestRun {
            message: "empty test command".to_string(),
        })?;

        let mut run_classpath = vec![classes_dir.clone()];
        run_classpath.extend_from_slice(&compile_classpath);

        let mut cmd = tokio::process::Command::new(program);
        cmd.arg("-cp").arg(join_classpath(&run_classpath));
        cmd.args(parts);
        cmd.args(&test_classes);

        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let combined = format!("{}\n{}", stdout, stderr);
        match parse_test_output(&combined) {
            // Test classes were on the command line, so a zero-test report
            // means the harness never saw them.
            Some(report) if report.passed == 0 && report.failed == 0 => {
                Err(BuildError::TestRun {
                    message: format!(
                        "harness ran zero tests for {} test class(es)",
                        test_classes.len()
                    ),
                })
            }
            Some(report) => Ok(report),
            None => Err(BuildError::TestRun {
                message: if stderr.trim().is_empty() {
                    "could not parse test report".to_string()
                } else {
                    stderr.trim().to_string()
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_ok_line() {
        let report = parse_test_output("Time: 0.01\n\nOK (7 tests)\n").unwrap();
        assert_eq!(report.passed, 7);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn test_parse_failure_summary() {
        let report = parse_test_output("Tests run: 9,  Failures: 2\n").unwrap();
        assert_eq!(report.passed, 7);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn test_parse_single_test() {
        let report = parse_test_output("OK (1 test)").unwrap();
        assert_eq!(report.passed, 1);
    }

    #[test]
    fn test_unparseable_output() {
        assert!(parse_test_output("no report here").is_none());
    }

    #[test]
    fn test_find_test_classes_by_convention() {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("com/example");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("FooTest.class"), b"x").unwrap();
        fs::write(pkg.join("FooTest$Inner.class"), b"x").unwrap();
        fs::write(pkg.join("Helper.class"), b"x").unwrap();

        let classes = find_test_classes(dir.path()).unwrap();
        assert_eq!(classes, vec!["com.example.FooTest".to_string()]);
    }

    fn runner_with(command: &str, compiler_cmd: &str, output_dir: &Path) -> CommandTestRunner {
        CommandTestRunner::new(
            command.to_string(),
            compiler_cmd.to_string(),
            output_dir.to_path_buf(),
        )
    }

    fn write_test_source(root: &Path) {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join("SomeTest.java"), "public class SomeTest {}").unwrap();
    }

    fn dummy_artifact(dir: &Path) -> Artifact {
        let jar = dir.join("module.jar");
        fs::write(&jar, b"jar").unwrap();
        Artifact { path: jar }
    }

    #[tokio::test]
    async fn test_empty_test_root_skips() {
        let dir = TempDir::new().unwrap();
        let test_root = dir.path().join("test");
        fs::create_dir_all(&test_root).unwrap();

        let runner = runner_with("echo", "true", dir.path());
        let report = runner
            .run_tests(&test_root, &dummy_artifact(dir.path()), &[])
            .await
            .unwrap();
        assert_eq!(report, TestReport::default());
    }

    #[tokio::test]
    async fn test_sources_without_compiled_test_classes_fail() {
        let dir = TempDir::new().unwrap();
        let test_root = dir.path().join("test");
        write_test_source(&test_root);

        // A compiler stand-in that exits 0 but produces no class files.
        let runner = runner_with("echo", "true", dir.path());
        let err = runner
            .run_tests(&test_root, &dummy_artifact(dir.path()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::TestRun { .. }));
    }

    #[tokio::test]
    async fn test_zero_test_report_is_an_error() {
        let dir = TempDir::new().unwrap();
        let test_root = dir.path().join("test");
        write_test_source(&test_root);

        // Pre-compiled test class; the harness stand-in echoes the summary
        // JUnitCore prints when it runs nothing.
        let classes_dir = dir.path().join("test-classes");
        fs::create_dir_all(&classes_dir).unwrap();
        fs::write(classes_dir.join("SomeTest.class"), b"x").unwrap();

        let runner = runner_with("echo OK (0 tests)", "true", dir.path());
        let err = runner
            .run_tests(&test_root, &dummy_artifact(dir.path()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::TestRun { .. }));
    }

    #[tokio::test]
    async fn test_passing_harness_report_is_parsed() {
        let dir = TempDir::new().unwrap();
        let test_root = dir.path().join("test");
        write_test_source(&test_root);

        let classes_dir = dir.path().join("test-classes");
        fs::create_dir_all(&classes_dir).unwrap();
        fs::write(classes_dir.join("SomeTest.class"), b"x").unwrap();

        let runner = runner_with("echo OK (3 tests)", "true", dir.path());
        let report = runner
            .run_tests(&test_root, &dummy_artifact(dir.path()), &[])
            .await
            .unwrap();
        assert_eq!(report.passed, 3);
        assert_eq!(report.failed, 0);
    }
}
