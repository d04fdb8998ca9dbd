use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::adapters::resolver::maven_local_path;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, validate_path, Validate};

#[derive(Debug, Clone, Parser)]
#[command(name = "modbuild")]
#[command(about = "A minimal module build and publish tool")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: BuildCommand,

    /// Descriptor fragment files, merged in order (later fragments win).
    #[arg(
        long = "descriptor",
        value_name = "PATH",
        global = true,
        default_value = "module.toml"
    )]
    pub descriptors: Vec<PathBuf>,

    /// Fail instead of overwriting when fragments declare conflicting
    /// source-set roots.
    #[arg(long, global = true)]
    pub strict_source_sets: bool,

    #[arg(long, global = true, default_value = "build/modbuild")]
    pub output_path: PathBuf,

    /// Dependency download cache. Defaults to <output-path>/cache.
    #[arg(long, global = true)]
    pub cache_path: Option<PathBuf>,

    /// Target repository for publish-local. Defaults to ~/.m2/repository.
    #[arg(long, global = true)]
    pub repo_path: Option<PathBuf>,

    #[arg(long, global = true, default_value = "javac")]
    pub compiler_cmd: String,

    #[arg(long, global = true, default_value = "java org.junit.runner.JUnitCore")]
    pub test_cmd: String,

    /// Write a JSON build report to this path.
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Enable resource monitoring")]
    pub monitor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum BuildCommand {
    /// Resolve dependencies and compile the main source root.
    Build,
    /// Build, then run the test suite.
    Test,
    /// Build and install the publication into the local repository.
    PublishLocal,
}

impl CliConfig {
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| self.output_path.join("cache"))
    }

    pub fn target_repo(&self) -> PathBuf {
        self.repo_path
            .clone()
            .or_else(maven_local_path)
            .unwrap_or_else(|| self.output_path.join("repo"))
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let descriptor_names: Vec<String> = self
            .descriptors
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        validate_file_extensions("descriptors", &descriptor_names, &["toml"])?;
        validate_path("output_path", &self.output_path.display().to_string())?;
        validate_path("compiler_cmd", &self.compiler_cmd)?;
        validate_path("test_cmd", &self.test_cmd)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["modbuild", "build"]);
        assert_eq!(config.command, BuildCommand::Build);
        assert_eq!(config.descriptors, vec![PathBuf::from("module.toml")]);
        assert_eq!(config.cache_dir(), PathBuf::from("build/modbuild/cache"));
        assert!(!config.strict_source_sets);
    }

    #[test]
    fn test_repeated_descriptors_keep_order() {
        let config = CliConfig::parse_from([
            "modbuild",
            "publish-local",
            "--descriptor",
            "a.toml",
            "--descriptor",
            "b.toml",
        ]);
        assert_eq!(config.command, BuildCommand::PublishLocal);
        assert_eq!(
            config.descriptors,
            vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]
        );
    }

    #[test]
    fn test_validate_rejects_non_toml_descriptor() {
        let config =
            CliConfig::parse_from(["modbuild", "build", "--descriptor", "module.gradle"]);
        assert!(config.validate().is_err());
    }
}
