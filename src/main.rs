use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use modbuild::adapters::{
    CommandCompiler, CommandTestRunner, HttpResolver, LocalRepositoryPublisher,
};
use modbuild::config::toml_config::load_fragments;
use modbuild::config::{BuildCommand, CliConfig};
use modbuild::core::descriptor::{load_with, LoadOptions};
use modbuild::domain::model::TestReport;
use modbuild::utils::error::ErrorSeverity;
use modbuild::utils::{logger, validation::Validate};
use modbuild::BuildEngine;

/// Machine-readable outcome, written when --report is set.
#[derive(Debug, Serialize)]
struct BuildReport {
    command: String,
    coordinate: String,
    started_at: chrono::DateTime<chrono::Utc>,
    duration_ms: u64,
    artifact: Option<PathBuf>,
    tests: Option<TestReport>,
    installed: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting modbuild");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(&config).await {
        Ok(summary) => {
            tracing::info!("✅ {}", summary);
            println!("✅ {}", summary);
        }
        Err(e) => {
            tracing::error!(
                "❌ Build failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(config: &CliConfig) -> modbuild::Result<String> {
    let fragments = load_fragments(&config.descriptors)?;
    let options = LoadOptions {
        strict_source_sets: config.strict_source_sets,
    };
    let descriptor = load_with(&fragments, options)?;
    tracing::info!(
        "Loaded descriptor {}:{} from {} fragment(s)",
        descriptor.group,
        descriptor.version,
        fragments.len()
    );

    let module_name = if descriptor.name.is_empty() {
        "module".to_string()
    } else {
        descriptor.name.clone()
    };
    let coordinate = format!("{}:{}:{}", descriptor.group, module_name, descriptor.version);
    let artifact_name = format!("{}-{}.jar", module_name, descriptor.version);

    let compiler = CommandCompiler::new(
        config.compiler_cmd.clone(),
        config.output_path.clone(),
        artifact_name,
    );
    let resolver = HttpResolver::new(config.cache_dir())?;
    let publisher = LocalRepositoryPublisher::new();
    let test_runner = CommandTestRunner::new(
        config.test_cmd.clone(),
        config.compiler_cmd.clone(),
        config.output_path.clone(),
    );

    let engine = BuildEngine::new(
        descriptor,
        compiler,
        resolver,
        publisher,
        test_runner,
        config.target_repo(),
    )
    .with_monitoring(config.monitor);

    let started_at = chrono::Utc::now();
    let started = std::time::Instant::now();

    let mut report = BuildReport {
        command: format!("{:?}", config.command),
        coordinate,
        started_at,
        duration_ms: 0,
        artifact: None,
        tests: None,
        installed: Vec::new(),
    };

    let summary = match config.command {
        BuildCommand::Build => {
            let artifact = engine.build().await?;
            let summary = format!("Build complete: {}", artifact.path.display());
            report.artifact = Some(artifact.path);
            summary
        }
        BuildCommand::Test => {
            let tests = engine.test().await?;
            report.tests = Some(tests);
            format!("Tests passed: {}", tests.passed)
        }
        BuildCommand::PublishLocal => {
            let receipt = engine.publish_local().await?;
            let summary = format!(
                "Published {} file(s) to {}",
                receipt.installed.len(),
                receipt.repository.display()
            );
            report.installed = receipt.installed;
            summary
        }
    };

    engine.finish();

    if let Some(path) = &config.report {
        report.duration_ms = started.elapsed().as_millis() as u64;
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("📁 Report written to {}", path.display());
    }

    Ok(summary)
}
