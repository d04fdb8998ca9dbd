use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::domain::model::Artifact;
use crate::domain::ports::Compiler;
use crate::utils::error::{BuildError, Result};

/// Shells out to an external compiler (javac by default) and packages the
/// class output into a jar.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: String,
    output_dir: PathBuf,
    /// Final jar file name, e.g. "flexi-gson-1.2.2.jar".
    artifact_name: String,
}

impl CommandCompiler {
    pub fn new(command: String, output_dir: PathBuf, artifact_name: String) -> Self {
        Self {
            command,
            output_dir,
            artifact_name,
        }
    }
}

pub(crate) fn collect_sources(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "java") {
            out.push(path);
        }
    }
    Ok(())
}

pub(crate) fn collect_outputs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_outputs(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

pub fn join_classpath(classpath: &[PathBuf]) -> String {
    let sep = if cfg!(windows) { ";" } else { ":" };
    classpath
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

fn package_jar(classes_dir: &Path, jar_path: &Path) -> Result<()> {
    let file = fs::File::create(jar_path)?;
    let mut jar = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    jar.start_file("META-INF/MANIFEST.MF", options)?;
    jar.write_all(b"Manifest-Version: 1.0\r\n\r\n")?;

    let mut outputs = Vec::new();
    collect_outputs(classes_dir, &mut outputs)?;
    for path in outputs {
        let relative = path
            .strip_prefix(classes_dir)
            .map_err(|_| BuildError::Compile {
                message: format!("class file {} escaped the output dir", path.display()),
            })?;
        // Zip entries always use forward slashes.
        let entry_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        jar.start_file(entry_name, options)?;
        jar.write_all(&fs::read(&path)?)?;
    }

    jar.finish()?;
    Ok(())
}

impl Compiler for CommandCompiler {
    async fn compile(&self, source_root: &Path, classpath: &[PathBuf]) -> Result<Artifact> {
        let mut sources = Vec::new();
        collect_sources(source_root, &mut sources)?;
        if sources.is_empty() {
            return Err(BuildError::Compile {
                message: format!("no sources found under {}", source_root.display()),
            });
        }
        tracing::debug!(
            "Compiling {} sources from {}",
            sources.len(),
            source_root.display()
        );

        let classes_dir = self.output_dir.join("classes");
        fs::create_dir_all(&classes_dir)?;

        let mut cmd = tokio::process::Command::new(&self.command);
        cmd.arg("-d").arg(&classes_dir);
        if !classpath.is_empty() {
            cmd.arg("-cp").arg(join_classpath(classpath));
        }
        cmd.args(&sources);

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(BuildError::Compile {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let jar_path = self.output_dir.join(&self.artifact_name);
        package_jar(&classes_dir, &jar_path)?;

        Ok(Artifact { path: jar_path })
    }
}
