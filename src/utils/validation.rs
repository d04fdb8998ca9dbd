use crate::utils::error::{BuildError, Result};
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Dot-separated identifier, e.g. "com.winterwell".
fn group_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*(\.[A-Za-z_][A-Za-z0-9_-]*)*$")
            .expect("group id pattern is valid")
    })
}

pub fn validate_non_empty(field_name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BuildError::MalformedDescriptor {
            field: field_name.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_group_id(field_name: &str, value: &str) -> Result<()> {
    validate_non_empty(field_name, value)?;

    if !group_id_regex().is_match(value) {
        return Err(BuildError::MalformedDescriptor {
            field: field_name.to_string(),
            reason: format!(
                "\"{}\" is not a dot-separated namespace identifier",
                value
            ),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BuildError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            _ => {
                return Err(BuildError::InvalidConfigValue {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "File extension must be one of: {}",
                        allowed_extensions.join(", ")
                    ),
                });
            }
        }
    }

    Ok(())
}
