use std::fmt;
use thiserror::Error;

/// Pipeline stage a collaborator error originated from. Attached on the way
/// out of the engine so the failing stage can be named in the build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Load,
    Resolve,
    Compile,
    Test,
    Publish,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStage::Load => write!(f, "load"),
            BuildStage::Resolve => write!(f, "resolve"),
            BuildStage::Compile => write!(f, "compile"),
            BuildStage::Test => write!(f, "test"),
            BuildStage::Publish => write!(f, "publish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Descriptor,
    Configuration,
    Network,
    Stage,
    System,
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Malformed descriptor: field \"{field}\": {reason}")]
    MalformedDescriptor { field: String, reason: String },

    #[error("Duplicate source-set \"{name}\": \"{existing}\" conflicts with \"{conflicting}\"")]
    DuplicateSourceSet {
        name: String,
        existing: String,
        conflicting: String,
    },

    #[error("No publication defined in descriptor")]
    NoPublicationDefined,

    #[error("Dependency not found: {coordinate} (searched: {repositories})")]
    DependencyNotFound {
        coordinate: String,
        repositories: String,
    },

    #[error("Compilation failed: {message}")]
    Compile { message: String },

    #[error("Tests failed: {failed} failed, {passed} passed")]
    TestsFailed { passed: u32, failed: u32 },

    #[error("Test harness error: {message}")]
    TestRun { message: String },

    #[error("Publish failed: {message}")]
    Publish { message: String },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: BuildStage,
        #[source]
        source: Box<BuildError>,
    },

    #[error("Configuration error: field \"{field}\" = \"{value}\": {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Descriptor parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

impl BuildError {
    /// Attaches the originating stage. Already-attributed errors keep their
    /// original stage.
    pub fn at_stage(self, stage: BuildStage) -> BuildError {
        match self {
            BuildError::Stage { .. } => self,
            other => BuildError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn stage(&self) -> Option<BuildStage> {
        match self {
            BuildError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BuildError::MalformedDescriptor { .. }
            | BuildError::DuplicateSourceSet { .. }
            | BuildError::NoPublicationDefined
            | BuildError::InvalidConfigValue { .. }
            | BuildError::TomlError(_) => ErrorSeverity::High,
            BuildError::DependencyNotFound { .. } | BuildError::HttpError(_) => {
                ErrorSeverity::Medium
            }
            BuildError::Compile { .. }
            | BuildError::TestsFailed { .. }
            | BuildError::TestRun { .. }
            | BuildError::Publish { .. } => ErrorSeverity::High,
            BuildError::Stage { source, .. } => source.severity(),
            BuildError::IoError(_)
            | BuildError::SerializationError(_)
            | BuildError::ZipError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BuildError::MalformedDescriptor { .. }
            | BuildError::DuplicateSourceSet { .. }
            | BuildError::NoPublicationDefined
            | BuildError::TomlError(_) => ErrorCategory::Descriptor,
            BuildError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            BuildError::DependencyNotFound { .. } | BuildError::HttpError(_) => {
                ErrorCategory::Network
            }
            BuildError::Compile { .. }
            | BuildError::TestsFailed { .. }
            | BuildError::TestRun { .. }
            | BuildError::Publish { .. }
            | BuildError::Stage { .. } => ErrorCategory::Stage,
            BuildError::IoError(_)
            | BuildError::SerializationError(_)
            | BuildError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BuildError::MalformedDescriptor { field, .. } => {
                format!("Fix the \"{}\" declaration in the module descriptor", field)
            }
            BuildError::DuplicateSourceSet { name, .. } => format!(
                "Remove the conflicting \"{}\" source-set declaration or disable strict mode",
                name
            ),
            BuildError::NoPublicationDefined => {
                "Add a [publication] section to the module descriptor".to_string()
            }
            BuildError::DependencyNotFound { coordinate, .. } => format!(
                "Check the coordinate \"{}\" and the declared repositories",
                coordinate
            ),
            BuildError::Compile { .. } => {
                "Inspect the compiler output above and fix the sources".to_string()
            }
            BuildError::TestsFailed { .. } => "Inspect the failing tests".to_string(),
            BuildError::TestRun { .. } => {
                "Check the test command and its classpath".to_string()
            }
            BuildError::Publish { .. } => {
                "Check the target repository path is writable".to_string()
            }
            BuildError::Stage { source, .. } => source.recovery_suggestion(),
            BuildError::InvalidConfigValue { field, .. } => {
                format!("Fix the \"{}\" command-line option", field)
            }
            BuildError::HttpError(_) => "Check network connectivity".to_string(),
            BuildError::TomlError(_) => "Fix the descriptor TOML syntax".to_string(),
            BuildError::IoError(_)
            | BuildError::SerializationError(_)
            | BuildError::ZipError(_) => "Check disk space and file permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.stage() {
            Some(stage) => format!("Build failed during {}: {}", stage, self),
            None => format!("Build failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
