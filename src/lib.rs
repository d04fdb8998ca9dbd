pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{BuildCommand, CliConfig};

pub use crate::core::engine::BuildEngine;
pub use crate::domain::model::ModuleDescriptor;
pub use crate::utils::error::{BuildError, Result};
