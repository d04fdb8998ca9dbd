#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{BuildCommand, CliConfig};
pub use toml_config::{load_fragments, TomlFragment};
