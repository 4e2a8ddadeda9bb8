//! Configuration file loading for codeforge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./codeforge.toml` or `./.codeforge.toml`
//! 3. Global: `$XDG_CONFIG_HOME/codeforge/config.toml`
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileAgentsConfig, FileConfig, FileLoggingConfig, FileModelEntry,
    FileOutputConfig, FilePromptsConfig, FileProviderEndpoint, FileProvidersConfig,
    FileSessionConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader};
