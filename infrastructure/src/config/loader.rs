//! Configuration file loader with multi-source merging

use super::file_config::{ConfigIssue, FileConfig, Severity};
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PROJECT_CONFIG_FILES: [&str; 2] = ["codeforge.toml", ".codeforge.toml"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Explicit config path (if provided)
    /// 2. Project root: `./codeforge.toml` or `./.codeforge.toml`
    /// 3. Global: `$XDG_CONFIG_HOME/codeforge/config.toml`
    /// 4. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::load_from(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        )
    }

    /// Merge explicit sources over the defaults.
    ///
    /// Missing global or project files are skipped. One that fails to parse
    /// is dropped and reported through [`FileConfig::validate`]; only the
    /// explicit file is allowed to fail the load.
    pub fn load_from(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        let mut skipped = Vec::new();

        for path in [global, project].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let candidate = figment.clone().merge(Toml::file(path));
            match candidate.extract::<FileConfig>() {
                Ok(_) => figment = candidate,
                Err(e) => skipped.push(ConfigIssue::new(
                    Severity::Warning,
                    format!("ignoring unreadable config {}: {e}", path.display()),
                )),
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }

        let mut config: FileConfig = figment
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))?;
        config.skipped_sources = skipped;
        Ok(config)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Global config file path (`~/.config/codeforge/config.toml` on Linux)
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("codeforge").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_CONFIG_FILES
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations being used (for --show-config)
    pub fn describe_sources(explicit: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            lines.push(format!("  [{mark:^7}] Explicit: {}", path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [ FOUND ] Project:  {}", path.display())),
            None => lines.push("  [       ] Project:  ./codeforge.toml or ./.codeforge.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "" };
            lines.push(format!("  [{mark:^7}] Global:   {}", path.display()));
        }

        lines.push("  [       ] Default:  built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::ModelConfig;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.models.is_empty());
        assert_eq!(config.providers.request_timeout_secs, 120);
    }

    #[test]
    fn test_global_config_path_names_codeforge() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.to_string_lossy().contains("codeforge"));
        }
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[providers]\nrequest_timeout_secs = 30\n\n[orchestrator]\nmax_auto_steps = 3\n",
        );
        let project = write(&dir, "project.toml", "[orchestrator]\nmax_auto_steps = 5\n");

        let config = ConfigLoader::load_from(Some(&global), Some(&project), None).unwrap();
        assert_eq!(config.orchestrator.max_auto_steps, 5);
        // Keys the project file does not set survive from the global file
        assert_eq!(config.providers.request_timeout_secs, 30);
    }

    #[test]
    fn test_explicit_file_has_highest_priority() {
        let dir = TempDir::new().unwrap();
        let project = write(
            &dir,
            "project.toml",
            "[[models]]\nprovider = \"ollama\"\nmodel = \"llama3.1\"\n",
        );
        let explicit = write(
            &dir,
            "explicit.toml",
            "[[models]]\nprovider = \"openai\"\nmodel = \"gpt-4o\"\n",
        );

        let config = ConfigLoader::load_from(None, Some(&project), Some(&explicit)).unwrap();
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].model, "gpt-4o");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = TempDir::new().unwrap();
        let result = ConfigLoader::load_from(None, None, Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file_is_invalid() {
        let dir = TempDir::new().unwrap();
        let bad = write(&dir, "bad.toml", "[providers]\nrequest_timeout_secs = \"soon\"\n");
        assert!(matches!(
            ConfigLoader::load_from(None, None, Some(&bad)),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_broken_project_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let project = write(&dir, "codeforge.toml", "[[models]\nprovider = ollama\n");

        let config = ConfigLoader::load_from(None, Some(&project), None).unwrap();
        assert!(config.models.is_empty());
        assert_eq!(
            config.model_configs(),
            vec![config.providers.apply_defaults(ModelConfig::builtin_default())]
        );
        assert_eq!(config.model_configs()[0].id(), "ollama:llama3.1");

        let issues = config.validate();
        assert!(issues.iter().any(|issue| {
            issue.severity == Severity::Warning
                && issue.message.contains("codeforge.toml")
        }));
    }

    #[test]
    fn test_broken_global_file_keeps_project_settings() {
        let dir = TempDir::new().unwrap();
        let global = write(&dir, "global.toml", "[orchestrator\n");
        let project = write(&dir, "project.toml", "[orchestrator]\nmax_auto_steps = 7\n");

        let config = ConfigLoader::load_from(Some(&global), Some(&project), None).unwrap();
        assert_eq!(config.orchestrator.max_auto_steps, 7);
        assert_eq!(config.skipped_sources.len(), 1);
    }

    #[test]
    fn test_missing_optional_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_from(Some(&dir.path().join("absent.toml")), None, None).unwrap();
        assert_eq!(config, FileConfig::default());
    }
}
