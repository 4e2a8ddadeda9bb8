//! [`PromptRenderer`] backed by an optional override directory.
//!
//! Templates are looked up as `<dir>/<agent>/<name>.txt`; anything not
//! overridden falls back to the built-in templates shipped with the domain.

use forge_application::ports::prompt_renderer::PromptRenderer;
use forge_domain::AgentType;
use forge_domain::prompt::builtin_template;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
});

const TEMPLATE_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Default)]
pub struct FilePromptRenderer {
    dir: Option<PathBuf>,
}

impl FilePromptRenderer {
    /// Built-in templates only
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn load_override(&self, agent: AgentType, name: &str) -> Option<String> {
        let path = self
            .dir
            .as_ref()?
            .join(agent.as_str())
            .join(format!("{name}.{TEMPLATE_EXTENSION}"));
        match std::fs::read_to_string(&path) {
            Ok(template) => {
                debug!(path = %path.display(), "Using prompt override");
                Some(template)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable prompt override, using built-in");
                None
            }
        }
    }
}

impl PromptRenderer for FilePromptRenderer {
    fn load_template(&self, agent: AgentType, name: &str) -> Option<String> {
        self.load_override(agent, name)
            .or_else(|| builtin_template(agent, name).map(str::to_string))
    }

    fn apply_variables(&self, template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::prompt::names;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitution_tolerates_whitespace() {
        let renderer = FilePromptRenderer::builtin();
        let out = renderer.apply_variables(
            "Hello {{name}} and {{ name }}!",
            &vars(&[("name", "Ada")]),
        );
        assert_eq!(out, "Hello Ada and Ada!");
    }

    #[test]
    fn test_unknown_placeholder_left_untouched() {
        let renderer = FilePromptRenderer::builtin();
        let out = renderer.apply_variables("{{known}} {{Unknown}}", &vars(&[("known", "x")]));
        assert_eq!(out, "x {{Unknown}}");
    }

    #[test]
    fn test_substitution_is_case_sensitive() {
        let renderer = FilePromptRenderer::builtin();
        let out = renderer.apply_variables("{{Name}}", &vars(&[("name", "Ada")]));
        assert_eq!(out, "{{Name}}");
    }

    #[test]
    fn test_values_are_not_re_expanded() {
        let renderer = FilePromptRenderer::builtin();
        let out = renderer.apply_variables(
            "{{a}}",
            &vars(&[("a", "{{b}}"), ("b", "nope")]),
        );
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn test_builtin_fallback() {
        let renderer = FilePromptRenderer::builtin();
        assert!(
            renderer
                .load_template(AgentType::Coder, names::GENERATE_CODE)
                .is_some()
        );
        assert!(renderer.load_template(AgentType::Coder, "nonexistent").is_none());
    }

    #[test]
    fn test_override_directory_wins() {
        let dir = TempDir::new().unwrap();
        let agent_dir = dir.path().join("security");
        std::fs::create_dir_all(&agent_dir).unwrap();
        std::fs::write(
            agent_dir.join("analyze_security.txt"),
            "Audit this: {{code}}",
        )
        .unwrap();

        let renderer = FilePromptRenderer::with_override_dir(dir.path());
        let rendered = renderer
            .render(
                AgentType::Security,
                names::ANALYZE_SECURITY,
                &vars(&[("code", "fn main() {}")]),
            )
            .unwrap();
        assert_eq!(rendered, "Audit this: fn main() {}");

        // Not overridden: built-in is used
        assert_eq!(
            renderer.load_template(AgentType::Security, names::SYSTEM).as_deref(),
            builtin_template(AgentType::Security, names::SYSTEM)
        );
    }
}
