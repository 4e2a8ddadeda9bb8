//! Prompt rendering port

use forge_domain::AgentType;
use std::collections::HashMap;

/// Loads prompt templates and substitutes `{{name}}` placeholders.
///
/// Substitution is case-sensitive and tolerates whitespace inside the
/// braces (`{{ name }}`). Placeholders without a value are left as-is.
pub trait PromptRenderer: Send + Sync {
    /// Load the template `name` for `agent`, or `None` if it does not exist
    fn load_template(&self, agent: AgentType, name: &str) -> Option<String>;

    /// Substitute variables into a template
    fn apply_variables(&self, template: &str, vars: &HashMap<String, String>) -> String;

    /// Load and render in one step
    fn render(
        &self,
        agent: AgentType,
        name: &str,
        vars: &HashMap<String, String>,
    ) -> Option<String> {
        self.load_template(agent, name)
            .map(|template| self.apply_variables(&template, vars))
    }
}
