//! Built-in prompt templates for each agent
//!
//! Templates use `{{name}}` placeholders. Every agent also has a `system`
//! template. A prompt renderer may override any of these from disk.

use crate::agent::agent_type::AgentType;

/// Template names used by the agents.
pub mod names {
    pub const SYSTEM: &str = "system";
    pub const ANALYZE_REQUIREMENTS: &str = "analyze_requirements";
    pub const GENERATE_CODE: &str = "generate_code";
    pub const FIX_CODE: &str = "fix_code";
    pub const VALIDATE_CODE: &str = "validate_code";
    pub const GENERATE_TESTS: &str = "generate_tests";
    pub const ANALYZE_SECURITY: &str = "analyze_security";
}

/// Look up a built-in template.
pub fn builtin_template(agent: AgentType, name: &str) -> Option<&'static str> {
    let template = match (agent, name) {
        (AgentType::Product, names::SYSTEM) => PRODUCT_SYSTEM,
        (AgentType::Product, names::ANALYZE_REQUIREMENTS) => ANALYZE_REQUIREMENTS,
        (AgentType::Coder, names::SYSTEM) => CODER_SYSTEM,
        (AgentType::Coder, names::GENERATE_CODE) => GENERATE_CODE,
        (AgentType::Coder, names::FIX_CODE) => FIX_CODE,
        (AgentType::Test, names::SYSTEM) => TEST_SYSTEM,
        (AgentType::Test, names::VALIDATE_CODE) => VALIDATE_CODE,
        (AgentType::Test, names::GENERATE_TESTS) => GENERATE_TESTS,
        (AgentType::Security, names::SYSTEM) => SECURITY_SYSTEM,
        (AgentType::Security, names::ANALYZE_SECURITY) => ANALYZE_SECURITY,
        _ => return None,
    };
    Some(template)
}

const PRODUCT_SYSTEM: &str = r#"You are a senior product owner.
You turn loosely worded requirements into small, testable user stories with clear acceptance criteria.
Always answer with a single JSON object and nothing else."#;

const ANALYZE_REQUIREMENTS: &str = r#"Requirement:
{{requirement}}

Recent conversation:
{{history}}

Break the requirement into user stories. Respond with JSON in exactly this shape:
{
  "user_stories": [
    {
      "id": "US-1",
      "title": "short title",
      "description": "As a <role>, I want <goal> so that <benefit>",
      "acceptance_criteria": ["criterion"],
      "priority": "high" | "medium" | "low"
    }
  ]
}
If the requirement is too ambiguous to split, return an empty "user_stories" array."#;

const CODER_SYSTEM: &str = r#"You are a senior software engineer.
You write complete, runnable code that satisfies every acceptance criterion you are given.
Always answer with a single JSON object and nothing else."#;

const GENERATE_CODE: &str = r#"Implement the following user stories:
{{user_stories}}

Additional feedback:
{{feedback}}

Respond with JSON in exactly this shape:
{
  "files": [
    { "path": "relative/path.ext", "language": "language", "content": "full file content" }
  ],
  "explanation": "how the code satisfies the stories"
}"#;

const FIX_CODE: &str = r#"The code below was written for these user stories:
{{user_stories}}

Current code:
{{code}}

Fix every one of these issues:
{{issues}}

Return the complete corrected files as JSON in exactly this shape:
{
  "files": [
    { "path": "relative/path.ext", "language": "language", "content": "full file content" }
  ],
  "explanation": "what was changed and why"
}"#;

const TEST_SYSTEM: &str = r#"You are a meticulous QA engineer.
You reason carefully about whether code meets its acceptance criteria.
Always answer with a single JSON object and nothing else."#;

const VALIDATE_CODE: &str = r#"User stories:
{{user_stories}}

Code under test:
{{code}}

Generated tests:
{{tests}}

Mode: {{task_type}}

Walk through each acceptance criterion as a test case and decide whether the code satisfies it.
Respond with JSON in exactly this shape:
{
  "success": true | false,
  "results": [ { "name": "test case", "passed": true | false, "message": "optional detail" } ],
  "failures": ["description of each failure"],
  "summary": "one paragraph"
}"#;

const GENERATE_TESTS: &str = r#"User stories:
{{user_stories}}

Code under test:
{{code}}

Write automated tests covering every acceptance criterion, using the idiomatic test framework for the code's language.
Respond with JSON in exactly this shape:
{
  "test_files": [
    { "path": "relative/path.ext", "language": "language", "content": "full file content" }
  ],
  "summary": "what is covered"
}"#;

const SECURITY_SYSTEM: &str = r#"You are an application security reviewer.
You look for injection, authentication, authorization, secrets handling, input validation and dependency risks.
Always answer with a single JSON object and nothing else."#;

const ANALYZE_SECURITY: &str = r#"Code to review:
{{code}}

Context (user stories, may be empty):
{{user_stories}}

Report every security risk you find. Respond with JSON in exactly this shape:
{
  "risks": [
    {
      "id": "SEC-1",
      "severity": "low" | "medium" | "high" | "critical",
      "title": "short title",
      "description": "what is wrong",
      "file": "path or null",
      "line": 1,
      "recommendation": "how to fix"
    }
  ],
  "summary": "overall assessment"
}
Return an empty "risks" array when the code is clean."#;
