//! Rendering of artifacts into prompt text.

use forge_domain::{
    ConversationMessage, FixIssue, GeneratedCode, GeneratedTests, IssueSource, UserStory,
    summarize,
};

pub fn format_stories(stories: &[UserStory]) -> String {
    if stories.is_empty() {
        return "(none)".to_string();
    }
    let mut out = String::new();
    for story in stories {
        out.push_str(&format!("- [{}] {}", story.id, story.title));
        if !story.description.is_empty() {
            out.push_str(&format!(": {}", story.description));
        }
        out.push('\n');
        for criterion in &story.acceptance_criteria {
            out.push_str(&format!("  * {criterion}\n"));
        }
    }
    out
}

pub fn format_code(code: &GeneratedCode) -> String {
    let mut out = String::new();
    for file in &code.files {
        out.push_str(&format!(
            "### {}\n```{}\n{}\n```\n\n",
            file.path, file.language, file.content
        ));
    }
    out
}

pub fn format_tests(tests: Option<&GeneratedTests>) -> String {
    match tests {
        Some(tests) if !tests.files.is_empty() => {
            format_code(&GeneratedCode::new(tests.files.clone()))
        }
        _ => "(no generated tests; derive test cases from the acceptance criteria)".to_string(),
    }
}

pub fn format_issues(issues: &[FixIssue]) -> String {
    issues
        .iter()
        .enumerate()
        .map(|(i, issue)| {
            let source = match issue.source {
                IssueSource::Security => "security",
                IssueSource::Test => "test",
            };
            match &issue.file {
                Some(file) => format!("{}. [{}] {} ({})", i + 1, source, issue.description, file),
                None => format!("{}. [{}] {}", i + 1, source, issue.description),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The last `limit` messages, one summarized line each.
pub fn format_history(history: &[ConversationMessage], limit: usize) -> String {
    let start = history.len().saturating_sub(limit);
    let lines: Vec<_> = history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), summarize(&m.content, 300)))
        .collect();
    if lines.is_empty() {
        "(empty)".to_string()
    } else {
        lines.join("\n")
    }
}
