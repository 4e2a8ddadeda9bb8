//! Console output formatter for turn outcomes

use colored::{ColoredString, Colorize};
use forge_application::TurnOutcome;
use forge_domain::{
    AgentOutput, GeneratedCode, OutputFormat, ResponseStatus, SecurityReport, Severity,
    StepStatus, TestReport, UserStory,
};

/// Formats turn outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render every outcome of a (possibly chained) run
    pub fn format_all(outcomes: &[TurnOutcome], format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(outcomes),
            OutputFormat::Full => Self::join(outcomes, Self::format_full),
            OutputFormat::Summary => Self::join(outcomes, Self::format_summary),
        }
    }

    fn join(outcomes: &[TurnOutcome], render: fn(&TurnOutcome) -> String) -> String {
        let mut output: String = outcomes.iter().map(render).collect();
        if let Some(last) = outcomes.last() {
            output.push_str(&Self::footer(last));
        }
        output
    }

    /// Single outcome as JSON, a chain as a JSON array
    pub fn format_json(outcomes: &[TurnOutcome]) -> String {
        let rendered = match outcomes {
            [single] => serde_json::to_string_pretty(single),
            many => serde_json::to_string_pretty(many),
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }

    /// Step header, agent message, and artifact counts
    pub fn format_summary(outcome: &TurnOutcome) -> String {
        let mut output = Self::step_header(outcome);
        output.push_str(&format!("{}\n", outcome.response.message));

        if let Some(data) = &outcome.response.data {
            output.push_str(&format!("  {} {}\n", "->".cyan(), data.summary()));
        }
        for aux in &outcome.auxiliary {
            output.push_str(&format!("  {} {}\n", "+".cyan(), aux.summary()));
        }
        if let Some(error) = &outcome.error {
            output.push_str(&format!("  {} {}\n", "!".red().bold(), error));
        }
        output
    }

    /// Step header followed by every artifact in full
    pub fn format_full(outcome: &TurnOutcome) -> String {
        let mut output = Self::step_header(outcome);
        output.push_str(&format!("{}\n", outcome.response.message));

        if let Some(data) = &outcome.response.data {
            output.push_str(&Self::format_output(data));
        }
        if !outcome.auxiliary.is_empty() {
            output.push_str(&Self::section_header("Background tasks"));
            for aux in &outcome.auxiliary {
                output.push_str(&Self::format_output(aux));
            }
        }
        if let Some(error) = &outcome.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }
        output
    }

    fn format_output(output: &AgentOutput) -> String {
        match output {
            AgentOutput::UserStories(stories) => Self::format_stories(stories),
            AgentOutput::Code(code) => Self::format_code(code),
            AgentOutput::Tests(tests) => {
                let mut out = Self::section_header(&format!("Tests ({} files)", tests.files.len()));
                for file in &tests.files {
                    out.push_str(&Self::file_block(&file.path, &file.language, &file.content));
                }
                if !tests.summary.is_empty() {
                    out.push_str(&format!("{}\n", tests.summary.dimmed()));
                }
                out
            }
            AgentOutput::TestReport(report) => Self::format_test_report(report),
            AgentOutput::SecurityReport(report) => Self::format_security(report),
        }
    }

    fn format_stories(stories: &[UserStory]) -> String {
        let mut output = Self::section_header(&format!("User stories ({})", stories.len()));
        for story in stories {
            output.push_str(&format!("\n{} {}\n", story.id.yellow().bold(), story.title.bold()));
            if !story.description.is_empty() {
                output.push_str(&format!("{}\n", Self::indent(&story.description, "  ")));
            }
            for criterion in &story.acceptance_criteria {
                output.push_str(&format!("  * {criterion}\n"));
            }
        }
        output
    }

    fn format_code(code: &GeneratedCode) -> String {
        let mut output = Self::section_header(&format!(
            "Code ({} files, {} lines)",
            code.files.len(),
            code.total_lines()
        ));
        for file in &code.files {
            output.push_str(&Self::file_block(&file.path, &file.language, &file.content));
        }
        if !code.explanation.is_empty() {
            output.push_str(&format!("\n{}\n", code.explanation));
        }
        output
    }

    fn format_test_report(report: &TestReport) -> String {
        let verdict = match report.success {
            Some(true) => "PASSED".green().bold(),
            Some(false) => "FAILED".red().bold(),
            None => "INDETERMINATE".yellow().bold(),
        };
        let mut output = Self::section_header("Test report");
        output.push_str(&format!("Verdict: {verdict}\n"));
        for case in &report.results {
            let mark = if case.passed { "v".green() } else { "x".red() };
            match &case.message {
                Some(message) => output.push_str(&format!("  {mark} {} ({message})\n", case.name)),
                None => output.push_str(&format!("  {mark} {}\n", case.name)),
            }
        }
        for failure in &report.failures {
            output.push_str(&format!("  {} {failure}\n", "x".red()));
        }
        if !report.summary.is_empty() {
            output.push_str(&format!("{}\n", report.summary.dimmed()));
        }
        output
    }

    fn format_security(report: &SecurityReport) -> String {
        let mut output = Self::section_header(&format!("Security review ({} risks)", report.risks.len()));
        if report.risks.is_empty() {
            output.push_str(&format!("{}\n", "No risks found".green()));
        }
        for risk in &report.risks {
            let location = match (&risk.file, risk.line) {
                (Some(file), Some(line)) => format!(" ({file}:{line})"),
                (Some(file), None) => format!(" ({file})"),
                _ => String::new(),
            };
            output.push_str(&format!(
                "\n{} {} {}{}\n",
                Self::severity_label(risk.severity),
                risk.id.bold(),
                risk.title,
                location.dimmed()
            ));
            if !risk.description.is_empty() && risk.description != risk.title {
                output.push_str(&format!("{}\n", Self::indent(&risk.description, "  ")));
            }
            if let Some(rec) = &risk.recommendation {
                output.push_str(&format!("  {} {rec}\n", "Fix:".cyan()));
            }
        }
        if !report.summary.is_empty() {
            output.push_str(&format!("\n{}\n", report.summary.dimmed()));
        }
        output
    }

    fn severity_label(severity: Severity) -> ColoredString {
        let label = format!("[{}]", severity.as_str().to_uppercase());
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.red(),
            Severity::Medium => label.yellow(),
            Severity::Low => label.dimmed(),
        }
    }

    fn step_header(outcome: &TurnOutcome) -> String {
        let status = match (outcome.step_status, outcome.response.status) {
            (StepStatus::Error, _) | (_, ResponseStatus::Error) => "error".red().bold(),
            (_, ResponseStatus::Success) => "success".green().bold(),
            (_, ResponseStatus::PartialSuccess) => "partial".yellow().bold(),
            (_, ResponseStatus::RequiresFeedback) => "needs feedback".yellow().bold(),
        };
        format!(
            "\n{} {} {}\n",
            format!("[{}]", outcome.sequence).dimmed(),
            outcome.agent.display_name().cyan().bold(),
            status
        )
    }

    fn footer(last: &TurnOutcome) -> String {
        let mut output = format!(
            "\n{} {} ({})\n",
            "Session:".dimmed(),
            last.session_id,
            last.session_status
        );
        match last.continuation {
            Some(next) => output.push_str(&format!(
                "{} {} (codeforge --session {} --auto)\n",
                "Next:".cyan().bold(),
                next.display_name(),
                last.session_id
            )),
            None if last.response.status == ResponseStatus::RequiresFeedback => output.push_str(
                &format!("{} reply with --session {}\n", "Waiting:".yellow().bold(), last.session_id),
            ),
            None => {}
        }
        output
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn file_block(path: &str, language: &str, content: &str) -> String {
        format!(
            "\n{}\n{}\n",
            format!("── {path} ({language}) ──").yellow().bold(),
            content.trim_end()
        )
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{prefix}{line}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
