//! Progress reporting for orchestrator turns

use colored::Colorize;
use forge_application::ports::progress::ProgressNotifier;
use forge_domain::{AgentType, StepStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Spinner per step, nested spinners for background tasks
pub struct ProgressReporter {
    multi: MultiProgress,
    step_bar: Mutex<Option<ProgressBar>>,
    aux_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            step_bar: Mutex::new(None),
            aux_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn spinner(&self, prefix: String, message: &str) -> ProgressBar {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        pb
    }

    fn status_mark(status: StepStatus) -> String {
        match status {
            StepStatus::Completed => "v".green().to_string(),
            StepStatus::Error => "x".red().to_string(),
            StepStatus::InProgress => "~".yellow().to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_step_start(&self, agent: AgentType, sequence: u32) {
        let pb = self.spinner(format!("[{sequence}] {}", agent.display_name()), "working...");
        *self.step_bar.lock() = Some(pb);
    }

    fn on_step_complete(&self, _agent: AgentType, status: StepStatus, summary: &str) {
        if let Some(pb) = self.step_bar.lock().take() {
            pb.finish_with_message(format!("{} {summary}", Self::status_mark(status)));
        }
    }

    fn on_auxiliary_start(&self, kind: &str) {
        let pb = self.spinner(format!("  + {kind}"), "running...");
        *self.aux_bar.lock() = Some(pb);
    }

    fn on_auxiliary_complete(&self, _kind: &str, success: bool) {
        if let Some(pb) = self.aux_bar.lock().take() {
            let mark = if success { "v".green() } else { "x".red() };
            pb.finish_with_message(mark.to_string());
        }
    }
}

/// Simple text-based progress (no fancy UI), used when stderr is not a terminal
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_step_start(&self, agent: AgentType, sequence: u32) {
        eprintln!("{} [{sequence}] {}", "->".cyan(), agent.display_name().bold());
    }

    fn on_step_complete(&self, _agent: AgentType, status: StepStatus, summary: &str) {
        eprintln!("   {} {summary}", ProgressReporter::status_mark(status));
    }

    fn on_auxiliary_start(&self, kind: &str) {
        eprintln!("   {} {kind}", "+".cyan());
    }

    fn on_auxiliary_complete(&self, kind: &str, success: bool) {
        if !success {
            eprintln!("   {} {kind} failed", "x".red());
        }
    }

    fn on_continuation(&self, _from: AgentType, next: Option<AgentType>) {
        if let Some(next) = next {
            eprintln!("   {} next: {}", "=>".dimmed(), next.display_name());
        }
    }
}
