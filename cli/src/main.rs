//! CLI entrypoint for codeforge
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use forge_application::{
    AgentRoster, ConversationLogger, NoConversationLogger, NoProgress, OrchestrateUseCase,
    ProgressNotifier, SessionStore, TurnInput,
};
use forge_domain::{AgentType, ModelConfig, StepStatus};
use forge_infrastructure::{
    ConfigLoader, FileConfig, FilePromptRenderer, FileSessionStore, JsonlConversationLogger,
    ModelRegistry, Severity, default_adapters,
};
use forge_presentation::{Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(cli.verbose, &config);
    info!("Starting codeforge");

    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("config {issue}"),
            Severity::Error => error!("config {issue}"),
        }
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{line}");
        }
        println!();
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(ExitCode::SUCCESS);
    }

    // === Dependency Injection ===
    let mut models = config.model_configs();
    let mut agent_models = config.agents.model_overrides();
    if let Some(pinned) = &cli.model {
        if !models.iter().any(|m| m.matches_id(pinned)) {
            let extra: ModelConfig = pinned
                .parse()
                .with_context(|| format!("--model {pinned} is not configured; use provider:model"))?;
            models.push(config.providers.apply_defaults(extra));
        }
        agent_models = AgentType::ALL
            .into_iter()
            .map(|agent| (agent, pinned.clone()))
            .collect::<HashMap<_, _>>();
    }

    let registry = Arc::new(ModelRegistry::new(
        models,
        default_adapters(config.request_timeout()),
    ));
    let available = registry.discover().await;

    if cli.list_models {
        print_models(&registry);
        return Ok(ExitCode::SUCCESS);
    }

    let store: Arc<dyn SessionStore> = Arc::new(match &config.session.dir {
        Some(dir) => FileSessionStore::new(dir),
        None => FileSessionStore::default_location(),
    });

    if cli.list_sessions {
        for id in store.list().await? {
            println!("{id}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    if cli.message.is_none() && cli.session.is_none() {
        bail!("A message is required to start a session. Use --session <ID> to continue one.");
    }

    if available == 0 {
        warn!("No configured model is reachable; agents will report errors");
    }

    let prompts = Arc::new(match &config.prompts.dir {
        Some(dir) => FilePromptRenderer::with_override_dir(dir),
        None => FilePromptRenderer::builtin(),
    });
    let roster = AgentRoster::standard(registry, prompts, &agent_models);
    let use_case = OrchestrateUseCase::new(roster, store)
        .with_logger(transcript_logger(&config))
        .with_config(config.orchestrator.clone());

    let input = TurnInput {
        session_id: cli.session.clone(),
        message: cli.message.clone(),
        agent: cli.agent,
    };

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let outcomes = if cli.auto || config.orchestrator.auto_continue {
        use_case.run_chain(input, progress.as_ref()).await?
    } else {
        vec![
            use_case
                .process_turn_with_progress(input, progress.as_ref())
                .await?,
        ]
    };

    let format = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::format_all(&outcomes, format));

    let failed = outcomes
        .last()
        .is_some_and(|o| o.step_status == StepStatus::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Stderr logging by verbosity, plus a daily rolling file when `[logging] dir` is set
fn init_logging(verbose: u8, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match &config.logging.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "codeforge.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(EnvFilter::new(level)),
        )
        .with(file_layer)
        .init();

    guard
}

fn transcript_logger(config: &FileConfig) -> Arc<dyn ConversationLogger> {
    let Some(path) = &config.logging.transcript else {
        return Arc::new(NoConversationLogger);
    };
    match JsonlConversationLogger::open(path) {
        Ok(logger) => {
            info!(path = %logger.path().display(), "Writing orchestration transcript");
            Arc::new(logger)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open transcript, continuing without it");
            Arc::new(NoConversationLogger)
        }
    }
}

fn print_models(registry: &ModelRegistry) {
    println!("{}", "Configured models (highest priority first):".bold());
    let mut statuses = registry.list_models();
    statuses.sort_by(|a, b| b.config.priority.cmp(&a.config.priority));
    for status in statuses {
        let mark = if status.available {
            "available".green()
        } else {
            "unavailable".red()
        };
        println!(
            "  {:<40} priority {:>3}  {}",
            status.config.id(),
            status.config.priority,
            mark
        );
    }
}
