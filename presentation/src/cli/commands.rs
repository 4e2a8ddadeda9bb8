//! CLI command definitions

use clap::{Parser, ValueEnum};
use forge_domain::AgentType;
use std::path::PathBuf;

/// Output format for turn outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every artifact in full
    Full,
    /// One block per step
    Summary,
    /// Raw JSON
    Json,
}

impl From<OutputFormat> for forge_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => forge_domain::OutputFormat::Full,
            OutputFormat::Summary => forge_domain::OutputFormat::Summary,
            OutputFormat::Json => forge_domain::OutputFormat::Json,
        }
    }
}

fn parse_agent(value: &str) -> Result<AgentType, String> {
    value.parse::<AgentType>().map_err(|e| e.to_string())
}

/// CLI arguments for codeforge
#[derive(Parser, Debug)]
#[command(name = "codeforge")]
#[command(author, version, about = "Multi-agent code generation: product, coder, test and security agents")]
#[command(long_about = r#"
codeforge routes each message to one of four agents and carries their
work forward in a persistent session:

  product   turns a requirement into user stories
  coder     generates code from stories, or fixes it from findings
  test      validates code (and generates tests in the background)
  security  reviews code for vulnerabilities

Configuration files are loaded from (in priority order):
1. --config <path>         Explicit config file
2. ./codeforge.toml        Project-level config
3. ~/.config/codeforge/config.toml   Global config

Example:
  codeforge "Build a todo list REST API with authentication"
  codeforge --session 3f2a9c1e --auto
  codeforge --session 3f2a9c1e --agent security
"#)]
pub struct Cli {
    /// Message to send; omit to continue an existing session
    pub message: Option<String>,

    /// Session id to continue (a new session is created when omitted)
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// Send the turn to this agent instead of routing (product, coder, test, security)
    #[arg(short, long, value_name = "AGENT", value_parser = parse_agent)]
    pub agent: Option<AgentType>,

    /// Keep following the continuation chain until it stops
    #[arg(long)]
    pub auto: bool,

    /// Pin every agent to one model ("provider:model" or a bare model name)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// List configured models and their availability, then exit
    #[arg(long)]
    pub list_models: bool,

    /// List stored session ids, then exit
    #[arg(long)]
    pub list_sessions: bool,

    /// Output format (default from config, else summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the merged config, then exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether this invocation only inspects state and never runs a turn
    pub fn is_inspection(&self) -> bool {
        self.list_models || self.list_sessions || self.show_config
    }
}
