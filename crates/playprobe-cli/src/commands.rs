//! CLI command definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use playprobe::{SuiteConfig, DEMOQA_ENV, PLAYGROUND_ENV};

use crate::config::{ColorChoice, LogFormat};
use crate::error::CliResult;
use crate::output::OutputFormat;

/// Playprobe: end-to-end scenarios for the UI testing playground and demo QA sites
#[derive(Parser, Debug)]
#[command(name = "playprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures and summary only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List suites and scenario names
    List,

    /// Run the scenarios in Chromium
    Run(RunArgs),

    /// Print the resolved configuration as YAML
    Config(ConfigArgs),
}

/// Suite configuration sources, lowest precedence first:
/// defaults, `--config` file, `resource1`/`resource2` environment, flags
#[derive(Args, Debug, Default, Clone)]
pub struct SuiteArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the UI testing playground
    #[arg(long, env = PLAYGROUND_ENV)]
    pub resource1: Option<String>,

    /// Base URL of the demo QA site
    #[arg(long, env = DEMOQA_ENV)]
    pub resource2: Option<String>,

    /// Run Chromium without a window
    #[arg(long)]
    pub headless: bool,

    /// Extra attempts after a failed one
    #[arg(long)]
    pub retries: Option<u32>,

    /// Per-test timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Tests run concurrently
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Chromium executable
    #[arg(long)]
    pub chromium: Option<String>,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,
}

impl SuiteArgs {
    /// Merge every source into one validated config
    pub fn resolve(&self) -> CliResult<SuiteConfig> {
        let mut config = match &self.config {
            Some(path) => SuiteConfig::from_yaml_file(path)?,
            None => SuiteConfig::default(),
        };

        if let Some(url) = &self.resource1 {
            config = config.with_playground_url(url.clone());
        }
        if let Some(url) = &self.resource2 {
            config = config.with_demoqa_url(url.clone());
        }
        if self.headless {
            config = config.with_headless(true);
        }
        if let Some(retries) = self.retries {
            config = config.with_retries(retries);
        }
        if let Some(ms) = self.timeout {
            config = config.with_timeout_ms(ms);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(path) = &self.chromium {
            config = config.with_chromium_path(path.clone());
        }
        if self.no_sandbox {
            config = config.with_no_sandbox();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run scenarios whose name contains this (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Output format for results on stdout
    #[arg(long, default_value = "text")]
    pub format: FormatArg,

    /// Write the JSON results to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Suite configuration
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Suite configuration
    #[command(flatten)]
    pub suite: SuiteArgs,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Result output argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Coloured lines and a summary
    #[default]
    Text,
    /// The full results as JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
