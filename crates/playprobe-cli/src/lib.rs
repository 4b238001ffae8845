//! Playprobe CLI Library
//!
//! Command-line interface for listing and running the Playprobe scenarios.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, FormatArg, LogFormatArg, RunArgs, SuiteArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{
    render_json, render_list, result_line, summary_line, OutputFormat, ProgressReporter,
};
pub use runner::TestRunner;
