//! Playprobe CLI: run the end-to-end scenarios from the command line
//!
//! ## Usage
//!
//! ```bash
//! playprobe list                          # Show suites and scenarios
//! playprobe run                           # Run everything
//! playprobe run --filter drop --headless  # One scenario, no window
//! playprobe config --config suite.yaml    # Print the resolved config
//! ```

use std::process::ExitCode;

use clap::Parser;
use playprobe_cli::{
    logging, render_json, render_list, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands,
    ConfigArgs, OutputFormat, RunArgs, TestRunner, Verbosity,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_log_format(cli.log_format.into())
}

async fn run(command: Commands, config: CliConfig) -> CliResult<()> {
    match command {
        Commands::List => {
            print!("{}", render_list(&playprobe::scenario::all()));
            Ok(())
        }
        Commands::Run(args) => run_tests(config, args).await,
        Commands::Config(args) => run_config(&args),
    }
}

async fn run_tests(config: CliConfig, args: RunArgs) -> CliResult<()> {
    let suite = args.suite.resolve()?;
    tracing::debug!(?suite, "resolved configuration");

    let format: OutputFormat = args.format.into();
    let config = if format == OutputFormat::Json {
        // Keep stdout clean for the JSON document
        config.with_verbosity(Verbosity::Quiet)
    } else {
        config
    };

    let mut runner = TestRunner::new(config, suite);
    let Some(results) = runner.run(args.filter.as_deref()).await? else {
        return Ok(());
    };

    if format == OutputFormat::Json || args.report.is_some() {
        let json = render_json(&results)?;
        if format == OutputFormat::Json {
            println!("{json}");
        }
        if let Some(path) = &args.report {
            std::fs::write(path, &json)?;
            tracing::info!(path = %path.display(), "wrote report");
        }
    }

    if results.all_passed() {
        Ok(())
    } else {
        Err(CliError::TestsFailed {
            failed: results.failed_count(),
            total: results.total(),
        })
    }
}

fn run_config(args: &ConfigArgs) -> CliResult<()> {
    let suite = args.suite.resolve()?;
    print!("{}", suite.to_yaml()?);
    Ok(())
}
