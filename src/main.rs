//! auto-package-updater - JavaScript monorepo dependency updater CLI tool
//!
//! Lists outdated packages across pnpm or npm workspaces, lets the operator
//! pick updates, and commits each update whose tests pass.

use auto_package_updater::cli::CliArgs;
use auto_package_updater::command::SystemCommandRunner;
use auto_package_updater::error::AppError;
use auto_package_updater::git::GitRepository;
use auto_package_updater::orchestrator::{preflight, Orchestrator};
use auto_package_updater::output::Report;
use auto_package_updater::package_manager::PackageManagerKind;
use auto_package_updater::selection::{PromptSelector, SelectAll, Selector};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version are reported through the error path too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(args.debug);

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; RUST_LOG wins over --debug
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .try_init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let config = args.to_config();
    info!(root = %config.root.display(), "starting");

    let runner = SystemCommandRunner::new(&config.root);
    let git = GitRepository::new(&runner);
    preflight(&git, &config.root)?;

    let kind = PackageManagerKind::detect(&config.root)?;
    info!(manager = %kind, "package manager detected");
    let manager = kind.adapter(&runner, &config.root);

    let mut selector: Box<dyn Selector> = if config.assume_yes {
        Box::new(SelectAll)
    } else {
        Box::new(PromptSelector::stdio())
    };

    let mut orchestrator = Orchestrator::new(manager.as_ref(), &git, &runner, config);
    let result = orchestrator.run(selector.as_mut());

    let report = Report::default();
    let log = orchestrator.run_log();
    let log_path = log.exists().then(|| log.path());
    let mut stdout = io::stdout().lock();

    match result {
        Ok(summary) => {
            report.write_summary(&summary, log_path, &mut stdout)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::Rollback(e)) => {
            report.write_summary(orchestrator.summary(), log_path, &mut stdout)?;
            stdout.flush()?;
            Err(AppError::Rollback(e).into())
        }
        Err(e) => Err(e.into()),
    }
}
