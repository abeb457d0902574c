// src/main.rs

mod analyzer;
mod classifier;
mod cli;
mod error;
mod history;
mod logging;
mod manifest;
mod model;
mod renderer;

use clap::Parser;
use cli::{Args, OutputFormat};
use error::Result;
use history::CommitSource;
use renderer::{Layout, Sink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};

const APP_NAME: &str = "GIT ChangeLog Creator";

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
        // --help and --version
        Err(err) => err.exit(),
    };

    let _guard = logging::init(args.level);
    let start_time = Instant::now();

    let result = run(args);
    if result.is_ok() {
        info!(elapsed = ?start_time.elapsed(), "changelog finished");
    }
    ExitCode::from(exit_status(result))
}

/// Logs a fatal error and turns the run result into a process status.
/// Every error kind ends the run with status 1.
fn exit_status(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{APP_NAME}: {e}");
            1
        }
    }
}

fn run(args: Args) -> Result<()> {
    history::ensure_libgit2()?;

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = args.resolve(&cwd)?;
    info!(
        name = %config.name,
        path = %config.repo_path.display(),
        "{APP_NAME} v{}: processing repository",
        env!("CARGO_PKG_VERSION")
    );
    match config.since {
        Some(since) => info!(%since, "reading history since date"),
        None => info!("reading history since the beginning"),
    }

    let source = CommitSource::open(&config.repo_path, config.main_branch.as_deref())?;
    let commits = source.commits(config.since)?;
    info!(count = commits.len(), main_branch = source.main_branch(), "commits collected");

    let ledger = analyzer::analyze(&commits);

    let contents = match config.format {
        OutputFormat::Md => renderer::render_markdown(
            &config.name,
            &ledger,
            config.date_group,
            Layout::from(&config.sink),
        ),
        OutputFormat::Json => {
            let mut json = renderer::render_json(&config.name, &ledger)?;
            if config.sink == Sink::Stdout {
                json.push('\n');
            }
            json
        }
    };

    renderer::write_output(&config.sink, &contents)
}
