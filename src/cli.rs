// src/cli.rs

use crate::error::{ConfigError, Result};
use crate::manifest;
use crate::renderer::Sink;
use chrono::NaiveDate;
use clap::Parser;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Builds a changelog from a git repository's commit history
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to scan
    #[arg(long = "path-repo", env = "CHANGELOG_PATH_REPO", default_value = "./")]
    pub path: PathBuf,

    /// File to write the changelog to. Default: standard output
    #[arg(long, env = "CHANGELOG_OUTFILE")]
    pub outfile: Option<PathBuf>,

    /// Only include commits from this date on (YYYY-MM-DD)
    #[arg(long, env = "CHANGELOG_SINCE")]
    pub since: Option<String>,

    /// Repository name for the title. Default: discovered from package.json,
    /// Cargo.toml or the current directory
    #[arg(long = "repo-name", env = "CHANGELOG_REPO_NAME")]
    pub name: Option<String>,

    /// Primary branch. Default: the branch checked out, then main or master
    #[arg(long = "main-branch", env = "CHANGELOG_MAIN_BRANCH")]
    pub main_branch: Option<String>,

    /// Group each version's entries by commit date
    #[arg(long)]
    pub date_group: bool,

    /// Output format: md or json
    #[arg(long, env = "CHANGELOG_FORMAT", default_value = "md")]
    pub format: String,

    /// Log level
    #[arg(long = "log-level", env = "CHANGELOG_LOG_LEVEL", value_enum, default_value_t = LogLevel::Warning)]
    pub level: LogLevel,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown report
    Md,
    /// Structured document
    Json,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Md, OutputFormat::Json];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Md => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidFormat {
                found: s.to_string(),
                available: Self::ALL.map(OutputFormat::as_str).join(", "),
            })
    }
}

/// Validated settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repo_path: PathBuf,
    pub sink: Sink,
    pub since: Option<NaiveDate>,
    pub name: String,
    pub main_branch: Option<String>,
    pub date_group: bool,
    pub format: OutputFormat,
}

impl Args {
    /// Checks every option and fills in the repository name. Manifests are
    /// looked up in `cwd`.
    pub fn resolve(self, cwd: &Path) -> Result<Config> {
        let format = self.format.parse::<OutputFormat>()?;
        let since = self.since.as_deref().map(parse_since).transpose()?;
        let name = match self.name.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => manifest::discover_name(cwd).ok_or(ConfigError::MissingRepoName)?,
        };

        Ok(Config {
            repo_path: self.path,
            sink: self.outfile.map_or(Sink::Stdout, Sink::File),
            since,
            name,
            main_branch: self.main_branch,
            date_group: self.date_group,
            format,
        })
    }
}

fn parse_since(since: &str) -> std::result::Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(since, "%Y-%m-%d").map_err(|_| ConfigError::InvalidSince(since.to_string()))
}
