// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Anything that ends a run
#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

/// Invalid or missing settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid specified since date ({0}). Valid format: YYYY-MM-DD")]
    InvalidSince(String),

    #[error("Invalid output format ({found}). Available formats: {available}")]
    InvalidFormat { found: String, available: String },

    #[error("You must specify a repository name with --repo-name; it could not be discovered")]
    MissingRepoName,
}

/// The repository or the output destination is unusable
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Invalid repository path. Specified folder ({}) doesn't contain a GIT repository", .0.display())]
    NotARepository(PathBuf),

    #[error("Failed to read commit history: {0}")]
    Traversal(#[from] git2::Error),

    #[error("No primary branch found (tried: {0})")]
    NoPrimaryBranch(String),

    #[error(
        "An error occurred while trying to save the output file. Check if the specified path exists ({}): {source}",
        .path.display()
    )]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to standard output: {0}")]
    WriteConsole(#[source] std::io::Error),

    #[error("Failed to serialize changelog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A required library capability is missing at runtime
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("libgit2 {found} is linked, but {required} or newer is required")]
    Libgit2Unsupported { found: String, required: String },
}

pub type Result<T> = std::result::Result<T, ChangelogError>;

impl From<git2::Error> for ChangelogError {
    fn from(err: git2::Error) -> Self {
        Self::Environment(EnvironmentError::Traversal(err))
    }
}

impl From<serde_json::Error> for ChangelogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Environment(EnvironmentError::Serialize(err))
    }
}
