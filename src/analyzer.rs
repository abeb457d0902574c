// src/analyzer.rs

use crate::classifier;
use crate::model::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

/// Walks `commits` in order and buckets their messages by version and date.
pub fn analyze(commits: &[CommitRecord]) -> VersionLedger {
    let bar = ProgressBar::new(commits.len() as u64);
    let style = ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("Analyzing commits");

    let mut grouper = Grouper::new();
    for commit in commits {
        grouper.add(commit);
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!(
        commits = commits.len(),
        versions = grouper.ledger.len(),
        dates = grouper.ledger.iter().map(|(_, bucket)| bucket.len()).sum::<usize>(),
        latest = grouper.current_version(),
        "grouped commit history"
    );
    grouper.finish()
}

/// Incremental version/date grouping over commits in traversal order
pub struct Grouper {
    version: String,
    ledger: VersionLedger,
}

impl Grouper {
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            ledger: VersionLedger::new(),
        }
    }

    /// The version later commits are assigned to
    pub fn current_version(&self) -> &str {
        &self.version
    }

    pub fn add(&mut self, commit: &CommitRecord) {
        if classifier::should_skip(commit) {
            debug!(message = %commit.message, "skipping commit");
            return;
        }

        let date = commit.date_label();

        if let Some(version) = classifier::release_version(&commit.message) {
            if version != self.version {
                debug!(from = %self.version, to = %version, "release marker found");
            }
            self.version = version.to_string();
            self.ledger.get_or_create(&self.version);
        }

        let bucket = self.ledger.get_or_create(&self.version);
        bucket.get_or_create(&date);

        if classifier::is_version_marker(&commit.message) {
            return;
        }

        for line in commit.message.split('\n') {
            bucket.push_unique(&date, classifier::normalize(line));
        }
    }

    pub fn finish(self) -> VersionLedger {
        self.ledger
    }
}

impl Default for Grouper {
    fn default() -> Self {
        Self::new()
    }
}
