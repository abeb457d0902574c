// src/history.rs

use crate::error::{DependencyError, EnvironmentError, Result};
use crate::model::CommitRecord;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use git2::{BranchType, Oid, Repository, Sort};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Branch names tried when HEAD does not point at a local branch
const MAIN_BRANCH_CANDIDATES: &[&str] = &["main", "master"];

/// Oldest libgit2 release the commit source is known to work with
const MIN_LIBGIT2: (u32, u32) = (1, 0);

/// Fails unless the linked libgit2 can serve as the commit source
pub fn ensure_libgit2() -> Result<()> {
    let (major, minor, rev) = git2::Version::get().libgit2_version();
    debug!(libgit2 = %format!("{major}.{minor}.{rev}"), "checking libgit2");
    if (major, minor) < MIN_LIBGIT2 {
        return Err(DependencyError::Libgit2Unsupported {
            found: format!("{major}.{minor}.{rev}"),
            required: format!("{}.{}", MIN_LIBGIT2.0, MIN_LIBGIT2.1),
        }
        .into());
    }
    Ok(())
}

/// Reads commit records out of a git repository
pub struct CommitSource {
    repo: Repository,
    main_branch: String,
}

impl CommitSource {
    /// Opens the repository at `path`. Without an explicit `main_branch` the
    /// branch checked out at HEAD is used, then `main`, then `master`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, main_branch: Option<&str>) -> Result<Self> {
        let repo = Repository::open(path)
            .map_err(|_| EnvironmentError::NotARepository(path.to_path_buf()))?;
        let main_branch = find_main_branch(&repo, main_branch)?;
        info!(main_branch = %main_branch, "opened git repository");
        Ok(Self { repo, main_branch })
    }

    pub fn main_branch(&self) -> &str {
        &self.main_branch
    }

    /// Every commit on a local branch, oldest first. Commits authored before
    /// `since`, on the author's own calendar, are left out.
    #[instrument(skip(self), fields(main_branch = %self.main_branch))]
    pub fn commits(&self, since: Option<NaiveDate>) -> Result<Vec<CommitRecord>> {
        let on_main = self.main_branch_commits()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME | Sort::REVERSE)?;
        revwalk.push_glob("refs/heads/*")?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;

            let Some(author_date) = to_datetime(&commit.author().when()) else {
                warn!(commit = %oid, "author date out of range, ignoring commit");
                continue;
            };

            if since.map_or(false, |since| author_date.date_naive() < since) {
                continue;
            }

            commits.push(CommitRecord {
                message: String::from_utf8_lossy(commit.message_bytes()).trim().to_string(),
                author_date,
                is_main_branch: on_main.contains(&oid),
            });
        }

        debug!(count = commits.len(), "collected commits");
        Ok(commits)
    }

    fn main_branch_commits(&self) -> Result<HashSet<Oid>> {
        let tip = self
            .repo
            .find_branch(&self.main_branch, BranchType::Local)?
            .get()
            .peel_to_commit()?
            .id();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(tip)?;
        let reachable = revwalk.collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(reachable)
    }
}

fn find_main_branch(repo: &Repository, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return if repo.find_branch(name, BranchType::Local).is_ok() {
            Ok(name.to_string())
        } else {
            Err(EnvironmentError::NoPrimaryBranch(name.to_string()).into())
        };
    }

    if let Ok(head) = repo.head() {
        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }
    }

    MAIN_BRANCH_CANDIDATES
        .iter()
        .find(|name| repo.find_branch(name, BranchType::Local).is_ok())
        .map(|name| name.to_string())
        .ok_or_else(|| {
            let mut tried = vec!["HEAD"];
            tried.extend(MAIN_BRANCH_CANDIDATES);
            EnvironmentError::NoPrimaryBranch(tried.join(", ")).into()
        })
}

/// Converts a git timestamp into a date-time in the recorded offset, or in
/// UTC when the offset is not a valid one (a day or more)
fn to_datetime(time: &git2::Time) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(time.seconds(), 0).map(|utc| utc.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChangelogError;
    use git2::{RepositoryInitOptions, Signature, Time};
    use tempfile::TempDir;

    const DAY: i64 = 24 * 60 * 60;
    // 2024-01-01T12:00:00Z
    const JAN_1: i64 = 1_704_110_400;

    fn init_repo() -> (TempDir, Repository) {
        let temp = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(temp.path(), &opts).unwrap();
        (temp, repo)
    }

    fn commit_at(
        repo: &Repository,
        update_ref: &str,
        parent: Option<Oid>,
        message: &str,
        seconds: i64,
        offset_minutes: i32,
    ) -> Oid {
        let sig = Signature::new("Test", "test@example.com", &Time::new(seconds, offset_minutes)).unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents = parent
            .map(|oid| vec![repo.find_commit(oid).unwrap()])
            .unwrap_or_default();
        let parent_refs: Vec<_> = parents.iter().collect();
        repo.commit(Some(update_ref), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_linked_libgit2_is_supported() {
        assert!(ensure_libgit2().is_ok());
    }

    #[test]
    fn test_open_rejects_plain_directory() {
        let temp = TempDir::new().unwrap();
        let err = CommitSource::open(temp.path(), None).err().unwrap();
        assert!(matches!(
            err,
            ChangelogError::Environment(EnvironmentError::NotARepository(_))
        ));
    }

    #[test]
    fn test_main_branch_from_head() {
        let (temp, repo) = init_repo();
        commit_at(&repo, "HEAD", None, "fix: first", JAN_1, 0);

        let source = CommitSource::open(temp.path(), None).unwrap();
        assert_eq!(source.main_branch(), "main");
    }

    #[test]
    fn test_unknown_main_branch_is_an_error() {
        let (temp, repo) = init_repo();
        commit_at(&repo, "HEAD", None, "fix: first", JAN_1, 0);

        let err = CommitSource::open(temp.path(), Some("trunk")).err().unwrap();
        assert!(matches!(
            err,
            ChangelogError::Environment(EnvironmentError::NoPrimaryBranch(_))
        ));
    }

    #[test]
    fn test_commits_oldest_first_with_branch_membership() {
        let (temp, repo) = init_repo();
        let first = commit_at(&repo, "HEAD", None, "fix: first\n", JAN_1, 0);
        commit_at(&repo, "HEAD", Some(first), "fix: second", JAN_1 + DAY, 0);
        commit_at(&repo, "refs/heads/topic", Some(first), "fea: side work", JAN_1 + 2 * DAY, 0);

        let source = CommitSource::open(temp.path(), None).unwrap();
        let commits = source.commits(None).unwrap();

        let summary: Vec<_> = commits
            .iter()
            .map(|c| (c.message.as_str(), c.is_main_branch))
            .collect();
        assert_eq!(
            summary,
            vec![("fix: first", true), ("fix: second", true), ("fea: side work", false)]
        );
    }

    #[test]
    fn test_since_is_inclusive() {
        let (temp, repo) = init_repo();
        let first = commit_at(&repo, "HEAD", None, "fix: old", JAN_1, 0);
        let second = commit_at(&repo, "HEAD", Some(first), "fix: boundary", JAN_1 + DAY, 0);
        commit_at(&repo, "HEAD", Some(second), "fix: new", JAN_1 + 2 * DAY, 0);

        let source = CommitSource::open(temp.path(), None).unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let messages: Vec<_> = source
            .commits(Some(since))
            .unwrap()
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(messages, vec!["fix: boundary", "fix: new"]);
    }

    #[test]
    fn test_author_date_keeps_offset() {
        let (temp, repo) = init_repo();
        // 2024-01-01T12:00Z seen from UTC+13 is already the 2nd
        commit_at(&repo, "HEAD", None, "fix: tz", JAN_1, 13 * 60);

        let source = CommitSource::open(temp.path(), None).unwrap();
        let commits = source.commits(None).unwrap();
        assert_eq!(commits[0].date_label(), "2024-01-02");
    }

    #[test]
    fn test_since_uses_author_calendar_day() {
        let (temp, repo) = init_repo();
        // 2024-01-02T05:00+13:00, still the 1st in UTC
        commit_at(&repo, "HEAD", None, "fix: tz", JAN_1 + 4 * 60 * 60, 13 * 60);

        let source = CommitSource::open(temp.path(), None).unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let commits = source.commits(Some(since)).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].date_label(), "2024-01-02");
    }

    #[test]
    fn test_oversized_offset_falls_back_to_utc() {
        let date = to_datetime(&Time::new(JAN_1, 30 * 60)).unwrap();
        assert_eq!(date.offset().local_minus_utc(), 0);
        assert_eq!(date.format("%Y-%m-%d %H:%M").to_string(), "2024-01-01 12:00");
    }
}
