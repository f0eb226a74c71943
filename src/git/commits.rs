//! Commit listing and filtering.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use git2::{Commit, Oid, Repository, Sort};
use tracing::debug;

use crate::error::RepositoryError;

/// Number of hex characters in the abbreviated hash shown in the changelog.
pub const SHORT_HASH_LEN: usize = 7;

/// A commit as read from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub parents: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    /// Committer time, in UTC.
    pub timestamp: DateTime<Utc>,
}

impl CommitInfo {
    /// Create a CommitInfo from a git2 Commit.
    pub fn from_git2_commit(commit: &Commit) -> Result<Self, RepositoryError> {
        let hash = commit.id().to_string();
        let seconds = commit.time().seconds();
        let timestamp = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| RepositoryError::InvalidTimestamp {
                hash: hash.clone(),
                seconds,
            })?;

        let author = commit.author();

        Ok(Self {
            hash,
            parents: commit.parent_ids().map(|id| id.to_string()).collect(),
            author_name: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            timestamp,
        })
    }

    pub fn short_hash(&self) -> &str {
        let end = self.hash.len().min(SHORT_HASH_LEN);
        &self.hash[..end]
    }

    /// A merge commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn date(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }
}

/// Which commits to keep while walking history.
#[derive(Debug, Clone, Default)]
pub struct CommitFilter {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub include_merges: bool,
    /// Keep only the N newest matching commits. `None` keeps all.
    pub max_commits: Option<usize>,
}

impl CommitFilter {
    /// Whether a commit passes the date and merge filters.
    pub fn matches(&self, commit: &CommitInfo) -> bool {
        if !self.include_merges && commit.is_merge() {
            return false;
        }
        if let Some(since) = self.since
            && commit.timestamp < since
        {
            return false;
        }
        if let Some(until) = self.until
            && commit.timestamp > until
        {
            return false;
        }
        true
    }
}

/// List commits reachable from `tip`, oldest first.
///
/// History is walked newest to oldest in topological + time order, filtered,
/// limited to `max_commits`, then reversed into chronological order.
pub fn list_commits(
    repo: &Repository,
    tip: Oid,
    filter: &CommitFilter,
) -> Result<Vec<CommitInfo>, RepositoryError> {
    let mut revwalk = repo.revwalk().map_err(RepositoryError::RevwalkError)?;
    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(RepositoryError::RevwalkError)?;
    revwalk.push(tip).map_err(RepositoryError::RevwalkError)?;

    let mut commits = Vec::new();
    let mut skipped = 0usize;

    for oid_result in revwalk {
        let oid = oid_result.map_err(RepositoryError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(RepositoryError::ParseCommit)?;
        let info = CommitInfo::from_git2_commit(&commit)?;

        if !filter.matches(&info) {
            skipped += 1;
            continue;
        }

        commits.push(info);

        if filter.max_commits.is_some_and(|max| commits.len() >= max) {
            break;
        }
    }

    debug!(kept = commits.len(), skipped, "Listed commits");

    commits.reverse();
    Ok(commits)
}

/// Parse a `--since` bound: a date means the start of that day (UTC).
pub fn parse_since(input: &str) -> Result<DateTime<Utc>, RepositoryError> {
    parse_bound(input, NaiveTime::default())
}

/// Parse an `--until` bound: a date means the end of that day (UTC).
pub fn parse_until(input: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default();
    parse_bound(input, end_of_day)
}

fn parse_bound(input: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, RepositoryError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(time_of_day)));
    }

    Err(RepositoryError::InvalidDate(input.to_string()))
}
