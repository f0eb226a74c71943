//! Git operations using git2-rs.

pub mod commits;
pub mod diff;
pub mod repo;

pub use commits::{CommitFilter, CommitInfo, list_commits, parse_since, parse_until};
pub use diff::{CommitDiff, DiffSettings, extract_diff};
pub use repo::{RepoHandle, open_or_clone, resolve_branch};
